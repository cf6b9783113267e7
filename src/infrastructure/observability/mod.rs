//! Pull-free observability for lottoscope
//!
//! Metrics live in an in-process Prometheus registry; the CLI prints the
//! rendered text on request. Nothing here listens on a socket.

pub mod metrics;

pub use metrics::Metrics;
