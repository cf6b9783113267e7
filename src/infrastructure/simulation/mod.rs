pub mod synthetic_draws;

pub use synthetic_draws::SyntheticDrawGenerator;
