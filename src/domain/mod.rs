// Draws, game configuration and selections
pub mod lottery;

// Feature extraction, trees and boosted models
pub mod ml;

// Strategy performance tracking domain
pub mod performance;

// Repository traits
pub mod repositories;

// Domain-specific error types
pub mod errors;
