pub mod config;
pub mod engine;
pub mod validation;

pub use config::{is_whole_steps, ItemLimits, ScoringConfig, EPSILON};
pub use engine::distribute;
pub use validation::validate_scoring;
