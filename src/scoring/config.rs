use serde::{Deserialize, Serialize};

/// Scores closer than this are considered equal.
pub const EPSILON: f64 = 0.01;

/// Tolerance, in steps, for float error when checking step multiples.
const STEP_TOLERANCE: f64 = 1e-6;

/// True when `value` is a finite whole number of `step`s.
pub fn is_whole_steps(value: f64, step: f64) -> bool {
    if !value.is_finite() || !step.is_finite() || step <= 0.0 {
        return false;
    }
    let steps = value / step;
    (steps - steps.round()).abs() < STEP_TOLERANCE
}

/// Scoring constants shared by every set.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   target_sum: 10.0
///   step: 0.25
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Value the active items' scores must add up to (default: 10.0)
    #[serde(default = "default_target_sum")]
    pub target_sum: f64,

    /// Quantization unit for every score and nudge (default: 0.25)
    #[serde(default = "default_step")]
    pub step: f64,
}

fn default_target_sum() -> f64 {
    10.0
}

fn default_step() -> f64 {
    0.25
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_sum: default_target_sum(),
            step: default_step(),
        }
    }
}

/// Cardinality bounds for a single set.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ItemLimits {
    #[serde(default = "default_min_items")]
    pub min_items: usize,

    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

fn default_min_items() -> usize {
    10
}

fn default_max_items() -> usize {
    20
}

impl Default for ItemLimits {
    fn default() -> Self {
        Self {
            min_items: default_min_items(),
            max_items: default_max_items(),
        }
    }
}
