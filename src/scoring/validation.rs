use super::config::{is_whole_steps, ItemLimits, ScoringConfig};

/// Validate scoring constants and item limits at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(scoring: &ScoringConfig, limits: &ItemLimits) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !scoring.step.is_finite() || scoring.step <= 0.0 {
        errors.push(format!("scoring.step: must be positive, got {}", scoring.step));
    }

    if !scoring.target_sum.is_finite() || scoring.target_sum < 0.0 {
        errors.push(format!(
            "scoring.target_sum: must be non-negative, got {}",
            scoring.target_sum
        ));
    }

    // Only check divisibility once both values are usable
    if errors.is_empty() {
        if !is_whole_steps(scoring.target_sum, scoring.step) {
            errors.push(format!(
                "scoring.target_sum: {} is not a whole number of {} steps",
                scoring.target_sum, scoring.step
            ));
        }
    }

    if limits.min_items == 0 {
        errors.push("limits.min_items: must be at least 1".to_string());
    }

    if limits.min_items > limits.max_items {
        errors.push(format!(
            "limits: min_items ({}) must not exceed max_items ({})",
            limits.min_items, limits.max_items
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
