use std::collections::HashMap;

use super::config::EPSILON;
use crate::rating::{Item, ItemId};

/// Absorbs float noise in quotients that should be whole steps (e.g. 12.999999999).
const FLOOR_TOLERANCE: f64 = 1e-9;

/// Compute an even score assignment for `active_items` summing to `target_sum`.
///
/// Every item gets the largest multiple of `step` that keeps the total at or
/// below the target; the leftover is handed out one `step` at a time to the
/// earliest items in sequence order. The result is deterministic for a given
/// ordered input.
///
/// Returns an empty map when there are no active items. Callers guarantee
/// `step > 0` and `target_sum >= 0`.
pub fn distribute(target_sum: f64, step: f64, active_items: &[&Item]) -> HashMap<ItemId, f64> {
    let n = active_items.len();
    if n == 0 {
        return HashMap::new();
    }

    let base = (((target_sum / n as f64) / step) + FLOOR_TOLERANCE).floor() * step;
    let mut remainder = target_sum - base * n as f64;

    active_items
        .iter()
        .map(|item| {
            let mut score = base;
            if remainder > EPSILON {
                score += step;
                remainder -= step;
            }
            (item.id, score)
        })
        .collect()
}
