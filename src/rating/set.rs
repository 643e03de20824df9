use super::item::{Item, ItemId, SetId};
use crate::scoring::{distribute, is_whole_steps, ItemLimits, ScoringConfig, EPSILON};

/// One independently scored collection of wines.
///
/// While the set is in automatic mode every item's score is derived from the
/// names: active items share the target evenly, blank items score 0. A nudge
/// switches the set to manual mode, after which scores only change through
/// further nudges until [`ItemSet::force_distribute`] is called.
///
/// Capacity violations (adding past `max_count`, removing at `min_count`) are
/// silent no-ops.
#[derive(Debug, Clone)]
pub struct ItemSet {
    set_id: SetId,
    items: Vec<Item>,
    min_count: usize,
    max_count: usize,
    target_sum: f64,
    step: f64,
    manual_override: bool,
    next_id: u64,
}

impl ItemSet {
    /// Create a set holding `limits.min_items` blank items.
    pub fn new(set_id: SetId, limits: ItemLimits, scoring: ScoringConfig) -> Self {
        let mut set = Self::empty(set_id, limits, scoring);
        set.fill_to_min();
        set
    }

    /// Rebuild a set from stored `(name, score)` pairs.
    ///
    /// Bounds are not enforced: a prior session may have used different
    /// limits, and the stored data is trusted as-is. An empty list falls back
    /// to `min_items` blank items.
    pub fn restore<I>(
        set_id: SetId,
        limits: ItemLimits,
        scoring: ScoringConfig,
        saved: I,
        manual_override: bool,
    ) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut set = Self::empty(set_id, limits, scoring);
        for (name, score) in saved {
            let id = set.fresh_id();
            set.items.push(Item {
                id,
                name,
                score: score.max(0.0),
            });
        }
        if set.items.is_empty() {
            set.fill_to_min();
        }
        set.manual_override = manual_override;
        set
    }

    fn empty(set_id: SetId, limits: ItemLimits, scoring: ScoringConfig) -> Self {
        Self {
            set_id,
            items: Vec::new(),
            min_count: limits.min_items,
            max_count: limits.max_items,
            target_sum: scoring.target_sum,
            step: scoring.step,
            manual_override: false,
            next_id: 0,
        }
    }

    fn fresh_id(&mut self) -> ItemId {
        let id = ItemId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn fill_to_min(&mut self) {
        while self.items.len() < self.min_count {
            let id = self.fresh_id();
            self.items.push(Item::new(id, ""));
        }
    }

    pub fn set_id(&self) -> &SetId {
        &self.set_id
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Current display position of `id`, resolved at call time.
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn min_count(&self) -> usize {
        self.min_count
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn target_sum(&self) -> f64 {
        self.target_sum
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn is_manual(&self) -> bool {
        self.manual_override
    }

    pub fn can_add(&self) -> bool {
        self.items.len() < self.max_count
    }

    pub fn can_remove(&self) -> bool {
        self.items.len() > self.min_count
    }

    pub fn active_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_active()).count()
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.score).sum()
    }

    /// True when the total is within [`EPSILON`] of the target.
    pub fn is_balanced(&self) -> bool {
        (self.total() - self.target_sum).abs() < EPSILON
    }

    /// Append a blank item. Returns `None` when the set is already full.
    pub fn add_item(&mut self) -> Option<ItemId> {
        if !self.can_add() {
            return None;
        }
        let id = self.fresh_id();
        self.items.push(Item::new(id, ""));
        Some(id)
    }

    /// Remove the item with `id`. The item is looked up by identity at call
    /// time, so deferred removals stay correct after earlier removals shift
    /// positions.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        if !self.can_remove() {
            return false;
        }
        let Some(index) = self.position_of(id) else {
            return false;
        };
        self.items.remove(index);
        self.recompute();
        true
    }

    pub fn set_name(&mut self, id: ItemId, name: impl Into<String>) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.name = name.into();
        self.recompute();
        true
    }

    /// Manually change a score by `delta`, clamped at 0.
    ///
    /// A `delta` that is not a finite whole number of steps is ignored and
    /// leaves the mode alone. Otherwise the set switches to manual mode even
    /// when `id` is unknown or `delta` is zero. Returns whether an item was
    /// changed.
    pub fn nudge_score(&mut self, id: ItemId, delta: f64) -> bool {
        if !is_whole_steps(delta, self.step) {
            tracing::debug!(
                delta,
                step = self.step,
                "Ignoring nudge that is not a whole number of steps"
            );
            return false;
        }
        self.manual_override = true;
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.score = (item.score + delta).max(0.0);
                true
            }
            None => false,
        }
    }

    /// Leave manual mode and share the target evenly again.
    pub fn force_distribute(&mut self) {
        self.manual_override = false;
        self.recompute();
    }

    /// Assign `names` to consecutive items starting at `start_id`, growing the
    /// set as needed up to `max_count`. Extra names are dropped silently.
    ///
    /// Returns the number of names applied.
    pub fn bulk_assign_names<S: AsRef<str>>(&mut self, start_id: ItemId, names: &[S]) -> usize {
        let Some(start) = self.position_of(start_id) else {
            return 0;
        };

        let mut applied = 0;
        for (offset, name) in names.iter().enumerate() {
            let index = start + offset;
            if index >= self.items.len() && self.add_item().is_none() {
                break;
            }
            self.items[index].name = name.as_ref().to_string();
            applied += 1;
        }

        if applied > 0 {
            self.recompute();
        }
        applied
    }

    /// Copy names positionally from `source`, growing this set up to the
    /// source's length (bounded by `max_count`). Scores are never copied.
    pub fn copy_names_from(&mut self, source: &ItemSet) {
        while self.items.len() < source.items.len() {
            if self.add_item().is_none() {
                break;
            }
        }
        for (target, source_item) in self.items.iter_mut().zip(&source.items) {
            target.name = source_item.name.clone();
        }
        self.recompute();
    }

    /// Drop every item and start over with `min_count` blank items in automatic mode.
    pub fn reset(&mut self) {
        self.items.clear();
        self.manual_override = false;
        self.fill_to_min();
    }

    /// Re-derive every score from the names. No-op in manual mode.
    fn recompute(&mut self) {
        if self.manual_override {
            return;
        }

        let scores = {
            let active: Vec<&Item> = self.items.iter().filter(|item| item.is_active()).collect();
            distribute(self.target_sum, self.step, &active)
        };

        for item in &mut self.items {
            item.score = scores.get(&item.id).copied().unwrap_or(0.0);
        }
    }
}
