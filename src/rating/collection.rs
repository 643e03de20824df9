use std::collections::HashMap;

use super::item::SetId;
use super::set::ItemSet;
use crate::scoring::{ItemLimits, ScoringConfig};

/// All sets of a tasting, in display order.
#[derive(Debug, Clone)]
pub struct SetCollection {
    sets: Vec<ItemSet>,
}

impl SetCollection {
    /// One fresh set per id, each with `limits.min_items` blank items.
    pub fn new<I>(ids: I, limits: ItemLimits, scoring: ScoringConfig) -> Self
    where
        I: IntoIterator<Item = SetId>,
    {
        Self {
            sets: ids
                .into_iter()
                .map(|id| ItemSet::new(id, limits, scoring))
                .collect(),
        }
    }

    pub fn from_sets(sets: Vec<ItemSet>) -> Self {
        Self { sets }
    }

    pub fn get(&self, id: &SetId) -> Option<&ItemSet> {
        self.sets.iter().find(|set| set.set_id() == id)
    }

    pub fn get_mut(&mut self, id: &SetId) -> Option<&mut ItemSet> {
        self.sets.iter_mut().find(|set| set.set_id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemSet> {
        self.sets.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SetId> {
        self.sets.iter().map(|set| set.set_id())
    }

    pub fn index_of(&self, id: &SetId) -> Option<usize> {
        self.sets.iter().position(|set| set.set_id() == id)
    }

    pub fn by_index(&self, index: usize) -> Option<&ItemSet> {
        self.sets.get(index)
    }

    pub fn by_index_mut(&mut self, index: usize) -> Option<&mut ItemSet> {
        self.sets.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Copy item names from `source_id` into `target_id`.
    ///
    /// No-op (returns false) when either set is unknown or both ids are the same.
    pub fn copy_names(&mut self, target_id: &SetId, source_id: &SetId) -> bool {
        if target_id == source_id {
            return false;
        }
        let (Some(ti), Some(si)) = (self.index_of(target_id), self.index_of(source_id)) else {
            return false;
        };

        let (target, source) = if ti < si {
            let (left, right) = self.sets.split_at_mut(si);
            (&mut left[ti], &right[0])
        } else {
            let (left, right) = self.sets.split_at_mut(ti);
            (&mut right[0], &left[si])
        };
        target.copy_names_from(source);
        true
    }

    /// Reset every set to its blank starting state.
    pub fn reset(&mut self) {
        for set in &mut self.sets {
            set.reset();
        }
    }
}

/// Display titles per set. Titles are supplied from outside the sets
/// themselves (configuration or the persisted record).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetTitles(HashMap<SetId, String>);

impl SetTitles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: SetId, title: impl Into<String>) {
        self.0.insert(id, title.into());
    }

    /// Title for `id`, falling back to the id itself.
    pub fn get<'a>(&'a self, id: &'a SetId) -> &'a str {
        self.0.get(id).map(String::as_str).unwrap_or(id.as_str())
    }
}

impl FromIterator<(SetId, String)> for SetTitles {
    fn from_iter<T: IntoIterator<Item = (SetId, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> SetCollection {
        let limits = ItemLimits {
            min_items: 2,
            max_items: 4,
        };
        SetCollection::new(
            ["set1", "set2", "set3", "set4"].map(SetId::from),
            limits,
            ScoringConfig::default(),
        )
    }

    fn names(set: &ItemSet) -> Vec<&str> {
        set.items().iter().map(|item| item.name.as_str()).collect()
    }

    #[test]
    fn test_new_collection_keeps_order() {
        let collection = collection();
        let ids: Vec<&str> = collection.ids().map(SetId::as_str).collect();
        assert_eq!(ids, vec!["set1", "set2", "set3", "set4"]);
        assert!(collection.iter().all(|set| set.len() == 2));
    }

    #[test]
    fn test_copy_names_forward_and_backward() {
        let mut collection = collection();
        let set1 = SetId::from("set1");
        let set3 = SetId::from("set3");
        {
            let source = collection.get_mut(&set3).unwrap();
            let first = source.items()[0].id;
            source.bulk_assign_names(first, &["Merlot", "Syrah", "Gamay"]);
        }

        assert!(collection.copy_names(&set1, &set3));
        assert_eq!(names(collection.get(&set1).unwrap()), vec!["Merlot", "Syrah", "Gamay"]);

        {
            let target = collection.get_mut(&set1).unwrap();
            let first = target.items()[0].id;
            target.set_name(first, "Pinot");
        }
        assert!(collection.copy_names(&set3, &set1));
        assert_eq!(names(collection.get(&set3).unwrap())[0], "Pinot");
    }

    #[test]
    fn test_copy_names_rejects_same_or_unknown() {
        let mut collection = collection();
        let set1 = SetId::from("set1");
        assert!(!collection.copy_names(&set1, &set1));
        assert!(!collection.copy_names(&set1, &SetId::from("nope")));
        assert!(!collection.copy_names(&SetId::from("nope"), &set1));
    }

    #[test]
    fn test_sets_are_independent() {
        let mut collection = collection();
        let set2 = SetId::from("set2");
        let set = collection.get_mut(&set2).unwrap();
        let first = set.items()[0].id;
        set.nudge_score(first, 1.0);

        assert!(collection.get(&set2).unwrap().is_manual());
        assert!(!collection.get(&SetId::from("set1")).unwrap().is_manual());
    }

    #[test]
    fn test_reset_all_sets() {
        let mut collection = collection();
        let set1 = SetId::from("set1");
        let set = collection.get_mut(&set1).unwrap();
        set.add_item();
        let first = set.items()[0].id;
        set.set_name(first, "Riesling");
        collection.reset();
        let set = collection.get(&set1).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.active_count(), 0);
    }

    #[test]
    fn test_titles_fall_back_to_id() {
        let mut titles = SetTitles::new();
        let set1 = SetId::from("set1");
        let set2 = SetId::from("set2");
        titles.insert(set1.clone(), "赤ワイン");
        assert_eq!(titles.get(&set1), "赤ワイン");
        assert_eq!(titles.get(&set2), "set2");
    }
}
