use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of an item within its set. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a set ("set1", "set2", ...). Used as the key in the persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetId(String);

impl SetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A single scoreable wine.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub score: f64,
}

impl Item {
    /// Create an item with the given name and a score of 0.
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0.0,
        }
    }

    /// An item takes part in automatic distribution once it has a non-blank name.
    pub fn is_active(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_has_zero_score() {
        let item = Item::new(ItemId::new(1), "");
        assert_eq!(item.score, 0.0);
        assert!(item.name.is_empty());
    }

    #[test]
    fn test_is_active() {
        assert!(Item::new(ItemId::new(1), "Chablis").is_active());
        assert!(!Item::new(ItemId::new(1), "").is_active());
        assert!(!Item::new(ItemId::new(1), "   \t").is_active());
    }

    #[test]
    fn test_set_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&SetId::new("set1")).unwrap();
        assert_eq!(json, "\"set1\"");
    }
}
