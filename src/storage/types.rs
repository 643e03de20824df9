use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::rating::SetId;

/// The persisted record: every set's title, mode, and wines.
///
/// Missing fields fall back to their defaults so that records written by
/// older versions still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    #[serde(default)]
    pub sets: BTreeMap<SetId, SavedSet>,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_saved: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSet {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub is_manual_score: bool,

    #[serde(default)]
    pub wines: Vec<SavedWine>,
}

/// Item ids are not stored; they are regenerated on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedWine {
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_score")]
    pub score: f64,
}

/// Read `null`, negative, or non-finite scores as zero.
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(0.0))
}

/// Accept RFC 3339 strings, millisecond epoch numbers, or anything else as absent.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}
