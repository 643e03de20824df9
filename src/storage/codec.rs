use chrono::{DateTime, Utc};

use super::store::{StateStore, StoreError};
use super::types::{SavedSet, SavedState, SavedWine};
use crate::config::Config;
use crate::rating::{ItemSet, SetCollection, SetTitles};

/// Everything a rating session needs: the sets and their titles.
#[derive(Debug, Clone)]
pub struct Session {
    pub collection: SetCollection,
    pub titles: SetTitles,
}

impl Session {
    /// A blank session laid out as configured.
    pub fn fresh(config: &Config) -> Self {
        Self {
            collection: config.fresh_collection(),
            titles: config.default_titles(),
        }
    }
}

/// Capture the collection as a persistable record. Item ids are not stored.
pub fn serialize(
    collection: &SetCollection,
    titles: &SetTitles,
    saved_at: DateTime<Utc>,
) -> SavedState {
    let sets = collection
        .iter()
        .map(|set| {
            let saved = SavedSet {
                title: titles.get(set.set_id()).to_string(),
                is_manual_score: set.is_manual(),
                wines: set
                    .items()
                    .iter()
                    .map(|item| SavedWine {
                        name: item.name.clone(),
                        score: item.score,
                    })
                    .collect(),
            };
            (set.set_id().clone(), saved)
        })
        .collect();

    SavedState {
        sets,
        last_saved: Some(saved_at),
    }
}

/// Rebuild a session from a record, laid out as configured.
///
/// Configured sets missing from the record, or saved with no wines, start
/// blank. Saved wines are restored as-is without clamping to the item
/// limits. Saved sets that are no longer configured are dropped.
pub fn deserialize(record: &SavedState, config: &Config) -> Session {
    let mut titles = config.default_titles();

    let sets = config
        .set_ids()
        .map(|id| match record.sets.get(&id) {
            Some(saved) => {
                if !saved.title.is_empty() {
                    titles.insert(id.clone(), saved.title.clone());
                }
                ItemSet::restore(
                    id,
                    config.limits,
                    config.scoring,
                    saved
                        .wines
                        .iter()
                        .map(|wine| (wine.name.clone(), wine.score)),
                    saved.is_manual_score,
                )
            }
            None => ItemSet::new(id, config.limits, config.scoring),
        })
        .collect();

    for id in record.sets.keys() {
        if !config.set_ids().any(|configured| &configured == id) {
            tracing::debug!(set = %id, "Ignoring saved set that is not configured");
        }
    }

    Session {
        collection: SetCollection::from_sets(sets),
        titles,
    }
}

pub fn encode(record: &SavedState) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(record)?)
}

/// Parse stored text. Malformed input is logged and treated as absent.
pub fn decode(text: &str) -> Option<SavedState> {
    match serde_json::from_str(text) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(error = %e, "Stored rating state is corrupt, starting fresh");
            None
        }
    }
}

/// Load the session from `store`, falling back to a fresh session when the
/// store is empty, unreadable, or corrupt. Never fails.
pub fn load_session(store: &dyn StateStore, config: &Config) -> Session {
    let text = match store.load() {
        Ok(Some(text)) => text,
        Ok(None) => {
            tracing::debug!(store = %store.describe(), "No saved state, starting fresh");
            return Session::fresh(config);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read saved state, starting fresh");
            return Session::fresh(config);
        }
    };

    match decode(&text) {
        Some(record) => {
            tracing::debug!(
                store = %store.describe(),
                sets = record.sets.len(),
                last_saved = ?record.last_saved,
                "Restored saved state"
            );
            deserialize(&record, config)
        }
        None => Session::fresh(config),
    }
}

/// Persist the session, stamped with the current time.
pub fn save_session(store: &dyn StateStore, session: &Session) -> Result<(), StoreError> {
    let record = serialize(&session.collection, &session.titles, Utc::now());
    store.save(&encode(&record)?)?;
    tracing::debug!(store = %store.describe(), "Saved state");
    Ok(())
}

/// Forget the stored record and return a blank session.
///
/// A failure to clear the store is logged; the returned session is blank either way.
pub fn clear_session(store: &dyn StateStore, config: &Config) -> Session {
    if let Err(e) = store.clear() {
        tracing::warn!(error = %e, "Failed to clear saved state");
    }
    Session::fresh(config)
}
