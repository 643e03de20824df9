pub mod codec;
pub mod store;
pub mod types;

pub use codec::{
    clear_session, decode, deserialize, encode, load_session, save_session, serialize, Session,
};
pub use store::{get_state_path, FileStore, MemoryStore, StateStore, StoreError, STATE_FILE_NAME};
pub use types::{SavedSet, SavedState, SavedWine};

use std::path::PathBuf;

use crate::config::Config;

/// Pick the state file: explicit override, then config, then the default location.
pub fn resolve_state_path(config: &Config, override_path: Option<PathBuf>) -> PathBuf {
    override_path
        .or_else(|| config.state_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(get_state_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_state_path_precedence() {
        let mut config = Config::default();
        assert!(resolve_state_path(&config, None).ends_with(STATE_FILE_NAME));

        config.state_path = Some("/tmp/from-config.json".to_string());
        assert_eq!(
            resolve_state_path(&config, None),
            PathBuf::from("/tmp/from-config.json")
        );
        assert_eq!(
            resolve_state_path(&config, Some(PathBuf::from("/tmp/cli.json"))),
            PathBuf::from("/tmp/cli.json")
        );
    }
}
