use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use atomic_write_file::AtomicWriteFile;
use thiserror::Error;

/// Fixed key (file name) the record is stored under.
pub const STATE_FILE_NAME: &str = "wine_ratings.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Durable key-value slot holding the serialized record.
pub trait StateStore {
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replace the stored record. Safe to call redundantly.
    fn save(&self, contents: &str) -> Result<(), StoreError>;

    /// Forget the stored record. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), StoreError>;

    /// Human-readable location for messages.
    fn describe(&self) -> String;
}

/// Get the default state file path (~/.config/wine-rater/wine_ratings.json)
pub fn get_state_path() -> PathBuf {
    crate::config::get_config_dir().join(STATE_FILE_NAME)
}

/// Stores the record as a JSON file, written atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    fn save(&self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
        }

        let mut file =
            AtomicWriteFile::open(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.commit().map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.contents())
    }

    fn save(&self, contents: &str) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(contents.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join(STATE_FILE_NAME));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_roundtrip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join(STATE_FILE_NAME));
        store.save("{\"sets\":{}}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"sets\":{}}"));

        store.save("{}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_store_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join(STATE_FILE_NAME));
        store.save("{}").unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing again is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_unreadable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file
        let store = FileStore::new(dir.path());
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        store.save("a").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("a"));
        store.clear().unwrap();
        assert!(store.contents().is_none());
    }
}
