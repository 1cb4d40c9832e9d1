//! Tiny JSON-file store for device-local state that must survive restarts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

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

    /// Load the stored value, falling back to the default when the file is
    /// missing or unreadable. A corrupt store is not worth failing over.
    pub fn load<T: DeserializeOwned + Default>(&self) -> T {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return T::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!(
                "discarding corrupt store at {}: {e}",
                self.path.display()
            );
            T::default()
        })
    }

    pub fn save<T: Serialize>(&self, value: &T) {
        let json = match serde_json::to_string_pretty(value) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("failed to serialize store {}: {e}", self.path.display());
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, json) {
            log::warn!("failed to persist store {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("store-test-{tag}-{}.json", std::process::id()))
    }

    #[test]
    fn missing_file_yields_default() {
        let store = FileStore::new(temp_path("missing"));
        let map: HashMap<String, u64> = store.load();
        assert!(map.is_empty());
    }

    #[test]
    fn round_trips_a_map() {
        let path = temp_path("roundtrip");
        let store = FileStore::new(&path);
        let mut map = HashMap::new();
        map.insert("0xAAA".to_string(), 1700000000u64);
        store.save(&map);

        let loaded: HashMap<String, u64> = store.load();
        assert_eq!(loaded, map);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn corrupt_file_yields_default() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "not json").unwrap();
        let store = FileStore::new(&path);
        let map: HashMap<String, u64> = store.load();
        assert!(map.is_empty());
        let _ = std::fs::remove_file(path);
    }
}
