//! Key/value persistence for the progress store.
//!
//! `Storage` is the injected service the store talks to. It wraps a [`StorageBackend`]
//! (durable files or process memory) and owns JSON encoding plus error policy:
//! failures are logged and never reach the caller.

pub mod file;
pub mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::shared::errors::StorageError;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Keys used by the progress store. `:` separates the namespace from the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Tasks,
    Notes,
    TeamMembers,
    AnimalType,
    /// Single record holding every field (consolidated layout).
    Consolidated,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::Tasks,
        StorageKey::Notes,
        StorageKey::TeamMembers,
        StorageKey::AnimalType,
        StorageKey::Consolidated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Tasks => "progress:tasks",
            StorageKey::Notes => "progress:notes",
            StorageKey::TeamMembers => "progress:team_members",
            StorageKey::AnimalType => "progress:animal_type",
            StorageKey::Consolidated => "progress-store",
        }
    }

    pub fn parse(raw: &str) -> Option<StorageKey> {
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw string storage, the equivalent of a browser `localStorage` area.
pub trait StorageBackend: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Storage service handed to the store at construction.
pub struct Storage {
    backend: Box<dyn StorageBackend>,
    durable: bool,
}

impl Storage {
    pub fn new(backend: impl StorageBackend + 'static, durable: bool) -> Self {
        Self {
            backend: Box::new(backend),
            durable,
        }
    }

    /// Opens durable file storage at `dir`, falling back to memory when the directory
    /// cannot be used.
    pub fn open(dir: &Path) -> Self {
        match FileStorage::open(dir) {
            Ok(files) => {
                tracing::info!(target: "storage", path = %dir.display(), "Using durable storage");
                Self::new(files, true)
            }
            Err(e) => {
                tracing::warn!(
                    target: "storage",
                    path = %dir.display(),
                    error = %e,
                    "Durable storage unavailable, falling back to memory"
                );
                Self::in_memory()
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default(), false)
    }

    /// True when values survive a restart.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// Reads and decodes a value. Missing keys, empty values and decode failures all
    /// yield `None`.
    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                tracing::error!(
                    target: "storage",
                    key,
                    backend = self.backend.name(),
                    error = %e,
                    "Error retrieving data"
                );
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(target: "storage", key, error = %e, "Stored value is not valid JSON");
                None
            }
        }
    }

    /// Encodes and writes a value. Returns whether the write succeeded.
    pub fn set_item<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|json| self.backend.set(key, &json));

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    target: "storage",
                    key,
                    backend = self.backend.name(),
                    error = %e,
                    "Error saving data"
                );
                false
            }
        }
    }

    pub fn remove_item(&self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(target: "storage", key, error = %e, "Error removing data");
                false
            }
        }
    }

    pub fn clear(&self) -> bool {
        match self.backend.clear() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(target: "storage", error = %e, "Error clearing storage");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: i64,
        text: String,
    }

    struct BrokenBackend;

    impl StorageBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::unavailable("quota exceeded"))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::unavailable("quota exceeded"))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::unavailable("quota exceeded"))
        }
        fn clear(&self) -> Result<(), StorageError> {
            Err(StorageError::unavailable("quota exceeded"))
        }
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in StorageKey::ALL {
            assert_eq!(StorageKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(StorageKey::Tasks.to_string(), "progress:tasks");
        assert_eq!(StorageKey::parse("progress:unknown"), None);
    }

    #[test]
    fn test_memory_round_trip() {
        let storage = Storage::in_memory();
        assert!(!storage.is_durable());

        let items = vec![
            Item { id: 1, text: "a".into() },
            Item { id: 2, text: "b".into() },
        ];
        assert!(storage.set_item("progress:tasks", &items));
        let back: Vec<Item> = storage.get_item("progress:tasks").unwrap();
        assert_eq!(back, items);
    }

    #[test]
    fn test_missing_and_invalid_values_are_none() {
        let storage = Storage::in_memory();
        assert_eq!(storage.get_item::<Vec<Item>>("progress:tasks"), None);

        storage.backend.set("progress:tasks", "{not json").unwrap();
        assert_eq!(storage.get_item::<Vec<Item>>("progress:tasks"), None);

        storage.backend.set("progress:notes", "").unwrap();
        assert_eq!(storage.get_item::<String>("progress:notes"), None);
    }

    #[test]
    fn test_backend_failures_are_swallowed() {
        let storage = Storage::new(BrokenBackend, true);
        assert!(!storage.set_item("progress:notes", "hello"));
        assert_eq!(storage.get_item::<String>("progress:notes"), None);
        assert!(!storage.remove_item("progress:notes"));
        assert!(!storage.clear());
    }

    #[test]
    fn test_open_falls_back_to_memory_when_path_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file_path = tmp.path().join("not-a-dir");
        std::fs::write(&file_path, "x").unwrap();

        let storage = Storage::open(&file_path);
        assert!(!storage.is_durable());
        assert!(storage.set_item("progress:notes", "kept in memory"));
        assert_eq!(
            storage.get_item::<String>("progress:notes").as_deref(),
            Some("kept in memory")
        );
    }
}
