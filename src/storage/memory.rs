use super::StorageBackend;
use crate::shared::errors::StorageError;
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-local fallback used when no durable storage is available.
#[derive(Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    fn poisoned() -> StorageError {
        StorageError::unavailable("memory storage lock poisoned")
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.read().map_err(|_| Self::poisoned())?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        values.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        values.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_semantics() {
        let memory = MemoryStorage::default();
        assert_eq!(memory.get("k").unwrap(), None);

        memory.set("k", "1").unwrap();
        memory.set("k", "2").unwrap();
        assert_eq!(memory.get("k").unwrap().as_deref(), Some("2"));

        memory.set("other", "x").unwrap();
        memory.remove("k").unwrap();
        assert_eq!(memory.get("k").unwrap(), None);

        memory.clear().unwrap();
        assert_eq!(memory.get("other").unwrap(), None);
    }
}
