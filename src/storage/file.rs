use super::StorageBackend;
use crate::shared::errors::StorageError;
use crate::shared::paths::ensure_dir;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

// ============================================================================
// Write Suppression Registry
// ============================================================================

/// Duration to suppress watcher events after an internal write. Must comfortably exceed
/// the watcher debounce plus its delivery latency.
pub const WRITE_SUPPRESSION_WINDOW_MS: u64 = 1000;

/// Global registry of recent internal writes (file path -> last write timestamp).
static WRITE_REGISTRY: once_cell::sync::Lazy<Mutex<HashMap<PathBuf, Instant>>> =
    once_cell::sync::Lazy::new(|| Mutex::new(HashMap::new()));

/// Records an internal write for a file path.
/// Called after saving to prevent the watcher from reacting to our own writes.
pub fn record_internal_write(path: &Path) {
    if let Ok(mut registry) = WRITE_REGISTRY.lock() {
        registry.insert(path.to_path_buf(), Instant::now());
        tracing::trace!(
            target: "storage",
            path = %path.display(),
            "Recorded internal write"
        );
    }
}

/// Checks if a file path was recently written by this process (within suppression window).
pub fn should_suppress_event(path: &Path) -> bool {
    let suppression_window = Duration::from_millis(WRITE_SUPPRESSION_WINDOW_MS);

    if let Ok(mut registry) = WRITE_REGISTRY.lock() {
        if let Some(write_time) = registry.get(path) {
            let elapsed = write_time.elapsed();
            if elapsed < suppression_window {
                tracing::debug!(
                    target: "storage",
                    path = %path.display(),
                    elapsed_ms = elapsed.as_millis(),
                    "Suppressing event for self-write"
                );
                return true;
            }
            registry.remove(path);
        }
    }
    false
}

/// Drops expired entries from the write registry.
pub fn cleanup_write_registry() {
    let suppression_window = Duration::from_millis(WRITE_SUPPRESSION_WINDOW_MS);

    if let Ok(mut registry) = WRITE_REGISTRY.lock() {
        registry.retain(|_, write_time| write_time.elapsed() < suppression_window);
    }
}

// ============================================================================
// File Backend
// ============================================================================

/// One pretty-printed JSON file per key inside a directory.
///
/// `progress:tasks` lives in `progress.tasks.json`; `:` is not portable in filenames.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        ensure_dir(dir).map_err(|e| StorageError::directory(format!("{}: {}", dir.display(), e)))?;
        if !dir.is_dir() {
            return Err(StorageError::unavailable(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        // Watcher events report resolved paths; keep ours in the same form.
        let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        key_path(&self.dir, key)
    }
}

/// Path of the file backing `key` inside `dir`.
pub fn key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", key.replace(':', ".")))
}

/// Inverse of [`key_path`]. Returns `None` for files that are not key files.
pub fn key_from_path(path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    Some(stem.replacen('.', ":", 1))
}

impl StorageBackend for FileStorage {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        ensure_dir(&self.dir)?;
        let path = self.path_for(key);

        // Store pretty JSON on disk so the files stay hand-editable.
        let content = match serde_json::from_str::<serde_json::Value>(value) {
            Ok(parsed) => serde_json::to_string_pretty(&parsed)?,
            Err(_) => value.to_string(),
        };

        std::fs::write(&path, content)?;
        record_internal_write(&path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
            record_internal_write(&path);
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if !self.dir.exists() {
            return Ok(());
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if key_from_path(&path).is_some() {
                std::fs::remove_file(&path)?;
                record_internal_write(&path);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_path_mapping() {
        let dir = Path::new("/data");
        let path = key_path(dir, "progress:tasks");
        assert_eq!(path, Path::new("/data/progress.tasks.json"));
        assert_eq!(key_from_path(&path).as_deref(), Some("progress:tasks"));

        let team = key_path(dir, "progress:team_members");
        assert_eq!(key_from_path(&team).as_deref(), Some("progress:team_members"));

        let consolidated = key_path(dir, "progress-store");
        assert_eq!(key_from_path(&consolidated).as_deref(), Some("progress-store"));

        assert_eq!(key_from_path(Path::new("/data/notes.txt")), None);
    }

    #[test]
    fn test_set_get_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let files = FileStorage::open(tmp.path()).unwrap();

        assert_eq!(files.get("progress:notes").unwrap(), None);

        files.set("progress:notes", "\"hello\"").unwrap();
        assert!(files.path_for("progress:notes").exists());
        assert_eq!(files.get("progress:notes").unwrap().as_deref(), Some("\"hello\""));

        files.remove("progress:notes").unwrap();
        assert_eq!(files.get("progress:notes").unwrap(), None);
        // removing a missing key is fine
        files.remove("progress:notes").unwrap();
    }

    #[test]
    fn test_values_are_written_pretty() {
        let tmp = tempfile::tempdir().unwrap();
        let files = FileStorage::open(tmp.path()).unwrap();

        files
            .set("progress:tasks", r#"[{"id":1,"text":"a","done":false}]"#)
            .unwrap();
        let raw = std::fs::read_to_string(files.path_for("progress:tasks")).unwrap();
        assert!(raw.contains('\n'));

        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["text"], "a");
    }

    #[test]
    fn test_clear_only_removes_key_files() {
        let tmp = tempfile::tempdir().unwrap();
        let files = FileStorage::open(tmp.path()).unwrap();
        files.set("progress:tasks", "[]").unwrap();
        files.set("progress:notes", "\"n\"").unwrap();
        std::fs::write(tmp.path().join("README"), "keep me").unwrap();

        files.clear().unwrap();

        assert_eq!(files.get("progress:tasks").unwrap(), None);
        assert_eq!(files.get("progress:notes").unwrap(), None);
        assert!(tmp.path().join("README").exists());
    }

    #[test]
    fn test_internal_writes_are_suppressed() {
        let tmp = tempfile::tempdir().unwrap();
        let files = FileStorage::open(tmp.path()).unwrap();
        files.set("progress:animal_type", "\"dog\"").unwrap();

        let path = files.path_for("progress:animal_type");
        assert!(should_suppress_event(&path));
        assert!(!should_suppress_event(&tmp.path().join("other.json")));
        cleanup_write_registry();
    }
}
