//! Cross-instance sync for the store directory.
//!
//! Watches the storage directory and reports which key another process changed. The
//! store's own writes are suppressed through the write registry in `storage::file`.
//! Uses debouncing so editors that write a file in several steps produce one event.

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::Duration;

use crate::plugins::progress::SharedStore;
use crate::shared::paths::ensure_dir;
use crate::storage::file::{
    cleanup_write_registry, key_from_path, should_suppress_event, WRITE_SUPPRESSION_WINDOW_MS,
};
use crate::storage::StorageKey;

pub const DEBOUNCE_DURATION_MS: u64 = 200;

pub struct StorageWatcher {
    debouncer: Debouncer<RecommendedWatcher>,
    watched_path: PathBuf,
}

impl StorageWatcher {
    /// Starts watching `dir`. `on_change` runs on the watcher thread once per externally
    /// changed key.
    pub fn new(
        dir: &Path,
        on_change: impl Fn(StorageKey) + Send + 'static,
    ) -> Result<Self, notify::Error> {
        ensure_dir(dir).map_err(|e| {
            notify::Error::generic(&format!("Failed to create storage directory: {}", e))
        })?;

        let (tx, rx) = channel::<Result<Vec<DebouncedEvent>, notify::Error>>();
        let debouncer = new_debouncer(Duration::from_millis(DEBOUNCE_DURATION_MS), tx)?;

        std::thread::spawn(move || {
            handle_events(rx, on_change);
        });

        let mut watcher = Self {
            debouncer,
            watched_path: dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()),
        };
        watcher
            .debouncer
            .watcher()
            .watch(&watcher.watched_path, RecursiveMode::NonRecursive)?;

        tracing::info!(
            target: "storage",
            path = %watcher.watched_path.display(),
            "Storage watcher started"
        );

        Ok(watcher)
    }

    pub fn path(&self) -> &Path {
        &self.watched_path
    }

    /// Stops watching. Dropping the watcher also stops it.
    pub fn stop(&mut self) -> Result<(), notify::Error> {
        self.debouncer.watcher().unwatch(&self.watched_path)
    }
}

/// Reloads `store` whenever another process changes one of its keys.
pub fn watch_store(dir: &Path, store: Arc<SharedStore>) -> Result<StorageWatcher, notify::Error> {
    StorageWatcher::new(dir, move |key| {
        tracing::debug!(target: "storage", key = %key, "Reloading after external change");
        store.write().reload_from_storage();
    })
}

fn handle_events(
    rx: Receiver<Result<Vec<DebouncedEvent>, notify::Error>>,
    on_change: impl Fn(StorageKey),
) {
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                cleanup_write_registry();
                let mut seen = Vec::new();
                for event in events {
                    if let Some(key) = changed_key(&event.path) {
                        if !seen.contains(&key) {
                            seen.push(key);
                            on_change(key);
                        }
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!(target: "storage", error = %e, "Watcher error");
            }
            Err(_) => {
                tracing::info!(
                    target: "storage",
                    "Watcher channel closed, stopping event handler"
                );
                break;
            }
        }
    }
}

/// Maps a changed file to its key, skipping non-key files and our own writes.
fn changed_key(path: &Path) -> Option<StorageKey> {
    if path.extension().map_or(true, |ext| ext != "json") {
        return None;
    }

    if should_suppress_event(path) {
        tracing::debug!(target: "storage", path = %path.display(), "Event suppressed (self-write)");
        return None;
    }

    key_from_path(path).and_then(|raw| StorageKey::parse(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::file::{key_path, record_internal_write};

    #[test]
    fn test_changed_key_maps_store_files() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = key_path(dir.path(), StorageKey::Tasks.as_str());
        assert_eq!(changed_key(&tasks), Some(StorageKey::Tasks));

        let consolidated = key_path(dir.path(), StorageKey::Consolidated.as_str());
        assert_eq!(changed_key(&consolidated), Some(StorageKey::Consolidated));
    }

    #[test]
    fn test_changed_key_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(changed_key(&dir.path().join("settings.json")), None);
        assert_eq!(changed_key(&dir.path().join("progress.tasks.tmp")), None);
    }

    #[test]
    fn test_own_writes_are_suppressed() {
        let dir = tempfile::tempdir().unwrap();
        let notes = key_path(dir.path(), StorageKey::Notes.as_str());
        record_internal_write(&notes);
        assert_eq!(changed_key(&notes), None);
    }

    #[test]
    fn test_suppression_outlasts_debounce() {
        assert!(WRITE_SUPPRESSION_WINDOW_MS >= 4 * DEBOUNCE_DURATION_MS);
    }

    #[test]
    fn test_watcher_starts_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let store_dir = dir.path().join("store");
        let mut watcher = StorageWatcher::new(&store_dir, |_| {}).unwrap();
        assert!(store_dir.is_dir());
        assert_eq!(watcher.path(), store_dir.canonicalize().unwrap().as_path());
        watcher.stop().unwrap();
    }
}
