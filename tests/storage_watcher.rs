//! Integration tests for cross-instance sync.
//!
//! A live watcher runs over a temp directory. Writes from "another process" are made
//! with plain file writes, since every store in this process shares the write registry.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use progress_lib::core::watch::{watch_store, DEBOUNCE_DURATION_MS};
use progress_lib::plugins::progress::store::ProgressStore;
use progress_lib::plugins::progress::types::{PersistLayout, StoreChange, Task};
use progress_lib::plugins::progress::SharedStore;
use progress_lib::storage::file::{key_path, WRITE_SUPPRESSION_WINDOW_MS};
use progress_lib::storage::{Storage, StorageKey};

const RELOAD_TIMEOUT: Duration = Duration::from_secs(5);

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    done()
}

fn watched_store(dir: &PathBuf) -> (Arc<SharedStore>, Arc<Mutex<Vec<StoreChange>>>) {
    let shared = Arc::new(SharedStore::new(ProgressStore::new(
        Storage::open(dir),
        PersistLayout::PerKey,
    )));

    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    shared
        .write()
        .subscribe(move |change| sink.lock().unwrap().push(change));

    (shared, changes)
}

fn temp_store_dir() -> (tempfile::TempDir, PathBuf) {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().canonicalize().unwrap();
    (root, dir)
}

// =============================================================================
// Live watcher
// =============================================================================

#[test]
fn test_external_write_reloads_store() {
    let (_root, dir) = temp_store_dir();
    let (shared, changes) = watched_store(&dir);
    let _watcher = watch_store(&dir, Arc::clone(&shared)).unwrap();

    let tasks = vec![Task {
        id: 42,
        text: "from another window".to_string(),
        done: false,
    }];
    std::fs::write(
        key_path(&dir, StorageKey::Tasks.as_str()),
        serde_json::to_string(&tasks).unwrap(),
    )
    .unwrap();

    assert!(
        wait_until(RELOAD_TIMEOUT, || shared.read().tasks().len() == 1),
        "store was not reloaded"
    );
    assert_eq!(shared.read().tasks()[0].text, "from another window");
    assert!(changes.lock().unwrap().contains(&StoreChange::All));
}

#[test]
fn test_own_writes_do_not_trigger_reload() {
    let (_root, dir) = temp_store_dir();
    let (shared, changes) = watched_store(&dir);
    let _watcher = watch_store(&dir, Arc::clone(&shared)).unwrap();

    shared.write().add_task("local");

    // long enough for the debounced event to be delivered, short enough to stay
    // inside the suppression window
    std::thread::sleep(Duration::from_millis(DEBOUNCE_DURATION_MS * 3));
    assert!(DEBOUNCE_DURATION_MS * 3 < WRITE_SUPPRESSION_WINDOW_MS);

    let changes = changes.lock().unwrap();
    assert!(!changes.is_empty());
    assert!(
        !changes.contains(&StoreChange::All),
        "own write caused a reload: {:?}",
        *changes
    );
    assert_eq!(shared.read().tasks().len(), 1);
}
