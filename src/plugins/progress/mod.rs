pub mod celebrate;
pub mod helpers;
pub mod mention;
pub mod session;
pub mod store;
pub mod types;
pub mod update;
pub mod voice;

use std::sync::{PoisonError, RwLock};

use crate::core::settings::AppSettings;
use crate::storage::Storage;
use store::ProgressStore;

/// Thread-safe handle to the store for hosts that share it between threads.
pub struct SharedStore(pub RwLock<ProgressStore>);

impl SharedStore {
    pub fn new(store: ProgressStore) -> Self {
        Self(RwLock::new(store))
    }

    pub fn read(&self) -> std::sync::RwLockReadGuard<'_, ProgressStore> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> std::sync::RwLockWriteGuard<'_, ProgressStore> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Opens storage under the configured data dir and hydrates the store from it.
pub fn init_progress_store(settings: &AppSettings) -> SharedStore {
    let storage = Storage::open(&settings.store_dir());
    SharedStore::new(ProgressStore::new(storage, settings.persist_layout))
}
