//! The loaded catalog plus the trainer's progress.
//!
//! [`Dex`] is the one instance every front end (console, CLI commands, HTTP
//! handlers) works through. The catalog is immutable and shared. Progress
//! sits behind a mutex; each mutation and the snapshot that follows it run
//! under the same lock, so saves never interleave with other writes.

use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use pokedex_core::{CatalogIndex, ProgressTracker};

use crate::config::Config;
use crate::ingest;
use crate::store::ProgressStore;

/// A progress mutation on a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Encounter,
    Catch,
    Reset,
}

impl Action {
    fn apply(self, progress: &mut ProgressTracker, id: u32) -> bool {
        match self {
            Action::Encounter => progress.mark_encountered(id),
            Action::Catch => progress.mark_caught(id),
            Action::Reset => progress.reset_one(id),
        }
    }
}

pub struct Dex {
    catalog: Arc<CatalogIndex>,
    progress: Mutex<ProgressTracker>,
    store: ProgressStore,
}

impl Dex {
    pub fn new(catalog: CatalogIndex, progress: ProgressTracker, store: ProgressStore) -> Self {
        Self {
            catalog: Arc::new(catalog),
            progress: Mutex::new(progress),
            store,
        }
    }

    /// Loads the catalog and the saved progress named by `config`.
    pub fn open(config: &Config) -> Result<Self> {
        let catalog = ingest::load_catalog(config)?;
        let store = ProgressStore::from_config(config);
        let progress = store.load();
        Ok(Self::new(catalog, progress, store))
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    /// Read access to progress. Holds the lock for the duration of `f`.
    pub fn read<R>(&self, f: impl FnOnce(&ProgressTracker) -> R) -> R {
        f(&self.lock())
    }

    /// Applies `action` to `id` and saves. Returns whether the entry changed.
    ///
    /// The snapshot is written even when nothing changed, matching the
    /// behaviour of every front end saving after each command.
    pub fn apply(&self, action: Action, id: u32) -> Result<bool> {
        let mut progress = self.lock();
        let changed = action.apply(&mut progress, id);
        debug!(?action, id, changed, "progress updated");
        self.store.save(&progress)?;
        Ok(changed)
    }

    /// Clears all progress and saves.
    pub fn reset_all(&self) -> Result<()> {
        let mut progress = self.lock();
        progress.reset_all();
        debug!("all progress reset");
        self.store.save(&progress)
    }

    /// Saves the current progress.
    pub fn save(&self) -> Result<()> {
        self.store.save(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, ProgressTracker> {
        // Tracker mutations cannot panic midway, so a poisoned lock still
        // guards consistent progress.
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
