//! Progress persistence.
//!
//! Reads and writes the fixed-layout snapshot defined in
//! [`pokedex_core::snapshot`]. A missing file means a new trainer; an
//! unreadable or corrupt file is reported and replaced by fresh progress.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use pokedex_core::{snapshot, ProgressTracker};

use crate::config::Config;

/// Snapshot file for one catalog size.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
    capacity: usize,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.progress.path, config.catalog.capacity)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads saved progress, falling back to a fresh tracker when the file is
    /// missing or cannot be decoded.
    pub fn load(&self) -> ProgressTracker {
        match self.try_load() {
            Ok(Some(progress)) => {
                debug!(
                    path = %self.path.display(),
                    seen = progress.total_encountered(),
                    caught = progress.total_caught(),
                    "progress restored"
                );
                progress
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "no saved progress, starting fresh");
                ProgressTracker::new(self.capacity)
            }
            Err(e) => {
                warn!(path = %self.path.display(), "discarding saved progress: {:#}", e);
                ProgressTracker::new(self.capacity)
            }
        }
    }

    /// Loads saved progress. `Ok(None)` if no snapshot exists.
    pub fn try_load(&self) -> Result<Option<ProgressTracker>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read progress file: {}", self.path.display())
                })
            }
        };

        let progress = snapshot::decode(&bytes, self.capacity)
            .with_context(|| format!("Corrupt progress file: {}", self.path.display()))?;
        Ok(Some(progress))
    }

    /// Writes the snapshot to a temporary sibling, then renames it over the
    /// progress file.
    pub fn save(&self, progress: &ProgressTracker) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, snapshot::encode(progress))
            .with_context(|| format!("Failed to write progress file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace progress file: {}", self.path.display()))?;

        debug!(path = %self.path.display(), "progress saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_fresh() {
        let tmp = TempDir::new().unwrap();
        let store = ProgressStore::new(tmp.path().join("progress.dat"), 151);
        assert!(store.try_load().unwrap().is_none());
        assert_eq!(store.load(), ProgressTracker::new(151));
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = ProgressStore::new(tmp.path().join("nested/progress.dat"), 151);

        let mut progress = ProgressTracker::new(151);
        progress.mark_caught(1);
        progress.mark_encountered(151);
        store.save(&progress).unwrap();

        assert_eq!(std::fs::metadata(store.path()).unwrap().len(), 1216);
        assert_eq!(store.load(), progress);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("progress.dat");
        std::fs::write(&path, b"not a snapshot").unwrap();

        let store = ProgressStore::new(&path, 151);
        let err = store.try_load().unwrap_err();
        assert!(format!("{:#}", err).contains("Corrupt progress file"));
        assert_eq!(store.load(), ProgressTracker::new(151));
    }

    #[test]
    fn test_capacity_change_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("progress.dat");
        ProgressStore::new(&path, 3)
            .save(&ProgressTracker::new(3))
            .unwrap();
        assert!(ProgressStore::new(&path, 151).try_load().is_err());
    }
}
