use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::domain::classification::SavedConfiguration;
use crate::domain::error::Result;

/// A locally held copy of a saved configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSnapshot {
    pub configuration: SavedConfiguration,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    entries: HashMap<String, CachedSnapshot>,
}

/// Local tier of the saved-configuration cache, keyed by dataframe handle.
/// Used for previews only; the backend answer always replaces it.
pub struct LocalConfigCache {
    inner: Mutex<CacheState>,
}

struct CacheState {
    entries: HashMap<String, CachedSnapshot>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl LocalConfigCache {
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(CacheState {
                entries: HashMap::new(),
                path: None,
                dirty: false,
            }),
        }
    }

    /// Open a file-backed cache. An unreadable file starts an empty cache.
    pub fn open(path: PathBuf) -> Self {
        let entries = Self::load_from_file(&path).unwrap_or_default();
        Self {
            inner: Mutex::new(CacheState {
                entries,
                path: Some(path),
                dirty: false,
            }),
        }
    }

    fn load_from_file(path: &Path) -> Option<HashMap<String, CachedSnapshot>> {
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<SnapshotFile>(&content) {
                Ok(file) => Some(file.entries),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to parse snapshot cache");
                    None
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read snapshot cache");
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, handle: &str) -> Option<CachedSnapshot> {
        self.lock().entries.get(handle).cloned()
    }

    pub fn put(&self, handle: &str, configuration: SavedConfiguration) {
        let mut state = self.lock();
        state.entries.insert(
            handle.to_string(),
            CachedSnapshot {
                configuration,
                cached_at: Utc::now(),
            },
        );
        state.dirty = true;
        debug!(handle, "cached configuration snapshot");
    }

    pub fn evict(&self, handle: &str) -> bool {
        let mut state = self.lock();
        let removed = state.entries.remove(handle).is_some();
        state.dirty |= removed;
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    /// Persist to disk when file-backed and changed.
    pub fn save(&self) -> Result<()> {
        let mut state = self.lock();
        let Some(path) = state.path.clone() else {
            return Ok(());
        };
        if !state.dirty {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&SnapshotFile {
            entries: state.entries.clone(),
        })?;
        fs::write(&path, content)?;

        state.dirty = false;
        Ok(())
    }
}

impl Default for LocalConfigCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ids: &[&str]) -> SavedConfiguration {
        SavedConfiguration {
            identifiers: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_put_get_evict() {
        let cache = LocalConfigCache::in_memory();
        cache.put("df-1", config(&["a"]));
        assert_eq!(cache.get("df-1").unwrap().configuration, config(&["a"]));
        assert!(cache.evict("df-1"));
        assert!(!cache.evict("df-1"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_memory_cache_save_is_noop() {
        let cache = LocalConfigCache::in_memory();
        cache.put("df-1", config(&["a"]));
        assert!(cache.save().is_ok());
        assert!(cache.is_dirty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snapshots.json");

        let cache = LocalConfigCache::open(path.clone());
        cache.put("df-1", config(&["region"]));
        cache.save().unwrap();
        assert!(!cache.is_dirty());

        let reopened = LocalConfigCache::open(path);
        assert_eq!(
            reopened.get("df-1").unwrap().configuration.identifiers,
            vec!["region"]
        );
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(LocalConfigCache::open(path).is_empty());
    }
}
