//! Cache directory and freshness metadata.
//!
//! Layout (next to the launcher):
//!
//! ```text
//! .Games/
//!   cache.json        {"conf_mtime": 1718000000.123}
//!   btn_quake.png
//!   window_icon.ico
//! ```

use crate::error::CacheError;
use crate::types::CacheKey;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

const META_FILE: &str = "cache.json";

/// Config modification time in seconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreshnessSignal(f64);

impl FreshnessSignal {
    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Modification time of `path`, zero when it cannot be read.
    pub fn of_file(path: &Path) -> Self {
        let secs = fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Self(secs)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }
}

/// On-disk metadata. Only `conf_mtime` is read back.
#[derive(Debug, Serialize, Deserialize)]
struct CacheMeta {
    conf_mtime: f64,
}

/// Exclusive owner of the cache directory.
#[derive(Clone, Debug)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the cache directory if needed.
    pub fn ensure_dir(&self) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    pub fn path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    pub fn exists(&self, key: &CacheKey) -> bool {
        self.path(key).is_file()
    }

    /// Remove an artifact. Already absent counts as success.
    pub fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        remove_if_present(&self.path(key))
    }

    fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    /// Stored signal; `None` when the metadata is missing or unreadable.
    pub fn read_signal(&self) -> Option<FreshnessSignal> {
        let content = fs::read_to_string(self.meta_path()).ok()?;
        match serde_json::from_str::<CacheMeta>(&content) {
            Ok(meta) => Some(FreshnessSignal(meta.conf_mtime)),
            Err(e) => {
                debug!("Ignoring unreadable cache metadata: {}", e);
                None
            }
        }
    }

    /// Persist the signal. Callers treat failure as non-fatal.
    pub fn write_signal(&self, signal: FreshnessSignal) -> Result<(), CacheError> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(&CacheMeta {
            conf_mtime: signal.0,
        })?;
        let path = self.meta_path();
        fs::write(&path, json).map_err(|source| CacheError::Io { path, source })
    }

    /// Forget the stored signal so the next pass regenerates everything.
    pub fn clear_signal(&self) -> Result<(), CacheError> {
        remove_if_present(&self.meta_path())
    }

    /// Delete generated artifacts that are not in `keep`.
    ///
    /// Only names following the `btn_*.png` / `window_icon.ico` convention
    /// are considered; metadata and foreign files stay.
    pub fn prune(&self, keep: &HashSet<CacheKey>) -> Vec<PathBuf> {
        let keep: HashSet<String> = keep.iter().map(CacheKey::file_name).collect();
        let mut removed = Vec::new();

        let walker = walkdir::WalkDir::new(&self.dir).min_depth(1).max_depth(1);
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !CacheKey::is_generated_name(&name) || keep.contains(&*name) {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => removed.push(entry.path().to_path_buf()),
                Err(e) => debug!("Could not prune {}: {}", entry.path().display(), e),
            }
        }

        removed
    }
}

fn remove_if_present(path: &Path) -> Result<(), CacheError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CacheError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_round_trips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join(".deck"));
        assert_eq!(store.read_signal(), None);

        let signal = FreshnessSignal::from_secs(1718000000.1234567);
        store.write_signal(signal).unwrap();
        assert_eq!(store.read_signal(), Some(signal));
    }

    #[test]
    fn corrupt_metadata_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        fs::write(dir.path().join(META_FILE), "{not json").unwrap();
        assert_eq!(store.read_signal(), None);

        fs::write(dir.path().join(META_FILE), r#"{"conf_mtime": "yesterday"}"#).unwrap();
        assert_eq!(store.read_signal(), None);
    }

    #[test]
    fn metadata_tolerates_extra_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        fs::write(
            dir.path().join(META_FILE),
            r#"{"conf_mtime": 12.5, "version": 2}"#,
        )
        .unwrap();
        assert_eq!(store.read_signal(), Some(FreshnessSignal::from_secs(12.5)));
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let key = CacheKey::Button("quake".to_string());

        fs::write(store.path(&key), b"png").unwrap();
        assert!(store.exists(&key));
        store.delete(&key).unwrap();
        assert!(!store.exists(&key));
        store.delete(&key).unwrap();
    }

    #[test]
    fn clear_signal_forgets_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        store.write_signal(FreshnessSignal::from_secs(3.0)).unwrap();
        store.clear_signal().unwrap();
        assert_eq!(store.read_signal(), None);
        store.clear_signal().unwrap();
    }

    #[test]
    fn prune_only_removes_orphaned_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let kept = CacheKey::Button("quake".to_string());
        let orphan = CacheKey::Button("doom".to_string());

        for key in [&kept, &orphan, &CacheKey::WindowIcon] {
            fs::write(store.path(key), b"x").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();
        store.write_signal(FreshnessSignal::from_secs(1.0)).unwrap();

        let removed = store.prune(&HashSet::from([kept.clone()]));

        assert_eq!(removed.len(), 2);
        assert!(store.exists(&kept));
        assert!(!store.exists(&orphan));
        assert!(!store.exists(&CacheKey::WindowIcon));
        assert!(dir.path().join("notes.txt").exists());
        assert!(store.read_signal().is_some());
    }

    #[test]
    fn missing_file_has_zero_signal() {
        let dir = tempfile::tempdir().unwrap();
        let signal = FreshnessSignal::of_file(&dir.path().join("absent.conf"));
        assert_eq!(signal.as_secs(), 0.0);
    }
}
