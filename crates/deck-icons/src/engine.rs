//! Icon engine: the entry point used by the launcher.

use crate::converter::{Converter, convert};
use crate::error::{CacheError, PartialFailureReport};
use crate::refresh::{ProgressCallback, RefreshOutcome, RefreshProgress, ensure_fresh};
use crate::resolve::{classify, resolve, resolve_app};
use crate::store::{CacheStore, FreshnessSignal};
use crate::types::{CacheKey, IconSpec, Target, Worklist};
use deck_conf::{AppRecord, LauncherPaths};
use log::debug;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

/// Directories the engine works with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Relative specs resolve against this directory.
    pub base_dir: PathBuf,
    /// Directory owned by the cache store.
    pub cache_dir: PathBuf,
}

impl From<&LauncherPaths> for EngineConfig {
    fn from(paths: &LauncherPaths) -> Self {
        Self {
            base_dir: paths.base_dir.clone(),
            cache_dir: paths.cache_dir.clone(),
        }
    }
}

/// Resolves and caches icons for one launcher instance.
pub struct IconEngine {
    config: EngineConfig,
    /// Generated artifacts and freshness metadata.
    store: CacheStore,
    converter: Box<dyn Converter>,
    /// Optional refresh progress observer.
    on_progress: Option<ProgressCallback>,
    /// Keys a lazy lookup already tried to generate this session.
    attempted: Mutex<HashSet<CacheKey>>,
}

impl IconEngine {
    pub fn new(config: EngineConfig, converter: impl Converter + 'static) -> Self {
        let store = CacheStore::new(config.cache_dir.clone());
        Self {
            config,
            store,
            converter: Box::new(converter),
            on_progress: None,
            attempted: Mutex::new(HashSet::new()),
        }
    }

    /// Observe refresh progress, e.g. to show a "generating icons" notice.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(RefreshProgress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Targets the cache has to hold for this config.
    pub fn worklist(&self, apps: &[AppRecord], window_icon: &str) -> Worklist {
        resolve(&self.config.base_dir, apps, window_icon)
    }

    /// Bring the cache up to date with the config.
    pub fn ensure_fresh(
        &self,
        apps: &[AppRecord],
        window_icon: &str,
        signal_now: FreshnessSignal,
    ) -> Result<RefreshOutcome, PartialFailureReport> {
        let work = self.worklist(apps, window_icon);
        ensure_fresh(
            &self.store,
            self.converter.as_ref(),
            &work,
            signal_now,
            self.on_progress.as_deref(),
        )
    }

    /// Drop the stored signal so the next pass regenerates every target.
    pub fn invalidate(&self) -> Result<(), CacheError> {
        self.store.clear_signal()
    }

    /// Artifacts of `work` that are not on disk.
    pub fn missing(&self, work: &Worklist) -> Vec<PathBuf> {
        work.iter()
            .filter(|t| !self.store.exists(&t.key))
            .map(|t| self.store.path(&t.key))
            .collect()
    }

    /// Image to show next to an app row.
    ///
    /// Uses the cached artifact when present. Otherwise one conversion is
    /// attempted per session, provided the source exists.
    pub fn row_icon(&self, app: &AppRecord) -> Option<PathBuf> {
        let spec = app.icon_spec().unwrap_or_default();
        if let IconSpec::PreRendered(path) = classify(&self.config.base_dir, spec)? {
            return path.is_file().then_some(path);
        }

        let target = resolve_app(&self.config.base_dir, app)?;
        self.cached_or_convert(&target)
    }

    /// Window icon file: an `.ico` spec as-is, or the icon cached from an
    /// executable spec.
    pub fn window_icon(&self, spec: &str) -> Option<PathBuf> {
        match classify(&self.config.base_dir, spec)? {
            IconSpec::LegacyIcon(path) => path.is_file().then_some(path),
            IconSpec::Executable(path) if path.exists() => {
                let cached = self.store.path(&CacheKey::WindowIcon);
                cached.is_file().then_some(cached)
            }
            _ => None,
        }
    }

    fn cached_or_convert(&self, target: &Target) -> Option<PathBuf> {
        let path = self.store.path(&target.key);
        if path.is_file() {
            return Some(path);
        }

        if let Ok(mut attempted) = self.attempted.lock() {
            if !attempted.insert(target.key.clone()) {
                return None;
            }
        }

        if !target.source.exists() {
            return None;
        }

        if let Err(e) = self.store.ensure_dir() {
            debug!("Lazy icon generation skipped: {}", e);
            return None;
        }

        match convert(self.converter.as_ref(), &target.source, &path, target.op) {
            Ok(()) => Some(path),
            Err(e) => {
                debug!("Lazy icon generation failed for {}: {}", target.source.display(), e);
                None
            }
        }
    }
}
