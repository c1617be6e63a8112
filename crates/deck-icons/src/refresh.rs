//! Cache refresh pass.
//!
//! A pass is needed when the config mtime differs from the stored one, or
//! when any expected artifact is missing even though the mtime matches (an
//! earlier pass may have been interrupted or partially failed). Otherwise
//! only file-existence checks run.

use crate::converter::{Converter, convert};
use crate::error::{PartialFailureReport, TargetFailure};
use crate::store::{CacheStore, FreshnessSignal};
use crate::types::{CacheKey, Target, Worklist};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::PathBuf;

/// Progress notifications emitted during a refresh pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshProgress {
    /// Generation starts; `total` targets will be attempted.
    Started { total: usize },
    /// One target was attempted.
    Converted {
        done: usize,
        total: usize,
        target: PathBuf,
        ok: bool,
    },
    /// Generation is over, any indicator can be dismissed.
    Finished,
}

/// Progress observer type.
/// Called from the thread running the pass; must not block.
pub type ProgressCallback = Box<dyn Fn(RefreshProgress) + Send + Sync>;

/// Successful result of [`ensure_fresh`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Signal matched and every artifact exists; nothing was converted.
    UpToDate,
    /// Every pending target was generated.
    Refreshed { converted: usize, signal_saved: bool },
}

/// Emits `Finished` when dropped, so the indicator goes away on every path.
struct FinishGuard<'a>(Option<&'a (dyn Fn(RefreshProgress) + Send + Sync)>);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if let Some(progress) = self.0 {
            progress(RefreshProgress::Finished);
        }
    }
}

/// Whether the stored signal differs from `signal_now`.
fn signal_changed(store: &CacheStore, signal_now: FreshnessSignal) -> bool {
    match store.read_signal() {
        Some(stored) if stored == signal_now => false,
        stored => {
            debug!(
                "Config signal changed ({:?} -> {})",
                stored.map(|s| s.as_secs()),
                signal_now.as_secs()
            );
            true
        }
    }
}

/// Targets a pass has to (re)generate: all of them after a config change,
/// otherwise only those whose artifact is missing.
fn pending_targets<'w>(store: &CacheStore, work: &'w Worklist, changed: bool) -> Vec<&'w Target> {
    if changed {
        return work.iter().collect();
    }

    work.iter()
        .filter(|target| {
            let missing = !store.exists(&target.key);
            if missing {
                debug!("Cached icon missing: {}", store.path(&target.key).display());
            }
            missing
        })
        .collect()
}

/// Whether a pass is due for `signal_now`: the config changed or an
/// artifact in `work` is missing.
pub fn needs_refresh(store: &CacheStore, work: &Worklist, signal_now: FreshnessSignal) -> bool {
    signal_changed(store, signal_now) || !pending_targets(store, work, false).is_empty()
}

/// Make sure every artifact in `work` exists and is current.
///
/// After a config change every target is regenerated; with an unchanged
/// config only missing artifacts are. Each target is attempted once and a
/// failure never stops the rest of the batch. The new signal is stored after
/// all attempts, whatever their outcome, and targets that are still missing
/// get retried by the next pass's completeness scan. A config change with
/// nothing to generate still stores the signal and prunes, without progress
/// events.
pub fn ensure_fresh(
    store: &CacheStore,
    converter: &dyn Converter,
    work: &Worklist,
    signal_now: FreshnessSignal,
    progress: Option<&(dyn Fn(RefreshProgress) + Send + Sync)>,
) -> Result<RefreshOutcome, PartialFailureReport> {
    let changed = signal_changed(store, signal_now);
    let pending = pending_targets(store, work, changed);
    if !changed && pending.is_empty() {
        debug!("Icon cache up to date ({} targets)", work.len());
        return Ok(RefreshOutcome::UpToDate);
    }

    let total = pending.len();
    let progress = progress.filter(|_| total > 0);
    if total > 0 {
        info!("Generating {} icons in {}", total, store.dir().display());
    } else {
        debug!("Config changed, no icons to generate");
    }

    if let Some(progress) = progress {
        progress(RefreshProgress::Started { total });
    }
    let _finish = FinishGuard(progress);

    if let Err(e) = store.ensure_dir() {
        warn!("Cannot create icon cache: {}", e);
    }

    let mut report = PartialFailureReport::default();

    for (index, target) in pending.into_iter().enumerate() {
        let path = store.path(&target.key);

        if let Err(e) = store.delete(&target.key) {
            warn!("Could not remove stale icon: {}", e);
        }

        let result = convert(converter, &target.source, &path, target.op);
        let ok = result.is_ok();

        match result {
            Ok(()) => {
                debug!("Generated {}", path.display());
                report.converted += 1;
            }
            Err(error) => {
                warn!(
                    "Could not {} for {}: {}",
                    target.op.label(),
                    target.source.display(),
                    error
                );
                report.failures.push(TargetFailure {
                    op: target.op,
                    source: target.source.clone(),
                    target: path.clone(),
                    error,
                });
            }
        }

        if let Some(progress) = progress {
            progress(RefreshProgress::Converted {
                done: index + 1,
                total,
                target: path,
                ok,
            });
        }
    }

    report.signal_saved = match store.write_signal(signal_now) {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not save icon cache metadata: {}", e);
            false
        }
    };

    let keep: HashSet<CacheKey> = work.iter().map(|t| t.key.clone()).collect();
    for removed in store.prune(&keep) {
        debug!("Pruned orphaned icon {}", removed.display());
    }

    info!(
        "Icon generation finished: {} generated, {} failed",
        report.converted,
        report.failures.len()
    );

    if report.failures.is_empty() {
        Ok(RefreshOutcome::Refreshed {
            converted: report.converted,
            signal_saved: report.signal_saved,
        })
    } else {
        Err(report)
    }
}
