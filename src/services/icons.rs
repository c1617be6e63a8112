//! Icon engine service shim.
//!
//! Wraps the deck-icons crate: builds the engine for the launcher layout and
//! runs refresh passes on a worker thread while the calling thread renders
//! progress.

use crate::events::{self, LauncherEvent};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use deck_conf::{LauncherConfig, LauncherPaths};
use deck_icons::{
    EngineConfig, FreshnessSignal, IconEngine, PartialFailureReport, PowerShellConverter,
    RefreshOutcome, RefreshProgress,
};
use log::info;
use std::io::Write;
use std::thread;
use std::time::Duration;

const EVENT_POLL_INTERVAL_MS: u64 = 50;

/// Create the icon engine for `paths`, reporting progress into the
/// returned receiver.
pub fn create_engine(paths: &LauncherPaths) -> (IconEngine, Receiver<LauncherEvent>) {
    let (tx, rx) = events::channel();
    let engine = IconEngine::new(EngineConfig::from(paths), PowerShellConverter::default())
        .with_progress(move |progress| events::send(&tx, LauncherEvent::Icons(progress)));
    (engine, rx)
}

/// Run a refresh pass on a worker thread and show its progress on stderr.
pub fn refresh(
    engine: &IconEngine,
    rx: &Receiver<LauncherEvent>,
    paths: &LauncherPaths,
    config: &LauncherConfig,
) -> Result<RefreshOutcome, PartialFailureReport> {
    let signal = FreshnessSignal::of_file(&paths.conf_path);

    thread::scope(|scope| {
        let worker =
            scope.spawn(|| engine.ensure_fresh(&config.apps, &config.window_icon, signal));

        loop {
            match rx.recv_timeout(Duration::from_millis(EVENT_POLL_INTERVAL_MS)) {
                Ok(event) => {
                    show(event);
                    for event in events::drain_latest(rx) {
                        show(event);
                    }
                }
                Err(RecvTimeoutError::Timeout) if !worker.is_finished() => {}
                Err(_) => break,
            }
        }

        for event in events::drain_latest(rx) {
            show(event);
        }

        match worker.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    })
}

/// Render one event as a passive, single-line notice.
fn show(event: LauncherEvent) {
    let LauncherEvent::Icons(progress) = event;
    let mut stderr = std::io::stderr().lock();

    let _ = match progress {
        RefreshProgress::Started { total } => {
            info!("Generating {} icons...", total);
            write!(stderr, "Generating icons... 0/{}", total)
        }
        RefreshProgress::Converted { done, total, .. } => {
            write!(stderr, "\rGenerating icons... {}/{}", done, total)
        }
        RefreshProgress::Finished => writeln!(stderr),
    };
    let _ = stderr.flush();
}
