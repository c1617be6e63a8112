//! Launcher events and the channel carrying them.
//!
//! Icon generation runs on a worker thread and reports progress here; the
//! main thread polls the receiver and renders the "generating icons" notice.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use deck_icons::RefreshProgress;

/// Events from background work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LauncherEvent {
    Icons(RefreshProgress),
}

/// Create the event channel.
pub fn channel() -> (Sender<LauncherEvent>, Receiver<LauncherEvent>) {
    crossbeam_channel::unbounded()
}

/// Send an event. Non-blocking; dropped when nobody listens.
#[inline]
pub fn send(tx: &Sender<LauncherEvent>, event: LauncherEvent) {
    let _ = tx.send(event);
}

/// Drain all pending events, collapsing consecutive per-target progress
/// updates into the latest one. Start and finish markers are always kept.
pub fn drain_latest(rx: &Receiver<LauncherEvent>) -> Vec<LauncherEvent> {
    let mut events: Vec<LauncherEvent> = Vec::with_capacity(8);

    loop {
        match rx.try_recv() {
            Ok(event) => {
                let collapse = matches!(
                    (events.last(), &event),
                    (
                        Some(LauncherEvent::Icons(RefreshProgress::Converted { .. })),
                        LauncherEvent::Icons(RefreshProgress::Converted { .. })
                    )
                );
                if collapse {
                    events.pop();
                }
                events.push(event);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn converted(done: usize) -> LauncherEvent {
        LauncherEvent::Icons(RefreshProgress::Converted {
            done,
            total: 3,
            target: PathBuf::from(format!("btn_{done}.png")),
            ok: true,
        })
    }

    #[test]
    fn progress_bursts_collapse_to_latest() {
        let (tx, rx) = channel();
        send(&tx, LauncherEvent::Icons(RefreshProgress::Started { total: 3 }));
        for done in 1..=3 {
            send(&tx, converted(done));
        }
        send(&tx, LauncherEvent::Icons(RefreshProgress::Finished));

        let events = drain_latest(&rx);
        assert_eq!(
            events,
            [
                LauncherEvent::Icons(RefreshProgress::Started { total: 3 }),
                converted(3),
                LauncherEvent::Icons(RefreshProgress::Finished),
            ]
        );
        assert!(drain_latest(&rx).is_empty());
    }
}
