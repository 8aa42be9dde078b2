//! The seam between state mutation and fan-out.
//!
//! The clock and the command handler only know that *something* wants
//! every fresh snapshot; the observer crate supplies the real
//! implementation. Implementations must not block: they are called
//! while the track store lock is held.

use seye_types::TrackSnapshot;

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers the frame was handed to.
    pub delivered: usize,
    /// Subscribers whose delivery failed.
    pub failed: usize,
}

/// Receives every snapshot produced by a tick or a command.
pub trait Broadcaster: Send + Sync {
    /// Deliver `snapshot` to every current subscriber.
    fn publish_all(&self, snapshot: &TrackSnapshot) -> BroadcastReport;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Records every published snapshot.
    #[derive(Default)]
    pub struct RecordingBroadcaster {
        pub published: Mutex<Vec<TrackSnapshot>>,
    }

    impl RecordingBroadcaster {
        pub fn count(&self) -> usize {
            self.published.lock().map(|p| p.len()).unwrap_or_default()
        }

        pub fn last(&self) -> Option<TrackSnapshot> {
            self.published.lock().ok().and_then(|p| p.last().cloned())
        }
    }

    impl Broadcaster for RecordingBroadcaster {
        fn publish_all(&self, snapshot: &TrackSnapshot) -> BroadcastReport {
            if let Ok(mut published) = self.published.lock() {
                published.push(snapshot.clone());
            }
            BroadcastReport {
                delivered: 1,
                failed: 0,
            }
        }
    }

    /// Counts calls and reports every delivery as failed.
    #[derive(Default)]
    pub struct FailingBroadcaster {
        calls: AtomicUsize,
    }

    impl FailingBroadcaster {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Broadcaster for FailingBroadcaster {
        fn publish_all(&self, _snapshot: &TrackSnapshot) -> BroadcastReport {
            self.calls.fetch_add(1, Ordering::SeqCst);
            BroadcastReport {
                delivered: 0,
                failed: 1,
            }
        }
    }
}
