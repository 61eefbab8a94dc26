//! Time-based throttling of byte-count snapshots.
//!
//! A fast transfer reports many small chunks; publishing each one would wake
//! the renderer for every read. Counts still accumulate in the snapshot, they
//! are just announced at most once per interval.

use std::time::{Duration, Instant};

/// Default minimum time between published byte updates.
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_millis(100);

/// Decides when accumulated byte counts are worth publishing.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last_publish: Option<Instant>,
}

impl ProgressThrottle {
    /// Publish at most once per `interval`.
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_publish: None,
        }
    }

    /// Whether a snapshot should go out now; starts a new interval if so.
    pub fn ready(&mut self) -> bool {
        let now = Instant::now();
        let due = self
            .last_publish
            .is_none_or(|last| now.duration_since(last) >= self.interval);
        if due {
            self.last_publish = Some(now);
        }
        due
    }

    /// Make the next `ready` return true, e.g. when a new transfer starts.
    pub const fn force_next(&mut self) {
        self.last_publish = None;
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLISH_INTERVAL)
    }
}
