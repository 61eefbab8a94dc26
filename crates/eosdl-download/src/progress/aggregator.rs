//! Shared progress state for one orchestrator run.
//!
//! Workers report into a [`ProgressAggregator`]; observers hold a
//! `watch::Receiver` and always read the latest [`ProgressSnapshot`].
//! Byte counts are throttled, status changes are published immediately.

use std::sync::Mutex;

use eosdl_core::DownloadStatus;
use tokio::sync::watch;
use tracing::warn;

use super::ProgressThrottle;

/// Progress of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskProgress {
    /// Published filename.
    pub file_name: String,
    /// Current status.
    pub status: DownloadStatus,
    /// Bytes written so far.
    pub downloaded: u64,
    /// Expected size, when the server announced one.
    pub total: Option<u64>,
}

/// Point-in-time view of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// One slot per requested descriptor, in input order.
    pub tasks: Vec<TaskProgress>,
    /// Monotonically increasing sequence number for change detection.
    pub seq: u64,
}

impl ProgressSnapshot {
    /// Bytes written across all tasks.
    pub fn downloaded(&self) -> u64 {
        self.tasks.iter().map(|t| t.downloaded).sum()
    }

    /// Sum of announced sizes; `None` while any active task has no size.
    pub fn total(&self) -> Option<u64> {
        self.tasks
            .iter()
            .filter(|t| t.status == DownloadStatus::Downloading || t.status == DownloadStatus::Done)
            .map(|t| t.total)
            .sum()
    }

    /// Number of tasks in a terminal state.
    pub fn finished(&self) -> usize {
        self.tasks.iter().filter(|t| t.status.is_terminal()).count()
    }
}

/// Thread-safe progress sink shared by all workers of a run.
pub struct ProgressAggregator {
    tx: watch::Sender<ProgressSnapshot>,
    throttle: Mutex<ProgressThrottle>,
}

impl ProgressAggregator {
    /// Create an aggregator with the default throttle.
    pub fn new() -> Self {
        Self::with_throttle(ProgressThrottle::default())
    }

    /// Create an aggregator with a custom throttle.
    pub fn with_throttle(throttle: ProgressThrottle) -> Self {
        let (tx, _rx) = watch::channel(ProgressSnapshot::default());
        Self {
            tx,
            throttle: Mutex::new(throttle),
        }
    }

    /// Observe snapshots.
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    /// Latest state.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tx.borrow().clone()
    }

    /// Start a new run with one pending slot per file.
    pub fn begin(&self, file_names: impl IntoIterator<Item = String>) {
        let tasks = file_names
            .into_iter()
            .map(|file_name| TaskProgress {
                file_name,
                status: DownloadStatus::Pending,
                downloaded: 0,
                total: None,
            })
            .collect();
        self.tx.send_modify(|s| {
            s.tasks = tasks;
            s.seq += 1;
        });
    }

    /// Record a status change. Always published.
    ///
    /// Transitions the task state machine does not allow are dropped with a
    /// warning, so a snapshot never shows a finished task moving again.
    pub fn set_status(&self, index: usize, status: DownloadStatus) {
        self.tx.send_if_modified(|s| {
            let Some(task) = s.tasks.get_mut(index) else {
                return false;
            };
            if !task.status.can_transition_to(status) {
                warn!(
                    file = %task.file_name,
                    from = task.status.label(),
                    to = status.label(),
                    "Ignoring illegal status transition"
                );
                return false;
            }
            task.status = status;
            s.seq += 1;
            true
        });
    }

    /// Record the size announced for a task and reset its byte count.
    pub fn start_transfer(&self, index: usize, total: Option<u64>) {
        if let Ok(mut throttle) = self.throttle.lock() {
            throttle.force_next();
        }
        self.tx.send_if_modified(|s| {
            let Some(task) = s.tasks.get_mut(index) else {
                return false;
            };
            task.total = total;
            task.downloaded = 0;
            s.seq += 1;
            true
        });
    }

    /// Add `bytes` to a task. Published at most once per throttle interval.
    pub fn advance(&self, index: usize, bytes: u64) {
        let emit = self
            .throttle
            .lock()
            .map(|mut t| t.ready())
            .unwrap_or(true);
        self.tx.send_if_modified(|s| {
            let Some(task) = s.tasks.get_mut(index) else {
                return false;
            };
            task.downloaded += bytes;
            if emit {
                s.seq += 1;
            }
            emit
        });
    }
}

impl Default for ProgressAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn names() -> Vec<String> {
        vec!["a.swi".to_string(), "b.swi".to_string()]
    }

    #[test]
    fn tracks_bytes_and_status() {
        let progress = ProgressAggregator::new();
        progress.begin(names());
        progress.set_status(0, DownloadStatus::Downloading);
        progress.start_transfer(0, Some(10));
        progress.advance(0, 4);
        progress.advance(0, 6);
        progress.set_status(1, DownloadStatus::Cached);

        let snap = progress.snapshot();
        assert_eq!(snap.tasks[0].downloaded, 10);
        assert_eq!(snap.downloaded(), 10);
        assert_eq!(snap.total(), Some(10));
        assert_eq!(snap.finished(), 1);
    }

    #[test]
    fn unknown_index_is_ignored() {
        let progress = ProgressAggregator::new();
        progress.begin(names());
        progress.advance(7, 100);
        progress.set_status(7, DownloadStatus::Done);
        assert_eq!(progress.snapshot().downloaded(), 0);
    }

    #[test]
    fn finished_tasks_do_not_move_again() {
        let progress = ProgressAggregator::new();
        progress.begin(names());
        progress.set_status(0, DownloadStatus::Downloading);
        progress.set_status(0, DownloadStatus::Done);
        progress.set_status(0, DownloadStatus::Downloading);
        progress.set_status(1, DownloadStatus::Verifying);

        let snap = progress.snapshot();
        assert_eq!(snap.tasks[0].status, DownloadStatus::Done);
        assert_eq!(snap.tasks[1].status, DownloadStatus::Pending);
    }

    #[tokio::test]
    async fn byte_updates_are_throttled_but_status_is_not() {
        let progress =
            ProgressAggregator::with_throttle(ProgressThrottle::new(Duration::from_secs(60)));
        progress.begin(names());
        let mut rx = progress.subscribe();
        rx.borrow_and_update();

        progress.advance(0, 1);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        progress.advance(0, 1);
        assert!(!rx.has_changed().unwrap());
        // State is still current even when not announced.
        assert_eq!(progress.snapshot().tasks[0].downloaded, 2);

        progress.set_status(0, DownloadStatus::Downloading);
        assert!(rx.has_changed().unwrap());
    }
}
