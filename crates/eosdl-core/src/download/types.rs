//! Core domain types for downloads.
//!
//! Pure data types with no I/O dependencies.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::DownloadError;
use crate::version::Version;

/// Lifecycle of a single download task.
///
/// ```text
/// Pending ─┬─► Cached
///          └─► Downloading ─┬─► Done
///                           └─► Verifying ─┬─► Done
///                                          └─► Failed
/// ```
///
/// Cancellation moves any non-terminal state to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// Not started yet. In dry-run results: would download.
    Pending,
    /// Already present at the destination; no network I/O performed.
    Cached,
    /// Transfer in progress.
    Downloading,
    /// Computing the digest of the completed file.
    Verifying,
    /// Finished successfully.
    Done,
    /// Finished unsuccessfully (including cancellation).
    Failed,
}

impl DownloadStatus {
    /// Whether no further transition can happen.
    ///
    /// `Cached` is terminal for the orchestrator: a cached task never moves on.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cached)
    }

    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending, Self::Cached | Self::Downloading)
            | (Self::Downloading, Self::Done | Self::Verifying)
            | (Self::Verifying, Self::Done) => true,
            (Self::Pending | Self::Downloading | Self::Verifying, Self::Failed) => true,
            _ => false,
        }
    }

    /// Short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cached => "cached",
            Self::Downloading => "downloading",
            Self::Verifying => "verifying",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// Outcome of integrity checking for a finished task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    /// The digest matched.
    Verified,
    /// No checksum was published; the file was kept as-is.
    Unverified,
    /// Verification did not run (cached, dry run, or failed earlier).
    Skipped,
}

/// Final report for one requested descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResult {
    /// Published filename.
    pub file_name: String,
    /// Version of the artifact.
    pub version: Version,
    /// Format of the artifact.
    pub format: String,
    /// Destination path (present or not, depending on status).
    pub path: PathBuf,
    /// Final status.
    pub status: DownloadStatus,
    /// Integrity outcome.
    pub verification: Verification,
    /// Bytes written during this call.
    pub bytes_transferred: u64,
    /// Whether this result describes a planned action only.
    pub dry_run: bool,
    /// Failure detail when `status` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DownloadError>,
}

impl DownloadResult {
    /// Whether the artifact is available at `path` after the call.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !self.dry_run && matches!(self.status, DownloadStatus::Done | DownloadStatus::Cached)
    }

    /// Whether this task was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.error.as_ref().is_some_and(DownloadError::is_cancelled)
    }
}

/// Default number of concurrent transfers.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Default time allowed between two received chunks.
pub const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(60);

/// Options for one orchestrator run.
///
/// # Example
///
/// ```
/// use eosdl_core::download::DownloadOptions;
///
/// let options = DownloadOptions::new("/tmp/images")
///     .with_force(true)
///     .with_max_concurrency(2);
/// assert_eq!(options.max_concurrency(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    destination_dir: PathBuf,
    force: bool,
    dry_run: bool,
    max_concurrency: usize,
    chunk_timeout: Duration,
}

impl DownloadOptions {
    /// Options writing into `destination_dir` with default settings.
    pub fn new(destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            destination_dir: destination_dir.into(),
            force: false,
            dry_run: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            chunk_timeout: DEFAULT_CHUNK_TIMEOUT,
        }
    }

    /// Bypass the cache check.
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Report decisions without touching the network or filesystem.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Maximum parallel transfers; values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Time allowed between two received chunks before `NetworkTimeout`.
    #[must_use]
    pub const fn with_chunk_timeout(mut self, timeout: Duration) -> Self {
        self.chunk_timeout = timeout;
        self
    }

    /// Destination directory.
    #[must_use]
    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Whether the cache is bypassed.
    #[must_use]
    pub const fn force(&self) -> bool {
        self.force
    }

    /// Whether this is a dry run.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Maximum parallel transfers.
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Per-chunk timeout.
    #[must_use]
    pub const fn chunk_timeout(&self) -> Duration {
        self.chunk_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_machine_transitions() {
        use DownloadStatus::*;
        assert!(Pending.can_transition_to(Cached));
        assert!(Pending.can_transition_to(Downloading));
        assert!(Downloading.can_transition_to(Verifying));
        assert!(Downloading.can_transition_to(Done));
        assert!(Verifying.can_transition_to(Done));
        assert!(Verifying.can_transition_to(Failed));
        assert!(Pending.can_transition_to(Failed));

        assert!(!Done.can_transition_to(Failed));
        assert!(!Cached.can_transition_to(Downloading));
        assert!(!Pending.can_transition_to(Done));
        assert!(!Failed.can_transition_to(Pending));
    }

    #[test]
    fn terminal_states() {
        assert!(DownloadStatus::Done.is_terminal());
        assert!(DownloadStatus::Failed.is_terminal());
        assert!(!DownloadStatus::Downloading.is_terminal());
    }

    #[test]
    fn options_defaults_and_clamping() {
        let options = DownloadOptions::new("/tmp/x");
        assert_eq!(options.max_concurrency(), DEFAULT_MAX_CONCURRENCY);
        assert!(!options.force());
        assert!(!options.dry_run());

        let clamped = options.with_max_concurrency(0);
        assert_eq!(clamped.max_concurrency(), 1);
    }
}
