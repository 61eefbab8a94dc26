//! Download error types.
//!
//! These errors are designed to be cloneable and comparable so they can sit
//! inside per-task results. For I/O errors, we capture the kind and message
//! as strings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ChecksumAlgorithm;

/// Per-task download failure. Never aborts the rest of a batch.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadError {
    /// I/O error during file operations.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "`NotFound`", "`PermissionDenied`").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// A network call did not complete within its timeout.
    #[error("Network timeout while fetching {url}")]
    NetworkTimeout {
        /// URL being fetched.
        url: String,
    },

    /// The transfer failed for any other network reason.
    #[error("Download of {url} failed: {message}")]
    DownloadFailed {
        /// URL being fetched.
        url: String,
        /// Detailed error message.
        message: String,
        /// HTTP status code if available.
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },

    /// The published checksum file could not be understood.
    #[error("Unreadable checksum file {url}")]
    InvalidChecksumFile {
        /// URL of the checksum file.
        url: String,
    },

    /// The completed file does not match the expected digest.
    #[error("Checksum mismatch for {} ({algorithm}): expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        /// File that failed verification (already removed).
        path: PathBuf,
        /// Digest algorithm.
        algorithm: ChecksumAlgorithm,
        /// Expected digest.
        expected: String,
        /// Digest actually computed.
        actual: String,
    },

    /// The batch was cancelled before this task finished.
    #[error("Download cancelled")]
    Cancelled,
}

impl DownloadError {
    /// Create an I/O error from kind and message strings.
    pub fn io(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`, prefixing the operation.
    #[must_use]
    pub fn from_io_error(operation: &str, err: &std::io::Error) -> Self {
        Self::Io {
            kind: format!("{:?}", err.kind()),
            message: format!("{operation}: {err}"),
        }
    }

    /// Create a transfer failure.
    pub fn failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            url: url.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a transfer failure with an HTTP status code.
    pub fn failed_with_status(url: impl Into<String>, status_code: u16) -> Self {
        Self::DownloadFailed {
            url: url.into(),
            message: format!("HTTP {status_code}"),
            status_code: Some(status_code),
        }
    }

    /// Create a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::NetworkTimeout { url: url.into() }
    }

    /// Whether this failure came from cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
