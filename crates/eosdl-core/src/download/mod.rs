//! Download domain types: task status, options, results and errors.

mod errors;
mod types;

pub use errors::DownloadError;
pub use types::{
    DEFAULT_CHUNK_TIMEOUT, DEFAULT_MAX_CONCURRENCY, DownloadOptions, DownloadResult,
    DownloadStatus, Verification,
};
