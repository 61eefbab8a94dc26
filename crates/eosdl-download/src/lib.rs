//! Download orchestrator for eosdl.
//!
//! Takes resolved [`eosdl_core::ArtifactDescriptor`]s and brings each one to
//! a terminal [`eosdl_core::DownloadStatus`]: cache check, bounded concurrent
//! streamed transfer into a temporary file, checksum verification, atomic
//! rename. Cancellation is cooperative through a `CancellationToken`.

#![deny(unused_crate_dependencies)]

mod fetch;
mod orchestrator;
mod paths;
mod progress;
mod verify;
mod worker;

// Re-export core types for convenience
pub use eosdl_core::download::{
    DEFAULT_CHUNK_TIMEOUT, DEFAULT_MAX_CONCURRENCY, DownloadError, DownloadOptions,
    DownloadResult, DownloadStatus, Verification,
};

pub use fetch::{
    ArtifactFetcher, ByteStream, DEFAULT_CONNECT_TIMEOUT, FetchResponse, ReqwestFetcher,
};
pub use orchestrator::DownloadOrchestrator;
pub use paths::{DownloadDestination, is_temp_file};
pub use progress::{ProgressAggregator, ProgressSnapshot, ProgressThrottle, TaskProgress};
pub use verify::file_digest;

// Cancellation token type used by `DownloadOrchestrator::run`
pub use tokio_util::sync::CancellationToken;
