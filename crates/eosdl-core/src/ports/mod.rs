//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` or XML types in any signature
//! - Errors are core-owned; adapters map their own errors at the boundary

pub mod catalog;

use thiserror::Error;

pub use catalog::{CatalogError, CatalogPort, CatalogResult};

use crate::resolver::ResolveError;
use crate::version::VersionError;

/// Session-level failures surfaced by core services.
///
/// Per-task download failures are not part of this type: they are reported
/// inside each `DownloadResult`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A version string could not be parsed.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Authentication or manifest retrieval failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Resolution found nothing, or the request was inconsistent.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
