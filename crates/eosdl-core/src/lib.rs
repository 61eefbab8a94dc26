//! Core domain for eosdl: the version model, catalog data types, the
//! artifact resolver and the ports implemented by adapter crates.
//!
//! This crate performs no I/O of its own. Network access lives in
//! `eosdl-catalog` and `eosdl-download`; subprocesses in `eosdl-runtime`.

#![deny(unused_crate_dependencies)]

pub mod catalog;
pub mod download;
pub mod ports;
pub mod resolver;
pub mod services;
pub mod version;

// Re-export commonly used types for convenience
pub use catalog::{
    ArtifactDescriptor, ArtifactFile, CatalogEntry, Checksum, ChecksumAlgorithm, ChecksumSource,
    Manifest, ManifestBuilder, PackageType, Session,
};
pub use download::{
    DownloadError, DownloadOptions, DownloadResult, DownloadStatus, Verification,
};
pub use ports::{CatalogError, CatalogPort, CatalogResult, CoreError};
pub use resolver::{ArtifactResolver, ResolveError, ResolveFilter, Selection, TieBreakPolicy};
pub use services::CatalogService;
pub use version::{Branch, ReleaseType, Version, VersionError, VersionScheme};

// Only exercised by the integration tests under tests/
#[cfg(test)]
use proptest as _;
