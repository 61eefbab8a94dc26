//! Catalog client port trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{ArtifactDescriptor, CatalogEntry, Manifest, PackageType, Session};

/// Errors from catalog port operations.
///
/// These are domain-level errors that consumers can handle.
/// Implementation-specific errors (HTTP, XML) are mapped to these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The token was rejected or has expired. Fatal for the whole session.
    #[error("Authentication failed: {reason}")]
    AuthenticationError {
        /// Reason reported by the service, or the HTTP status.
        reason: String,
    },

    /// The catalog could not be reached (network failure or timeout).
    #[error("Catalog unavailable: {message}")]
    CatalogUnavailable {
        /// Description of the network failure.
        message: String,
    },

    /// The catalog response could not be parsed.
    #[error("Malformed catalog: {message}")]
    MalformedCatalog {
        /// What was wrong with the response.
        message: String,
    },

    /// The entry does not publish the requested format.
    #[error("Format '{format}' is not published for {version} (available: {available})")]
    FormatUnavailable {
        /// Version of the entry.
        version: String,
        /// Requested format.
        format: String,
        /// Comma-separated list of published formats.
        available: String,
    },

    /// Client configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What's wrong with the configuration.
        message: String,
    },
}

/// Result type alias for catalog port operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Port trait for vendor catalog operations.
///
/// The implementation lives in `eosdl-catalog`. Every manifest fetch is a
/// single network call with no retry and no local caching.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Exchange an API token for a session.
    async fn authenticate(&self, token: &str) -> CatalogResult<Session>;

    /// Fetch and parse the manifest for one package type.
    async fn fetch_manifest(
        &self,
        session: &Session,
        package: PackageType,
    ) -> CatalogResult<Manifest>;

    /// Build the download descriptor for one format of an entry.
    ///
    /// Pure: resolves URLs against the catalog base without network I/O.
    fn describe(&self, entry: &CatalogEntry, format: &str) -> CatalogResult<ArtifactDescriptor>;
}
