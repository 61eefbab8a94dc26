//! Catalog client: session exchange, folder-tree fetch and descriptor
//! building.

mod descriptor;
mod manifest;
mod session;

use crate::config::CatalogClientConfig;
use crate::error::HttpResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::CatalogEndpoints;

// ============================================================================
// Type Aliases
// ============================================================================

/// Default catalog client using the reqwest HTTP backend.
pub type DefaultCatalogClient = CatalogClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the vendor software catalog.
///
/// Generic over an HTTP backend so tests can use a fake. External code
/// builds a [`DefaultCatalogClient`] and talks to it through the
/// `CatalogPort` trait.
pub struct CatalogClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) endpoints: CatalogEndpoints,
}

impl DefaultCatalogClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &CatalogClientConfig) -> HttpResult<Self> {
        let endpoints = CatalogEndpoints::from_config(config)?;
        let backend = ReqwestBackend::new(config)?;
        Ok(Self { backend, endpoints })
    }
}

impl<B: HttpBackend> CatalogClient<B> {
    /// Create a client with a custom backend.
    ///
    /// Use this for testing with a fake backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(endpoints: CatalogEndpoints, backend: B) -> Self {
        Self { backend, endpoints }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client_creation() {
        assert!(DefaultCatalogClient::new(&CatalogClientConfig::new()).is_ok());
    }

    #[test]
    fn test_client_rejects_bad_base() {
        let config = CatalogClientConfig::new().with_base_url("::nope::");
        assert!(DefaultCatalogClient::new(&config).is_err());
    }
}
