//! Vendor catalog client for eosdl.
//!
//! Authenticates with an API token, fetches the XML folder tree for a
//! package type and turns it into the core `Manifest`. Consumers use
//! [`DefaultCatalogClient`] through the `eosdl_core::CatalogPort` trait.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// DefaultCatalogClient is used through the CatalogPort trait, not through
// its generic backend parameter
#![allow(private_interfaces)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod parsing;
mod port;
mod url;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::DefaultCatalogClient;

// Configuration
pub use config::{
    CatalogClientConfig, DEFAULT_BASE_URL, DEFAULT_FOLDER_TREE_PATH, DEFAULT_SESSION_PATH,
};

// Construction errors
pub use error::HttpError;

/// Build the production client, reporting bad configuration as a core error.
pub fn connect(config: &CatalogClientConfig) -> eosdl_core::CatalogResult<DefaultCatalogClient> {
    DefaultCatalogClient::new(config).map_err(|e| eosdl_core::CatalogError::Configuration {
        message: e.to_string(),
    })
}
