//! Public configuration for the catalog client.
//!
//! This module provides a stable public API for configuring the client.
//! The internal endpoint set is derived from this.

use std::time::Duration;

/// Default vendor base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.arista.com/";

/// Default session-code endpoint, relative to the base URL.
pub const DEFAULT_SESSION_PATH: &str = "custom_data/api/cvp/getSessionCode/";

/// Default folder-tree endpoint, relative to the base URL.
pub const DEFAULT_FOLDER_TREE_PATH: &str = "custom_data/api/cvp/getFolderTree/";

/// Configuration for the catalog client.
///
/// # Example
///
/// ```
/// use eosdl_catalog::CatalogClientConfig;
/// use std::time::Duration;
///
/// let config = CatalogClientConfig::new()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-app/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Base URL every catalog path is resolved against
    pub(crate) base_url: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Per-request timeout
    pub(crate) timeout: Duration,
    /// Session-code endpoint relative to the base
    pub(crate) session_path: String,
    /// Folder-tree endpoint relative to the base
    pub(crate) folder_tree_path: String,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("eosdl/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            session_path: DEFAULT_SESSION_PATH.to_string(),
            folder_tree_path: DEFAULT_FOLDER_TREE_PATH.to_string(),
        }
    }
}

impl CatalogClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    ///
    /// Defaults to `https://www.arista.com/`. A missing trailing slash is
    /// added when the client is built.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the session-code endpoint path.
    #[must_use]
    pub fn with_session_path(mut self, path: impl Into<String>) -> Self {
        self.session_path = path.into();
        self
    }

    /// Override the folder-tree endpoint path.
    #[must_use]
    pub fn with_folder_tree_path(mut self, path: impl Into<String>) -> Self {
        self.folder_tree_path = path.into();
        self
    }

    /// Configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_vendor_portal() {
        let config = CatalogClientConfig::new();
        assert_eq!(config.base_url, "https://www.arista.com/");
        assert!(config.user_agent.starts_with("eosdl/"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.session_path, DEFAULT_SESSION_PATH);
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = CatalogClientConfig::new()
            .with_base_url("http://127.0.0.1:8080")
            .with_user_agent("test-agent")
            .with_timeout(Duration::from_secs(5))
            .with_folder_tree_path("tree/");

        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.folder_tree_path, "tree/");
    }
}
