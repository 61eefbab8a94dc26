//! Internal models: resolved endpoint set and wire DTOs.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{CatalogClientConfig, DEFAULT_BASE_URL};
use crate::error::HttpResult;

// ============================================================================
// Resolved configuration
// ============================================================================

/// Endpoint set derived from a [`CatalogClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoints {
    /// Base every relative catalog path is joined onto; always ends in `/`
    pub base_url: Url,
    /// Session-code endpoint
    pub session_url: Url,
    /// Folder-tree endpoint (without query)
    pub folder_tree_url: Url,
}

impl CatalogEndpoints {
    /// Resolve the configured strings into absolute URLs.
    pub fn from_config(config: &CatalogClientConfig) -> HttpResult<Self> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;
        Ok(Self {
            session_url: base_url.join(&config.session_path)?,
            folder_tree_url: base_url.join(&config.folder_tree_path)?,
            base_url,
        })
    }
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid");
        Self {
            session_url: base_url
                .join(crate::config::DEFAULT_SESSION_PATH)
                .expect("default session path is valid"),
            folder_tree_url: base_url
                .join(crate::config::DEFAULT_FOLDER_TREE_PATH)
                .expect("default folder tree path is valid"),
            base_url,
        }
    }
}

// ============================================================================
// Session exchange
// ============================================================================

/// Body of the session-code request.
#[derive(Debug, Serialize)]
pub struct SessionRequest {
    /// Base64 of the user's API token
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// Body of the session-code response.
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub status: SessionStatus,
    #[serde(default)]
    pub data: Option<SessionData>,
}

#[derive(Debug, Deserialize)]
pub struct SessionStatus {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionData {
    pub session_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_from_default_config() {
        let endpoints = CatalogEndpoints::from_config(&CatalogClientConfig::default()).unwrap();
        assert_eq!(endpoints, CatalogEndpoints::default());
        assert_eq!(
            endpoints.session_url.as_str(),
            "https://www.arista.com/custom_data/api/cvp/getSessionCode/"
        );
    }

    #[test]
    fn endpoints_add_trailing_slash() {
        let config = CatalogClientConfig::new().with_base_url("http://mirror.local/eos");
        let endpoints = CatalogEndpoints::from_config(&config).unwrap();
        assert_eq!(endpoints.base_url.as_str(), "http://mirror.local/eos/");
        assert_eq!(
            endpoints.folder_tree_url.as_str(),
            "http://mirror.local/eos/custom_data/api/cvp/getFolderTree/"
        );
    }

    #[test]
    fn endpoints_reject_garbage() {
        let config = CatalogClientConfig::new().with_base_url("not a url");
        assert!(CatalogEndpoints::from_config(&config).is_err());
    }

    #[test]
    fn session_request_uses_wire_name() {
        let body = serde_json::to_value(SessionRequest {
            access_token: "dG9rZW4=".into(),
        })
        .unwrap();
        assert_eq!(body["accessToken"], "dG9rZW4=");
    }
}
