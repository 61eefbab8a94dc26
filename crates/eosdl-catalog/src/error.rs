//! Internal error types for catalog operations.
//!
//! These errors are internal to `eosdl-catalog` and are mapped to the core
//! `CatalogError` at the port boundary.

use thiserror::Error;

/// Result type alias for catalog HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors raised while talking to the vendor service.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request failed with an HTTP error status.
    #[error("Catalog request failed with status {status}: {url}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// The service answered but refused the credentials.
    #[error("Session request rejected: {message}")]
    Rejected {
        /// Status message returned by the service
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {url}")]
    Timeout {
        /// The URL that was requested
        url: String,
    },

    /// The response had an unexpected shape.
    #[error("Invalid response from catalog: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Folder tree document is not well-formed XML.
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] roxmltree::Error),
}

impl HttpError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}
