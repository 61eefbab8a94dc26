//! HTTP backend abstraction for the vendor catalog.
//!
//! The client is generic over [`HttpBackend`] so tests can substitute a fake.
//! The production implementation uses reqwest. There is no retry: a failed
//! call is reported and the caller decides.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::{HttpError, HttpResult};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Transport used by the catalog client.
///
/// This is an implementation detail - external code uses the `CatalogPort`
/// trait.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// POST a JSON body and deserialize the JSON answer.
    async fn post_json<B, T>(&self, url: &Url, body: &B) -> HttpResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send;

    /// GET a URL with a bearer token and return the body as text.
    async fn get_text(&self, url: &Url, bearer: &str) -> HttpResult<String>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    /// Create a backend honouring the configured timeout and user agent.
    pub fn new(config: &CatalogClientConfig) -> HttpResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    /// Map a transport error, singling out timeouts.
    fn classify(url: &Url, err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout {
                url: url.to_string(),
            }
        } else {
            HttpError::Network(err)
        }
    }

    fn check_status(url: &Url, response: reqwest::Response) -> HttpResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(HttpError::RequestFailed {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn post_json<B, T>(&self, url: &Url, body: &B) -> HttpResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        debug!(%url, "POST");
        let response = self
            .client
            .post(url.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| Self::classify(url, e))?;
        let response = Self::check_status(url, response)?;
        let bytes = response.bytes().await.map_err(|e| Self::classify(url, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_text(&self, url: &Url, bearer: &str) -> HttpResult<String> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url.as_str())
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| Self::classify(url, e))?;
        let response = Self::check_status(url, response)?;
        response.text().await.map_err(|e| Self::classify(url, e))
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn reqwest_backend_builds_with_timeout() {
        let config = CatalogClientConfig::new().with_timeout(Duration::from_secs(3));
        assert!(ReqwestBackend::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_fake_backend_records_and_answers() {
        let backend = FakeBackend::new()
            .with_response("getSessionCode", CannedResponse::Json(json!({"ok": true})))
            .with_response("getFolderTree", CannedResponse::Text("<tree/>".into()));

        let url = Url::parse("https://example.com/getSessionCode/").unwrap();
        let answer: serde_json::Value = backend
            .post_json(&url, &json!({"accessToken": "x"}))
            .await
            .unwrap();
        assert_eq!(answer["ok"], true);

        let url = Url::parse("https://example.com/getFolderTree/?package=switch").unwrap();
        let text = backend.get_text(&url, "code").await.unwrap();
        assert_eq!(text, "<tree/>");

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, Some(json!({"accessToken": "x"})));
        assert_eq!(requests[1].bearer.as_deref(), Some("code"));
    }

    #[tokio::test]
    async fn test_fake_backend_returns_404_for_unknown_url() {
        let backend = FakeBackend::new();
        let url = Url::parse("https://example.com/unknown").unwrap();
        let result = backend.get_text(&url, "code").await;
        assert!(matches!(
            result,
            Err(HttpError::RequestFailed { status: 404, .. })
        ));
    }
}
