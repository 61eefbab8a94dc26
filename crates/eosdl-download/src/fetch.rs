//! Streaming HTTP fetch abstraction.
//!
//! The orchestrator only sees [`ArtifactFetcher`]; tests plug in fakes that
//! count calls or stall, production uses [`ReqwestFetcher`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use eosdl_core::DownloadError;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tracing::debug;
use url::Url;

/// Body of a response as a stream of chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes, DownloadError>>;

/// An opened transfer.
pub struct FetchResponse {
    /// Size announced by the server, if any.
    pub content_length: Option<u64>,
    /// Response body.
    pub body: ByteStream,
}

/// Opens streamed GET requests.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Start a GET of `url`. Non-success statuses are errors.
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, DownloadError>;
}

/// Default time allowed to establish a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Production fetcher using reqwest.
///
/// No overall request timeout is set because artifacts run to gigabytes;
/// stalls are caught by the orchestrator's per-chunk timeout.
pub struct ReqwestFetcher {
    client: reqwest::Client,
    bearer: Option<String>,
}

impl ReqwestFetcher {
    /// Create a fetcher with the given connect timeout and user agent.
    pub fn new(connect_timeout: Duration, user_agent: &str) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| DownloadError::failed("", format!("HTTP client setup: {e}")))?;
        Ok(Self {
            client,
            bearer: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

fn map_reqwest_error(url: &Url, err: &reqwest::Error) -> DownloadError {
    if err.is_timeout() {
        DownloadError::timeout(url.as_str())
    } else {
        DownloadError::failed(url.as_str(), err.to_string())
    }
}

#[async_trait]
impl ArtifactFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, DownloadError> {
        debug!(%url, "Opening transfer");
        let mut request = self.client.get(url.as_str());
        if let Some(ref token) = self.bearer {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::failed_with_status(
                url.as_str(),
                status.as_u16(),
            ));
        }

        let content_length = response.content_length();
        let stream_url = url.clone();
        let body = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| map_reqwest_error(&stream_url, &e)))
            .boxed();

        Ok(FetchResponse {
            content_length,
            body,
        })
    }
}
