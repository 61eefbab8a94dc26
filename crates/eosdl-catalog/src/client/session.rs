//! Token to session-code exchange.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use eosdl_core::Session;
use tracing::debug;

use crate::error::HttpResult;
use crate::http::HttpBackend;
use crate::models::{SessionRequest, SessionResponse};
use crate::parsing::parse_session;

use super::CatalogClient;

impl<B: HttpBackend> CatalogClient<B> {
    /// Exchange an API token for a session code.
    pub(crate) async fn request_session(&self, token: &str) -> HttpResult<Session> {
        let request = SessionRequest {
            access_token: STANDARD.encode(token.trim()),
        };
        let response: SessionResponse = self
            .backend
            .post_json(&self.endpoints.session_url, &request)
            .await?;
        let session = parse_session(response)?;
        debug!("Obtained catalog session");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use crate::models::CatalogEndpoints;
    use serde_json::json;

    #[tokio::test]
    async fn test_token_is_base64_encoded() {
        let backend = FakeBackend::new().with_response(
            "getSessionCode",
            CannedResponse::Json(json!({
                "status": {"message": "Success"},
                "data": {"session_code": "sess-1"}
            })),
        );
        let client = CatalogClient::with_backend(CatalogEndpoints::default(), backend);

        let session = client.request_session(" token\n").await.unwrap();
        assert_eq!(session.code(), "sess-1");

        let requests = client.backend.requests();
        assert_eq!(requests[0].body, Some(json!({"accessToken": "dG9rZW4="})));
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let backend = FakeBackend::new().with_response(
            "getSessionCode",
            CannedResponse::Json(json!({"status": {"message": "Access token expired"}})),
        );
        let client = CatalogClient::with_backend(CatalogEndpoints::default(), backend);
        assert!(matches!(
            client.request_session("token").await,
            Err(HttpError::Rejected { .. })
        ));
    }
}
