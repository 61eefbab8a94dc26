//! Port trait implementation for `CatalogClient`.
//!
//! Implements the core-owned `CatalogPort` trait and converts internal HTTP
//! errors into core `CatalogError` values.

use async_trait::async_trait;
use eosdl_core::{
    ArtifactDescriptor, CatalogEntry, CatalogError, CatalogPort, CatalogResult, Manifest,
    PackageType, Session,
};

use crate::client::CatalogClient;
use crate::error::HttpError;
use crate::http::HttpBackend;

// ============================================================================
// Error Mapping
// ============================================================================

/// Which call produced the error; 401/403 only mean "bad token" for the
/// session exchange and "expired session" for the tree fetch.
#[derive(Clone, Copy)]
enum Stage {
    Session,
    FolderTree,
}

/// Convert internal `HttpError` to core `CatalogError`.
fn map_error(err: HttpError, stage: Stage) -> CatalogError {
    match err {
        HttpError::RequestFailed { status, url } => match status {
            401 | 403 => CatalogError::AuthenticationError {
                reason: match stage {
                    Stage::Session => format!("token rejected (HTTP {status})"),
                    Stage::FolderTree => format!("session rejected (HTTP {status})"),
                },
            },
            _ => CatalogError::CatalogUnavailable {
                message: format!("request failed with status {status}: {url}"),
            },
        },
        HttpError::Rejected { message } => CatalogError::AuthenticationError { reason: message },
        HttpError::Timeout { url } => CatalogError::CatalogUnavailable {
            message: format!("timed out: {url}"),
        },
        HttpError::Network(e) => CatalogError::CatalogUnavailable {
            message: e.to_string(),
        },
        HttpError::InvalidUrl(e) => CatalogError::Configuration {
            message: e.to_string(),
        },
        HttpError::InvalidResponse { message } => CatalogError::MalformedCatalog { message },
        HttpError::JsonParse(e) => CatalogError::MalformedCatalog {
            message: e.to_string(),
        },
        HttpError::XmlParse(e) => CatalogError::MalformedCatalog {
            message: e.to_string(),
        },
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend + 'static> CatalogPort for CatalogClient<B> {
    async fn authenticate(&self, token: &str) -> CatalogResult<Session> {
        if token.trim().is_empty() {
            return Err(CatalogError::AuthenticationError {
                reason: "empty token".to_string(),
            });
        }
        self.request_session(token)
            .await
            .map_err(|e| map_error(e, Stage::Session))
    }

    async fn fetch_manifest(
        &self,
        session: &Session,
        package: PackageType,
    ) -> CatalogResult<Manifest> {
        self.folder_tree(session, package)
            .await
            .map_err(|e| map_error(e, Stage::FolderTree))
    }

    fn describe(&self, entry: &CatalogEntry, format: &str) -> CatalogResult<ArtifactDescriptor> {
        self.build_descriptor(entry, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use crate::models::CatalogEndpoints;
    use serde_json::json;

    fn client(backend: FakeBackend) -> CatalogClient<FakeBackend> {
        CatalogClient::with_backend(CatalogEndpoints::default(), backend)
    }

    #[test]
    fn test_map_error_auth_statuses() {
        let err = map_error(
            HttpError::RequestFailed {
                status: 401,
                url: "u".into(),
            },
            Stage::Session,
        );
        assert!(matches!(err, CatalogError::AuthenticationError { .. }));

        let err = map_error(
            HttpError::RequestFailed {
                status: 502,
                url: "u".into(),
            },
            Stage::FolderTree,
        );
        assert!(matches!(err, CatalogError::CatalogUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_empty_token_without_network() {
        let client = client(FakeBackend::new());
        let err = client.authenticate("   ").await.unwrap_err();
        assert!(matches!(err, CatalogError::AuthenticationError { .. }));
        assert!(client.backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_forbidden() {
        let client = client(
            FakeBackend::new().with_response("getSessionCode", CannedResponse::Status(403)),
        );
        assert!(matches!(
            client.authenticate("tok").await,
            Err(CatalogError::AuthenticationError { .. })
        ));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let client = client(FakeBackend::new().with_response(
            "getSessionCode",
            CannedResponse::Json(json!({
                "status": {"message": "Success"},
                "data": {"session_code": "s"}
            })),
        ));
        assert_eq!(client.authenticate("tok").await.unwrap().code(), "s");
    }

    #[tokio::test]
    async fn test_fetch_manifest_timeout_is_unavailable() {
        let client =
            client(FakeBackend::new().with_response("getFolderTree", CannedResponse::Timeout));
        let err = client
            .fetch_manifest(&Session::new("s"), PackageType::Switch)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::CatalogUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_fetch_manifest_garbage_is_malformed() {
        let client = client(FakeBackend::new().with_response(
            "getFolderTree",
            CannedResponse::Text("<!DOCTYPE html><html>".into()),
        ));
        let err = client
            .fetch_manifest(&Session::new("s"), PackageType::Switch)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::MalformedCatalog { .. }));
    }

    #[tokio::test]
    async fn test_fetch_manifest_expired_session() {
        let client =
            client(FakeBackend::new().with_response("getFolderTree", CannedResponse::Status(401)));
        let err = client
            .fetch_manifest(&Session::new("old"), PackageType::Platform)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::AuthenticationError { reason } if reason.contains("session")));
    }
}
