//! Folder-tree retrieval.

use eosdl_core::{Manifest, PackageType, Session};

use crate::error::HttpResult;
use crate::http::HttpBackend;
use crate::parsing::parse_folder_tree;
use crate::url::build_folder_tree_url;

use super::CatalogClient;

impl<B: HttpBackend> CatalogClient<B> {
    /// Fetch and parse the folder tree for one package type.
    ///
    /// A single request; never cached.
    pub(crate) async fn folder_tree(
        &self,
        session: &Session,
        package: PackageType,
    ) -> HttpResult<Manifest> {
        let url = build_folder_tree_url(&self.endpoints, package);
        let body = self.backend.get_text(&url, session.code()).await?;
        parse_folder_tree(&body, package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use crate::models::CatalogEndpoints;

    #[tokio::test]
    async fn test_folder_tree_uses_session_and_package() {
        let backend = FakeBackend::new().with_response(
            "getFolderTree",
            CannedResponse::Text(
                r#"<root><file path="a/cvp-2023.2.1.ova">cvp-2023.2.1.ova</file></root>"#.into(),
            ),
        );
        let client = CatalogClient::with_backend(CatalogEndpoints::default(), backend);
        let manifest = client
            .folder_tree(&Session::new("code-9"), PackageType::Platform)
            .await
            .unwrap();
        assert_eq!(manifest.len(), 1);

        let requests = client.backend.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.ends_with("getFolderTree/?package=platform"));
        assert_eq!(requests[0].bearer.as_deref(), Some("code-9"));
    }
}
