//! URL construction helpers.
//!
//! Pure functions; every catalog path is resolved against the configured base.

use eosdl_core::PackageType;
use url::Url;

use crate::error::HttpResult;
use crate::models::CatalogEndpoints;

/// Folder-tree URL for one package type.
pub fn build_folder_tree_url(endpoints: &CatalogEndpoints, package: PackageType) -> Url {
    let mut url = endpoints.folder_tree_url.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("package", package.as_str());
    url
}

/// Absolute URL of a path published in the folder tree.
///
/// Leading slashes are dropped so the path always lands under the base,
/// even when the base has a path prefix of its own.
pub fn resolve_catalog_path(endpoints: &CatalogEndpoints, path: &str) -> HttpResult<Url> {
    Ok(endpoints.base_url.join(path.trim_start_matches('/'))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogClientConfig;

    fn endpoints(base: &str) -> CatalogEndpoints {
        CatalogEndpoints::from_config(&CatalogClientConfig::new().with_base_url(base)).unwrap()
    }

    #[test]
    fn test_folder_tree_url() {
        let url = build_folder_tree_url(&CatalogEndpoints::default(), PackageType::Platform);
        assert_eq!(
            url.as_str(),
            "https://www.arista.com/custom_data/api/cvp/getFolderTree/?package=platform"
        );
    }

    #[test]
    fn test_resolve_relative_and_rooted_paths() {
        let e = endpoints("https://mirror.local/vendor/");
        assert_eq!(
            resolve_catalog_path(&e, "support/EOS-4.29.3M.swi")
                .unwrap()
                .as_str(),
            "https://mirror.local/vendor/support/EOS-4.29.3M.swi"
        );
        assert_eq!(
            resolve_catalog_path(&e, "/support/EOS-4.29.3M.swi")
                .unwrap()
                .as_str(),
            "https://mirror.local/vendor/support/EOS-4.29.3M.swi"
        );
    }
}
