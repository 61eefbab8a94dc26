//! Building download descriptors from catalog entries.

use eosdl_core::{ArtifactDescriptor, CatalogEntry, CatalogError, CatalogResult};

use crate::http::HttpBackend;
use crate::url::resolve_catalog_path;

use super::CatalogClient;

impl<B: HttpBackend> CatalogClient<B> {
    /// Resolve one format of `entry` into absolute artifact and checksum URLs.
    ///
    /// The package's preferred checksum algorithm wins when both are
    /// published. No network I/O happens here.
    pub(crate) fn build_descriptor(
        &self,
        entry: &CatalogEntry,
        format: &str,
    ) -> CatalogResult<ArtifactDescriptor> {
        let Some((format_name, file)) = entry
            .files
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(format))
        else {
            return Err(CatalogError::FormatUnavailable {
                version: entry.version.to_string(),
                format: format.to_string(),
                available: entry.available_formats().collect::<Vec<_>>().join(", "),
            });
        };

        let url = resolve_catalog_path(&self.endpoints, &file.download_path).map_err(|e| {
            CatalogError::MalformedCatalog {
                message: format!("bad download path '{}': {e}", file.download_path),
            }
        })?;
        let mut descriptor =
            ArtifactDescriptor::new(entry.clone(), format_name.clone(), file.file_name.clone(), url);

        if let Some((algorithm, path)) =
            file.checksum_path(entry.package_type.preferred_checksum())
        {
            let checksum_url = resolve_catalog_path(&self.endpoints, path).map_err(|e| {
                CatalogError::MalformedCatalog {
                    message: format!("bad checksum path '{path}': {e}"),
                }
            })?;
            descriptor = descriptor.with_checksum_source(algorithm, checksum_url);
        }

        Ok(descriptor)
    }
}
