//! Parsing of catalog responses into typed domain objects.
//!
//! Sync functions only; the client performs the I/O.

use eosdl_core::catalog::{FileKind, identify};
use eosdl_core::{ArtifactFile, Manifest, PackageType, Session};
use tracing::{debug, trace};

use crate::error::{HttpError, HttpResult};
use crate::models::SessionResponse;

const SUCCESS: &str = "Success";

// ============================================================================
// Session
// ============================================================================

/// Turn a session-code response into a [`Session`].
pub fn parse_session(response: SessionResponse) -> HttpResult<Session> {
    if response.status.message != SUCCESS {
        return Err(HttpError::Rejected {
            message: response.status.message,
        });
    }
    let code = response
        .data
        .map(|d| d.session_code)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| HttpError::invalid("session response carries no session code"))?;
    Ok(Session::new(code))
}

// ============================================================================
// Folder tree
// ============================================================================

/// Parse the XML folder tree into a [`Manifest`] for `package`.
///
/// Every `<file path="...">NAME</file>` element is classified by its name;
/// files matching no known template are skipped. Directory nesting carries no
/// meaning beyond grouping, so the walk is flat.
pub fn parse_folder_tree(xml: &str, package: PackageType) -> HttpResult<Manifest> {
    let document = roxmltree::Document::parse(xml)?;
    let mut builder = Manifest::builder();
    let mut skipped = 0usize;

    for node in document
        .descendants()
        .filter(|n| n.has_tag_name("file"))
    {
        let name = node.text().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(HttpError::invalid("file element without a name"));
        }
        let path = node
            .attribute("path")
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| HttpError::invalid(format!("file '{name}' has no path")))?;

        match identify(package, name) {
            Some(FileKind::Artifact { format, version }) => {
                trace!(file = name, %version, format, "Catalog artifact");
                builder.add_artifact(package, version, format, ArtifactFile::new(name, path));
            }
            Some(FileKind::Checksum {
                algorithm,
                artifact,
            }) => {
                builder.add_checksum(&artifact, algorithm, path);
            }
            None => skipped += 1,
        }
    }

    let manifest = builder.build();
    debug!(
        %package,
        entries = manifest.len(),
        skipped,
        "Parsed folder tree"
    );
    Ok(manifest)
}
