//! Catalog data model: package types, published files, manifests and
//! resolved artifact descriptors.

pub mod formats;
mod manifest;
mod types;

pub use formats::{FileKind, FormatSpec, find_format, formats, identify};
pub use manifest::{Manifest, ManifestBuilder};
pub use types::{
    ArtifactDescriptor, ArtifactFile, CatalogEntry, Checksum, ChecksumAlgorithm, ChecksumSource,
    PackageType, Session,
};
