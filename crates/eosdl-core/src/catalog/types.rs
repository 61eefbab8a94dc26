//! Catalog domain types.
//!
//! Pure data types with no I/O dependencies. The catalog crate builds these
//! from the remote folder tree; the resolver and download orchestrator only
//! ever read them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::version::{Version, VersionScheme};

/// Kind of software package published by the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// Network OS images (`4.29.3M`).
    Switch,
    /// Management-platform packages (`2023.1.0`).
    Platform,
}

impl PackageType {
    /// Stable lowercase identifier, also used as the manifest query value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Switch => "switch",
            Self::Platform => "platform",
        }
    }

    /// Version grammar used by this package type.
    #[must_use]
    pub const fn scheme(self) -> VersionScheme {
        match self {
            Self::Switch => VersionScheme::Switch,
            Self::Platform => VersionScheme::Platform,
        }
    }

    /// Checksum algorithm preferred when several are published.
    #[must_use]
    pub const fn preferred_checksum(self) -> ChecksumAlgorithm {
        match self {
            Self::Switch => ChecksumAlgorithm::Sha512,
            Self::Platform => ChecksumAlgorithm::Md5,
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "switch" | "eos" => Ok(Self::Switch),
            "platform" | "cvp" => Ok(Self::Platform),
            other => Err(format!(
                "unknown package type '{other}' (expected switch or platform)"
            )),
        }
    }
}

/// Digest algorithms used by published checksum files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    /// SHA-512, published as `<file>.sha512sum`.
    Sha512,
    /// MD5, published as `<file>.md5sum`.
    Md5,
}

impl ChecksumAlgorithm {
    /// All supported algorithms, strongest first.
    pub const ALL: [Self; 2] = [Self::Sha512, Self::Md5];

    /// File extension of the sibling checksum file (without the dot).
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Sha512 => "sha512sum",
            Self::Md5 => "md5sum",
        }
    }

    /// Length of a hex-encoded digest.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Sha512 => 128,
            Self::Md5 => 32,
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha512 => f.write_str("sha512"),
            Self::Md5 => f.write_str("md5"),
        }
    }
}

/// An expected digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    /// Algorithm the digest was computed with.
    pub algorithm: ChecksumAlgorithm,
    /// Lowercase hex digest.
    pub value: String,
}

impl Checksum {
    /// Create a checksum, normalising the hex digest to lowercase.
    pub fn new(algorithm: ChecksumAlgorithm, value: impl AsRef<str>) -> Self {
        Self {
            algorithm,
            value: value.as_ref().trim().to_ascii_lowercase(),
        }
    }

    /// Parse the body of a checksum file: `<hex>[ whitespace filename]`.
    ///
    /// Returns `None` unless the first token is a hex digest of the right
    /// length for `algorithm`.
    #[must_use]
    pub fn parse_file(algorithm: ChecksumAlgorithm, body: &str) -> Option<Self> {
        let token = body.split_whitespace().next()?;
        let valid = token.len() == algorithm.hex_len()
            && token.chars().all(|c| c.is_ascii_hexdigit());
        valid.then(|| Self::new(algorithm, token))
    }
}

/// One published file of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    /// Published filename.
    pub file_name: String,
    /// Path relative to the catalog base URL.
    pub download_path: String,
    /// Sibling checksum files by algorithm, relative to the base URL.
    pub checksum_paths: BTreeMap<ChecksumAlgorithm, String>,
}

impl ArtifactFile {
    /// Create a file entry without checksums.
    pub fn new(file_name: impl Into<String>, download_path: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            download_path: download_path.into(),
            checksum_paths: BTreeMap::new(),
        }
    }

    /// Strongest published checksum, preferring `preferred` when present.
    #[must_use]
    pub fn checksum_path(&self, preferred: ChecksumAlgorithm) -> Option<(ChecksumAlgorithm, &str)> {
        self.checksum_paths
            .get(&preferred)
            .map(|p| (preferred, p.as_str()))
            .or_else(|| {
                self.checksum_paths
                    .iter()
                    .next()
                    .map(|(alg, p)| (*alg, p.as_str()))
            })
    }
}

/// All files published for one `(version, package type)` pair.
///
/// Always holds at least one format; the manifest builder never creates an
/// entry without an artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Version of the release.
    pub version: Version,
    /// Package type of the release.
    pub package_type: PackageType,
    /// Published files keyed by format name.
    pub files: BTreeMap<String, ArtifactFile>,
}

impl CatalogEntry {
    /// Format names available for this entry.
    pub fn available_formats(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// File published for `format`, matched case-insensitively.
    #[must_use]
    pub fn file(&self, format: &str) -> Option<&ArtifactFile> {
        self.files.get(format).or_else(|| {
            self.files
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(format))
                .map(|(_, file)| file)
        })
    }

    /// Download path for `format`.
    #[must_use]
    pub fn download_path(&self, format: &str) -> Option<&str> {
        self.file(format).map(|f| f.download_path.as_str())
    }
}

/// A resolved selection ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// The catalog entry this artifact belongs to.
    pub entry: CatalogEntry,
    /// Selected format name.
    pub format: String,
    /// Published filename, also the on-disk name.
    pub file_name: String,
    /// Absolute URL of the artifact.
    pub resolved_url: Url,
    /// Sibling checksum file to fetch when no digest is known up front.
    pub checksum_source: Option<ChecksumSource>,
    /// Digest the completed file must match.
    pub expected_checksum: Option<Checksum>,
}

/// Location of a published checksum file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumSource {
    /// Digest algorithm.
    pub algorithm: ChecksumAlgorithm,
    /// Absolute URL of the checksum file.
    pub url: Url,
}

impl ChecksumSource {
    /// Filename of the checksum file (last URL segment).
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
    }
}

impl ArtifactDescriptor {
    /// Create a descriptor without any checksum information.
    pub fn new(
        entry: CatalogEntry,
        format: impl Into<String>,
        file_name: impl Into<String>,
        resolved_url: Url,
    ) -> Self {
        Self {
            entry,
            format: format.into(),
            file_name: file_name.into(),
            resolved_url,
            checksum_source: None,
            expected_checksum: None,
        }
    }

    /// Attach the location of a published checksum file.
    #[must_use]
    pub fn with_checksum_source(mut self, algorithm: ChecksumAlgorithm, url: Url) -> Self {
        self.checksum_source = Some(ChecksumSource { algorithm, url });
        self
    }

    /// Attach a known digest.
    #[must_use]
    pub fn with_expected_checksum(mut self, checksum: Checksum) -> Self {
        self.expected_checksum = Some(checksum);
        self
    }

    /// Version of the described artifact.
    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.entry.version
    }
}

/// An authenticated catalog session.
///
/// `Debug` redacts the session code.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    code: String,
}

impl Session {
    /// Wrap a session code returned by the vendor service.
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// The session code, sent as a bearer token.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("code", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_type_parsing() {
        assert_eq!("EOS".parse::<PackageType>().unwrap(), PackageType::Switch);
        assert_eq!("cvp".parse::<PackageType>().unwrap(), PackageType::Platform);
        assert!("router".parse::<PackageType>().is_err());
    }

    #[test]
    fn checksum_file_parsing() {
        let md5 = "D41D8CD98F00B204E9800998ECF8427E  cvp-2023.1.0.ova\n";
        let parsed = Checksum::parse_file(ChecksumAlgorithm::Md5, md5).unwrap();
        assert_eq!(parsed.value, "d41d8cd98f00b204e9800998ecf8427e");

        assert!(Checksum::parse_file(ChecksumAlgorithm::Sha512, md5).is_none());
        assert!(Checksum::parse_file(ChecksumAlgorithm::Md5, "").is_none());
        assert!(Checksum::parse_file(ChecksumAlgorithm::Md5, "<html>oops</html>").is_none());
    }

    #[test]
    fn checksum_path_prefers_requested_algorithm() {
        let mut file = ArtifactFile::new("a.swi", "x/a.swi");
        assert!(file.checksum_path(ChecksumAlgorithm::Sha512).is_none());

        file.checksum_paths
            .insert(ChecksumAlgorithm::Md5, "x/a.swi.md5sum".into());
        assert_eq!(
            file.checksum_path(ChecksumAlgorithm::Sha512),
            Some((ChecksumAlgorithm::Md5, "x/a.swi.md5sum"))
        );

        file.checksum_paths
            .insert(ChecksumAlgorithm::Sha512, "x/a.swi.sha512sum".into());
        assert_eq!(
            file.checksum_path(ChecksumAlgorithm::Sha512),
            Some((ChecksumAlgorithm::Sha512, "x/a.swi.sha512sum"))
        );
    }

    #[test]
    fn session_debug_is_redacted() {
        let session = Session::new("super-secret");
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("super-secret"));
        assert_eq!(session.code(), "super-secret");
    }

    #[test]
    fn checksum_source_file_name() {
        let source = ChecksumSource {
            algorithm: ChecksumAlgorithm::Sha512,
            url: Url::parse("https://example.com/a/EOS-4.29.3M.swi.sha512sum").unwrap(),
        };
        assert_eq!(source.file_name(), Some("EOS-4.29.3M.swi.sha512sum"));
    }
}
