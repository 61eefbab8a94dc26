//! Published artifact formats and their filename templates.
//!
//! Every format is a `prefix{version}suffix` template. Identifying a filename
//! means stripping both ends and parsing the middle as a version of the
//! package's scheme; the strict version grammar keeps overlapping templates
//! (`EOS-{v}.swi` vs `EOS-{v}-INT.swi`) from matching each other's files.

use super::types::{ChecksumAlgorithm, PackageType};
use crate::version::Version;

/// A named artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    /// Format name as used on the command line (`cEOS`, `vEOS-lab`, `ova`...).
    pub name: &'static str,
    prefix: &'static str,
    suffix: &'static str,
}

impl FormatSpec {
    const fn new(name: &'static str, prefix: &'static str, suffix: &'static str) -> Self {
        Self {
            name,
            prefix,
            suffix,
        }
    }

    /// Published filename of this format for `version`.
    #[must_use]
    pub fn file_name(&self, version: &Version) -> String {
        format!("{}{version}{}", self.prefix, self.suffix)
    }

    /// Extract the version from `file_name` if it follows this template.
    #[must_use]
    pub fn match_file_name(&self, file_name: &str, package: PackageType) -> Option<Version> {
        let middle = file_name
            .strip_prefix(self.prefix)?
            .strip_suffix(self.suffix)?;
        Version::parse_scheme(middle, package.scheme()).ok()
    }
}

const SWITCH_FORMATS: &[FormatSpec] = &[
    FormatSpec::new("default", "EOS-", ".swi"),
    FormatSpec::new("64", "EOS64-", ".swi"),
    FormatSpec::new("INT", "EOS-", "-INT.swi"),
    FormatSpec::new("2GB", "EOS-2GB-", ".swi"),
    FormatSpec::new("2GB-INT", "EOS-2GB-", "-INT.swi"),
    FormatSpec::new("cEOS", "cEOS-lab-", ".tar.xz"),
    FormatSpec::new("cEOS64", "cEOS64-lab-", ".tar.xz"),
    FormatSpec::new("vEOS", "vEOS-", ".vmdk"),
    FormatSpec::new("vEOS-lab", "vEOS-lab-", ".vmdk"),
    FormatSpec::new("vEOS64-lab", "vEOS64-lab-", ".vmdk"),
    FormatSpec::new("source", "EOS-", "-source.tar"),
    FormatSpec::new("RN", "RN-", ".pdf"),
];

const PLATFORM_FORMATS: &[FormatSpec] = &[
    FormatSpec::new("ova", "cvp-", ".ova"),
    FormatSpec::new("rpm", "cvp-rpm-installer-", ""),
    FormatSpec::new("kvm", "cvp-", "-kvm.tgz"),
    FormatSpec::new("upgrade", "cvp-upgrade-", ".tgz"),
];

/// Known formats for a package type.
#[must_use]
pub const fn formats(package: PackageType) -> &'static [FormatSpec] {
    match package {
        PackageType::Switch => SWITCH_FORMATS,
        PackageType::Platform => PLATFORM_FORMATS,
    }
}

/// Look up a format by name (case-insensitive).
#[must_use]
pub fn find_format(package: PackageType, name: &str) -> Option<&'static FormatSpec> {
    formats(package)
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

/// What a catalog filename turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// A downloadable artifact.
    Artifact {
        /// Format name.
        format: &'static str,
        /// Version parsed from the filename.
        version: Version,
    },
    /// A checksum file published next to an artifact.
    Checksum {
        /// Digest algorithm.
        algorithm: ChecksumAlgorithm,
        /// Filename of the artifact it covers.
        artifact: String,
    },
}

/// Classify a filename published for `package`. Unknown files yield `None`.
#[must_use]
pub fn identify(package: PackageType, file_name: &str) -> Option<FileKind> {
    for algorithm in ChecksumAlgorithm::ALL {
        if let Some(artifact) = file_name
            .strip_suffix(algorithm.extension())
            .and_then(|rest| rest.strip_suffix('.'))
        {
            return identify_artifact(package, artifact).map(|_| FileKind::Checksum {
                algorithm,
                artifact: artifact.to_string(),
            });
        }
    }
    identify_artifact(package, file_name)
}

fn identify_artifact(package: PackageType, file_name: &str) -> Option<FileKind> {
    formats(package).iter().find_map(|spec| {
        spec.match_file_name(file_name, package)
            .map(|version| FileKind::Artifact {
                format: spec.name,
                version,
            })
    })
}
