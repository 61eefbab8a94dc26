//! Vendor version model.
//!
//! Two schemes share one ordering contract:
//!
//! - **Switch** images: `MAJOR.MINOR.PATCH[.BUILD]TYPE`, e.g. `4.29.3M`,
//!   `4.28.10.1F`, `4.30.0INT`.
//! - **Platform** packages: `MAJOR.MINOR.PATCH[.BUILD]`, e.g. `2023.1.0`.
//!
//! Ordering compares the numeric components only. The release type is an
//! informational tag and never separates two versions in [`Version::compare`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Numeric components reject leading zeros so that every accepted string
/// formats back to itself.
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:\.(0|[1-9]\d*))?(M|F|INT)?$",
    )
    .expect("version pattern is a valid regex")
});

static BRANCH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9]\d*)\.(0|[1-9]\d*)$").expect("branch pattern is a valid regex")
});

/// Errors raised while parsing version-related strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    /// The string does not match either version grammar.
    #[error("Invalid version format: '{input}'")]
    InvalidVersionFormat {
        /// The rejected input.
        input: String,
    },

    /// The string is not a `MAJOR.MINOR` branch.
    #[error("Invalid branch format: '{input}' (expected MAJOR.MINOR)")]
    InvalidBranch {
        /// The rejected input.
        input: String,
    },

    /// The string names no known release type.
    #[error("Unknown release type: '{input}' (expected M, F or INT)")]
    InvalidReleaseType {
        /// The rejected input.
        input: String,
    },
}

impl VersionError {
    fn format(input: &str) -> Self {
        Self::InvalidVersionFormat {
            input: input.to_string(),
        }
    }
}

// ============================================================================
// Release Type
// ============================================================================

/// Support tier of a switch release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReleaseType {
    /// Maintenance release (`M`).
    Maintenance,
    /// Feature release (`F`).
    Feature,
    /// Internal/engineering build (`INT`).
    Internal,
}

impl ReleaseType {
    /// All release types in declaration order.
    pub const ALL: [Self; 3] = [Self::Maintenance, Self::Feature, Self::Internal];

    /// Suffix used inside version strings.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Maintenance => "M",
            Self::Feature => "F",
            Self::Internal => "INT",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Feature => "feature",
            Self::Internal => "internal",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Self::Maintenance),
            "F" => Some(Self::Feature),
            "INT" => Some(Self::Internal),
            _ => None,
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ReleaseType {
    type Err = VersionError;

    /// Accepts the short codes and the long names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "maintenance" => Ok(Self::Maintenance),
            "f" | "feature" => Ok(Self::Feature),
            "int" | "internal" => Ok(Self::Internal),
            _ => Err(VersionError::InvalidReleaseType {
                input: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Scheme
// ============================================================================

/// Which of the two version grammars a [`Version`] follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionScheme {
    /// Switch image versions, always carrying a release type.
    Switch,
    /// Platform package versions, never carrying a release type.
    Platform,
}

// ============================================================================
// Branch
// ============================================================================

/// The `MAJOR.MINOR` prefix that groups releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Branch {
    major: u32,
    minor: u32,
}

impl Branch {
    /// Create a branch from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Major component.
    #[must_use]
    pub const fn major(self) -> u32 {
        self.major
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(self) -> u32 {
        self.minor
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Branch {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::InvalidBranch {
            input: s.to_string(),
        };
        let caps = BRANCH_PATTERN.captures(s).ok_or_else(invalid)?;
        let major = caps[1].parse().map_err(|_| invalid())?;
        let minor = caps[2].parse().map_err(|_| invalid())?;
        Ok(Self { major, minor })
    }
}

// ============================================================================
// Version
// ============================================================================

/// A parsed vendor version. Immutable once constructed.
///
/// Equality covers every field. Ordering ([`Version::compare`]) covers the
/// numeric components only, so two versions that differ solely by release
/// type compare as equal while not being `==`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
    build_suffix: Option<u32>,
    release_type: Option<ReleaseType>,
}

impl Version {
    /// Create a switch-scheme version.
    #[must_use]
    pub const fn switch(major: u32, minor: u32, patch: u32, release_type: ReleaseType) -> Self {
        Self {
            major,
            minor,
            patch,
            build_suffix: None,
            release_type: Some(release_type),
        }
    }

    /// Create a platform-scheme version.
    #[must_use]
    pub const fn platform(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build_suffix: None,
            release_type: None,
        }
    }

    /// Attach the optional fourth numeric component.
    #[must_use]
    pub const fn with_build_suffix(mut self, build: u32) -> Self {
        self.build_suffix = Some(build);
        self
    }

    /// Parse either scheme. The presence of a release type selects the scheme.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let caps = VERSION_PATTERN
            .captures(s)
            .ok_or_else(|| VersionError::format(s))?;

        let number = |idx: usize| -> Result<u32, VersionError> {
            caps[idx].parse().map_err(|_| VersionError::format(s))
        };

        let build_suffix = match caps.get(4) {
            Some(m) => Some(m.as_str().parse().map_err(|_| VersionError::format(s))?),
            None => None,
        };

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            build_suffix,
            release_type: caps.get(5).and_then(|m| ReleaseType::from_code(m.as_str())),
        })
    }

    /// Parse and require a specific scheme.
    pub fn parse_scheme(s: &str, scheme: VersionScheme) -> Result<Self, VersionError> {
        let version = Self::parse(s)?;
        if version.scheme() == scheme {
            Ok(version)
        } else {
            Err(VersionError::format(s))
        }
    }

    /// Major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Patch component.
    #[must_use]
    pub const fn patch(&self) -> u32 {
        self.patch
    }

    /// Optional fourth numeric component (`4.28.10.1M` → `Some(1)`).
    #[must_use]
    pub const fn build_suffix(&self) -> Option<u32> {
        self.build_suffix
    }

    /// Release type; `None` for platform versions.
    #[must_use]
    pub const fn release_type(&self) -> Option<ReleaseType> {
        self.release_type
    }

    /// Grammar this version was written in.
    #[must_use]
    pub const fn scheme(&self) -> VersionScheme {
        if self.release_type.is_some() {
            VersionScheme::Switch
        } else {
            VersionScheme::Platform
        }
    }

    /// `MAJOR.MINOR` grouping.
    #[must_use]
    pub const fn branch(&self) -> Branch {
        Branch::new(self.major, self.minor)
    }

    /// Whether this version belongs to `branch`.
    #[must_use]
    pub fn is_in_branch(&self, branch: Branch) -> bool {
        self.branch() == branch
    }

    /// Total order over the numeric components.
    ///
    /// A missing build suffix sorts before any present one, so `4.28.10M`
    /// precedes `4.28.10.1M`.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch, self.build_suffix).cmp(&(
            other.major,
            other.minor,
            other.patch,
            other.build_suffix,
        ))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(build) = self.build_suffix {
            write!(f, ".{build}")?;
        }
        if let Some(rt) = self.release_type {
            f.write_str(rt.code())?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
