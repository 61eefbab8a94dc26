//! Artifact resolution.
//!
//! Centralizes the rules for picking one catalog entry out of a manifest so
//! that every front-end applies the same semantics.
//!
//! # Resolution Rules
//!
//! 1. Keep entries of the requested package type
//! 2. Apply the branch and release-type constraints, if any
//! 3. Either match the requested version exactly, or pick the greatest
//!    version under [`Version::compare`]
//! 4. Numerically equal candidates are ordered by the [`TieBreakPolicy`]
//!    (Maintenance > Feature > Internal unless configured otherwise)

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use crate::catalog::{CatalogEntry, Manifest, PackageType};
use crate::version::{Branch, ReleaseType, Version, VersionError};

/// Errors produced while resolving a filter against a manifest.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Nothing in the manifest satisfies the filter.
    #[error("No {package} version matches {filter}")]
    NoMatchingVersion {
        /// Package type that was searched.
        package: PackageType,
        /// Human-readable rendering of the filter.
        filter: String,
    },

    /// Both or neither of an exact version and `latest` were requested.
    #[error("Specify exactly one of an exact version or latest")]
    ConflictingSelection,

    /// The requested version string could not be parsed.
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// How the single result is chosen among filtered entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The entry with exactly this version.
    Exact(Version),
    /// The greatest version.
    Latest,
}

/// Criteria for [`ArtifactResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveFilter {
    /// Package type to search.
    pub package: PackageType,
    /// Exact version or latest.
    pub selection: Selection,
    /// Restrict to one `MAJOR.MINOR` branch.
    pub branch: Option<Branch>,
    /// Restrict to one release type.
    pub release_type: Option<ReleaseType>,
}

impl ResolveFilter {
    /// Select the greatest version of `package`.
    #[must_use]
    pub const fn latest(package: PackageType) -> Self {
        Self {
            package,
            selection: Selection::Latest,
            branch: None,
            release_type: None,
        }
    }

    /// Select exactly `version` of `package`.
    #[must_use]
    pub const fn exact(package: PackageType, version: Version) -> Self {
        Self {
            package,
            selection: Selection::Exact(version),
            branch: None,
            release_type: None,
        }
    }

    /// Build a filter from loosely-typed front-end input.
    ///
    /// `version` and `latest` are mutually exclusive and one is required.
    pub fn from_request(
        package: PackageType,
        version: Option<&str>,
        latest: bool,
    ) -> Result<Self, ResolveError> {
        match (version, latest) {
            (Some(v), false) => Ok(Self::exact(
                package,
                Version::parse_scheme(v, package.scheme())?,
            )),
            (None, true) => Ok(Self::latest(package)),
            _ => Err(ResolveError::ConflictingSelection),
        }
    }

    /// Restrict to a branch.
    #[must_use]
    pub const fn with_branch(mut self, branch: Option<Branch>) -> Self {
        self.branch = branch;
        self
    }

    /// Restrict to a release type.
    #[must_use]
    pub const fn with_release_type(mut self, release_type: Option<ReleaseType>) -> Self {
        self.release_type = release_type;
        self
    }

    fn accepts(&self, entry: &CatalogEntry) -> bool {
        entry.package_type == self.package
            && self.branch.is_none_or(|b| entry.version.is_in_branch(b))
            && self
                .release_type
                .is_none_or(|rt| entry.version.release_type() == Some(rt))
    }
}

impl fmt::Display for ResolveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selection {
            Selection::Exact(v) => write!(f, "version {v}")?,
            Selection::Latest => f.write_str("latest")?,
        }
        if let Some(branch) = self.branch {
            write!(f, " on branch {branch}")?;
        }
        if let Some(rt) = self.release_type {
            write!(f, " with release type {}", rt.label())?;
        }
        Ok(())
    }
}

/// Preference among release types when numeric versions tie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieBreakPolicy {
    preference: [ReleaseType; 3],
}

impl TieBreakPolicy {
    /// Create a policy from a most-preferred-first ordering.
    ///
    /// Release types missing from `preference` rank after those present.
    #[must_use]
    pub fn new(preference: &[ReleaseType]) -> Self {
        let mut order = Vec::with_capacity(3);
        for rt in preference.iter().chain(ReleaseType::ALL.iter()) {
            if !order.contains(rt) {
                order.push(*rt);
            }
        }
        Self {
            preference: [order[0], order[1], order[2]],
        }
    }

    fn rank(&self, release_type: Option<ReleaseType>) -> usize {
        release_type
            .and_then(|rt| self.preference.iter().position(|p| *p == rt))
            .unwrap_or(self.preference.len())
    }

    /// `Greater` when `a` is preferred over `b`.
    #[must_use]
    pub fn prefer(&self, a: Option<ReleaseType>, b: Option<ReleaseType>) -> Ordering {
        self.rank(b).cmp(&self.rank(a))
    }
}

impl Default for TieBreakPolicy {
    fn default() -> Self {
        Self {
            preference: [
                ReleaseType::Maintenance,
                ReleaseType::Feature,
                ReleaseType::Internal,
            ],
        }
    }
}

/// Applies [`ResolveFilter`]s to manifests.
#[derive(Debug, Clone, Default)]
pub struct ArtifactResolver {
    policy: TieBreakPolicy,
}

impl ArtifactResolver {
    /// Resolver with the default tie-break policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with a custom tie-break policy.
    #[must_use]
    pub const fn with_policy(policy: TieBreakPolicy) -> Self {
        Self { policy }
    }

    fn order(&self, a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
        a.version.compare(&b.version).then_with(|| {
            self.policy
                .prefer(a.version.release_type(), b.version.release_type())
        })
    }

    /// Resolve `filter` to the single best entry.
    pub fn resolve<'m>(
        &self,
        manifest: &'m Manifest,
        filter: &ResolveFilter,
    ) -> Result<&'m CatalogEntry, ResolveError> {
        let mut candidates = manifest.entries().iter().filter(|e| filter.accepts(e));

        let found = match &filter.selection {
            Selection::Exact(version) => candidates.find(|e| &e.version == version),
            Selection::Latest => candidates.max_by(|a, b| self.order(a, b)),
        };

        found.ok_or_else(|| ResolveError::NoMatchingVersion {
            package: filter.package,
            filter: filter.to_string(),
        })
    }

    /// Every entry satisfying the filter's constraints, best first.
    ///
    /// An exact selection narrows the list to that version.
    #[must_use]
    pub fn list<'m>(&self, manifest: &'m Manifest, filter: &ResolveFilter) -> Vec<&'m CatalogEntry> {
        let mut matching: Vec<&CatalogEntry> = manifest
            .entries()
            .iter()
            .filter(|e| filter.accepts(e))
            .filter(|e| match &filter.selection {
                Selection::Exact(version) => &e.version == version,
                Selection::Latest => true,
            })
            .collect();
        matching.sort_by(|a, b| self.order(b, a));
        matching
    }
}
