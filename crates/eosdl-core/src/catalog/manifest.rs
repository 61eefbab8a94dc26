//! The parsed remote catalog.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use super::types::{ArtifactFile, CatalogEntry, ChecksumAlgorithm, PackageType};
use crate::version::{Branch, Version};

/// Read-only collection of catalog entries, sorted newest first.
///
/// Holds one entry per `(version, package type)` pair and never the same
/// format twice within an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<CatalogEntry>,
}

impl Manifest {
    /// Start building a manifest.
    #[must_use]
    pub fn builder() -> ManifestBuilder {
        ManifestBuilder::default()
    }

    /// All entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one package type, newest first.
    pub fn entries_for(&self, package: PackageType) -> impl Iterator<Item = &CatalogEntry> {
        self.entries
            .iter()
            .filter(move |e| e.package_type == package)
    }

    /// Entry for an exact version.
    #[must_use]
    pub fn find(&self, package: PackageType, version: &Version) -> Option<&CatalogEntry> {
        self.entries_for(package).find(|e| &e.version == version)
    }

    /// Versions of one package type, newest first.
    #[must_use]
    pub fn versions(&self, package: PackageType) -> Vec<&Version> {
        self.entries_for(package).map(|e| &e.version).collect()
    }

    /// Distinct branches of one package type, newest first.
    #[must_use]
    pub fn branches(&self, package: PackageType) -> Vec<Branch> {
        let mut branches: Vec<Branch> = self
            .entries_for(package)
            .map(|e| e.version.branch())
            .collect();
        branches.sort_unstable_by(|a, b| b.cmp(a));
        branches.dedup();
        branches
    }

    /// Newest branch of one package type.
    #[must_use]
    pub fn latest_branch(&self, package: PackageType) -> Option<Branch> {
        self.branches(package).into_iter().next()
    }
}

type EntryKey = (PackageType, Version);

/// Incremental manifest construction.
///
/// Checksum files may be seen before or after the artifact they cover;
/// they are attached when [`ManifestBuilder::build`] runs. Checksums whose
/// artifact never appears are dropped.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    entries: HashMap<EntryKey, BTreeMap<String, ArtifactFile>>,
    order: Vec<EntryKey>,
    checksums: HashMap<String, Vec<(ChecksumAlgorithm, String)>>,
}

impl ManifestBuilder {
    /// Record an artifact file. A second file for the same
    /// `(package, version, format)` is ignored with a warning.
    pub fn add_artifact(
        &mut self,
        package: PackageType,
        version: Version,
        format: &str,
        file: ArtifactFile,
    ) -> &mut Self {
        let key = (package, version);
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        let files = self.entries.entry(key).or_default();
        if let Some(existing) = files.get(format) {
            warn!(
                format,
                kept = %existing.download_path,
                ignored = %file.download_path,
                "Duplicate catalog file ignored"
            );
        } else {
            files.insert(format.to_string(), file);
        }
        self
    }

    /// Record a checksum file for the artifact named `artifact_file_name`.
    pub fn add_checksum(
        &mut self,
        artifact_file_name: &str,
        algorithm: ChecksumAlgorithm,
        path: impl Into<String>,
    ) -> &mut Self {
        self.checksums
            .entry(artifact_file_name.to_string())
            .or_default()
            .push((algorithm, path.into()));
        self
    }

    /// Finish the manifest, sorted newest first.
    #[must_use]
    pub fn build(mut self) -> Manifest {
        let mut entries: Vec<CatalogEntry> = self
            .order
            .into_iter()
            .filter_map(|key| {
                let mut files = self.entries.remove(&key)?;
                for file in files.values_mut() {
                    if let Some(sums) = self.checksums.get(&file.file_name) {
                        for (algorithm, path) in sums {
                            file.checksum_paths
                                .entry(*algorithm)
                                .or_insert_with(|| path.clone());
                        }
                    }
                }
                let (package_type, version) = key;
                Some(CatalogEntry {
                    version,
                    package_type,
                    files,
                })
            })
            .collect();

        // Stable sort keeps catalog order between numerically equal versions.
        entries.sort_by(|a, b| b.version.compare(&a.version));
        Manifest { entries }
    }
}
