//! Catalog service: the resolution surface consumed by front-ends.
//!
//! Combines a [`CatalogPort`] with the [`ArtifactResolver`]. Every call
//! fetches a fresh manifest; nothing is cached between calls.

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{ArtifactDescriptor, CatalogEntry, Manifest, PackageType, Session};
use crate::ports::{CatalogPort, CoreError};
use crate::resolver::{ArtifactResolver, ResolveFilter};
use crate::version::{Branch, ReleaseType};

/// Resolves artifacts against the live catalog.
pub struct CatalogService {
    port: Arc<dyn CatalogPort>,
    resolver: ArtifactResolver,
}

impl CatalogService {
    /// Create a service with the default resolver.
    pub fn new(port: Arc<dyn CatalogPort>) -> Self {
        Self {
            port,
            resolver: ArtifactResolver::new(),
        }
    }

    /// Replace the resolver (e.g. to change the tie-break policy).
    #[must_use]
    pub fn with_resolver(mut self, resolver: ArtifactResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Exchange an API token for a session.
    pub async fn authenticate(&self, token: &str) -> Result<Session, CoreError> {
        Ok(self.port.authenticate(token).await?)
    }

    async fn manifest(&self, session: &Session, package: PackageType) -> Result<Manifest, CoreError> {
        let manifest = self.port.fetch_manifest(session, package).await?;
        debug!(%package, entries = manifest.len(), "Fetched manifest");
        Ok(manifest)
    }

    /// Resolve an arbitrary filter.
    pub async fn resolve(
        &self,
        session: &Session,
        filter: &ResolveFilter,
    ) -> Result<CatalogEntry, CoreError> {
        let manifest = self.manifest(session, filter.package).await?;
        let entry = self.resolver.resolve(&manifest, filter).inspect_err(|_| {
            if let Some(newest) = manifest.latest_branch(filter.package) {
                debug!(package = %filter.package, %newest, "No match; newest published branch");
            }
        })?;
        info!(package = %filter.package, version = %entry.version, "Resolved {filter}");
        Ok(entry.clone())
    }

    /// Greatest version matching the optional constraints.
    pub async fn resolve_latest(
        &self,
        session: &Session,
        package: PackageType,
        branch: Option<Branch>,
        release_type: Option<ReleaseType>,
    ) -> Result<CatalogEntry, CoreError> {
        let filter = ResolveFilter::latest(package)
            .with_branch(branch)
            .with_release_type(release_type);
        self.resolve(session, &filter).await
    }

    /// Exact version lookup from a user-supplied string.
    pub async fn resolve_exact(
        &self,
        session: &Session,
        package: PackageType,
        version: &str,
    ) -> Result<CatalogEntry, CoreError> {
        let filter = ResolveFilter::from_request(package, Some(version), false)?;
        self.resolve(session, &filter).await
    }

    /// All entries matching the filter's constraints, best first.
    pub async fn list(
        &self,
        session: &Session,
        filter: &ResolveFilter,
    ) -> Result<Vec<CatalogEntry>, CoreError> {
        let manifest = self.manifest(session, filter.package).await?;
        Ok(self
            .resolver
            .list(&manifest, filter)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Published branches, newest first.
    pub async fn branches(
        &self,
        session: &Session,
        package: PackageType,
    ) -> Result<Vec<Branch>, CoreError> {
        Ok(self.manifest(session, package).await?.branches(package))
    }

    /// Build the download descriptor for one format of an entry.
    pub fn describe(
        &self,
        entry: &CatalogEntry,
        format: &str,
    ) -> Result<ArtifactDescriptor, CoreError> {
        Ok(self.port.describe(entry, format)?)
    }
}
