//! CLI bootstrap - the composition root.
//!
//! This module is the only place where infrastructure is wired together for
//! the CLI: the catalog client (via eosdl-catalog) behind the core
//! `CatalogService`, the HTTP fetcher (via eosdl-download) once a session
//! exists, and the command runner used by post-processing (via
//! eosdl-runtime).

use std::sync::Arc;

use eosdl_catalog::{CatalogClientConfig, connect};
use eosdl_core::{CatalogPort, CatalogService, Session};
use eosdl_download::{
    ArtifactFetcher, CancellationToken, DEFAULT_CONNECT_TIMEOUT, DownloadOrchestrator,
    ReqwestFetcher,
};
use eosdl_runtime::{CommandRunner, SystemRunner};
use tracing::debug;

use crate::error::CliError;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("eosdl/", env!("CARGO_PKG_VERSION"));

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// API token, from `--token` or `ARISTA_TOKEN`.
    pub token: Option<String>,
    /// Catalog base URL override.
    pub base_url: Option<String>,
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// Catalog resolution facade.
    pub catalog: CatalogService,
    /// Cancelled on Ctrl-C.
    pub cancel: CancellationToken,
    token: Option<String>,
    fetcher: Option<Arc<dyn ArtifactFetcher>>,
    runner: Arc<dyn CommandRunner>,
}

impl CliContext {
    /// Assemble a context around an existing catalog port.
    pub fn new(port: Arc<dyn CatalogPort>, token: Option<String>, cancel: CancellationToken) -> Self {
        Self {
            catalog: CatalogService::new(port),
            cancel,
            token,
            fetcher: None,
            runner: Arc::new(SystemRunner),
        }
    }

    /// Download through `fetcher` instead of an authenticated HTTP client.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Run post-processing tools through `runner`.
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Runner for external post-processing tools.
    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        Arc::clone(&self.runner)
    }

    /// Authenticate with the configured token.
    pub async fn session(&self) -> Result<Session, CliError> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                CliError::Config("no API token: pass --token or set ARISTA_TOKEN".to_string())
            })?;
        Ok(self.catalog.authenticate(token).await?)
    }

    /// Orchestrator whose fetcher presents the session code.
    pub fn orchestrator(&self, session: &Session) -> Result<DownloadOrchestrator, CliError> {
        if let Some(fetcher) = &self.fetcher {
            return Ok(DownloadOrchestrator::new(Arc::clone(fetcher)));
        }
        let fetcher = ReqwestFetcher::new(DEFAULT_CONNECT_TIMEOUT, USER_AGENT)
            .map_err(|e| CliError::Config(e.to_string()))?
            .with_bearer(session.code());
        let fetcher: Arc<dyn ArtifactFetcher> = Arc::new(fetcher);
        Ok(DownloadOrchestrator::new(fetcher))
    }
}

/// Bootstrap the CLI application.
pub fn bootstrap(config: CliConfig, cancel: CancellationToken) -> Result<CliContext, CliError> {
    let mut client_config = CatalogClientConfig::new().with_user_agent(USER_AGENT);
    if let Some(url) = config.base_url {
        client_config = client_config.with_base_url(url);
    }
    debug!(base_url = client_config.base_url(), "Bootstrapping catalog client");

    let client = connect(&client_config)?;
    Ok(CliContext::new(Arc::new(client), config.token, cancel))
}
