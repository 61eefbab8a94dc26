//! CLI-specific error types and mappings.
//!
//! Maps core, download and post-processing failures to exit codes and
//! user-facing messages.

use eosdl_core::{CatalogError, CoreError, ResolveError};
use eosdl_runtime::RuntimeError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid or inconsistent arguments.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Missing token or bad client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The token or session was rejected.
    #[error("{0}")]
    Authentication(String),

    /// The catalog could not be reached or understood.
    #[error("{0}")]
    Catalog(String),

    /// Nothing in the catalog matched the request.
    #[error("{0}")]
    NotFound(String),

    /// At least one download failed.
    #[error("{0}")]
    Download(String),

    /// The user interrupted the run.
    #[error("Interrupted")]
    Cancelled,

    /// A post-processing tool is not installed.
    #[error("{0}")]
    MissingTool(String),

    /// A post-processing tool failed.
    #[error("{0}")]
    Process(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Exit codes follow sysexits.h where one fits:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Specific error categories
    /// - 130: Interrupted by SIGINT
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) => 2,
            Self::NotFound(_) | Self::Download(_) => 1,
            Self::Catalog(_) => 69,     // EX_UNAVAILABLE
            Self::Process(_) => 71,     // EX_OSERR
            Self::MissingTool(_) => 72, // EX_OSFILE
            Self::Io(_) => 74,          // EX_IOERR
            Self::Authentication(_) => 77, // EX_NOPERM
            Self::Config(_) => 78,      // EX_CONFIG
            Self::Cancelled => 130,
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::AuthenticationError { .. } => Self::Authentication(err.to_string()),
            CatalogError::CatalogUnavailable { .. } | CatalogError::MalformedCatalog { .. } => {
                Self::Catalog(err.to_string())
            }
            CatalogError::FormatUnavailable { .. } => Self::NotFound(err.to_string()),
            CatalogError::Configuration { .. } => Self::Config(err.to_string()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Version(e) => Self::Arguments(e.to_string()),
            CoreError::Catalog(e) => e.into(),
            CoreError::Resolve(e @ ResolveError::NoMatchingVersion { .. }) => {
                Self::NotFound(e.to_string())
            }
            CoreError::Resolve(e) => Self::Arguments(e.to_string()),
        }
    }
}

impl From<RuntimeError> for CliError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::BinaryNotFound { .. } => Self::MissingTool(err.to_string()),
            RuntimeError::SubprocessError { .. } => Self::Process(err.to_string()),
            RuntimeError::InvalidArgument { .. } => Self::Arguments(err.to_string()),
            RuntimeError::InputNotFound(_) | RuntimeError::Io { .. } => Self::Io(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
