//! Command-line front-end for eosdl.
//!
//! Parsing, composition and presentation only; all behaviour lives in the
//! library crates.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

// Only exercised by the integration tests under tests/
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use bytes as _;
#[cfg(test)]
use futures_util as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use url as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, FilterArgs, GetArgs, InfoCommand, PackageArg};
pub use error::CliError;
pub use parser::Cli;
