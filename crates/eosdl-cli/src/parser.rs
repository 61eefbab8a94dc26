//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Download switch images and platform packages from the vendor catalog.
#[derive(Parser, Debug)]
#[command(name = "eosdl")]
#[command(about = "Download EOS switch images and CloudVision packages")]
#[command(version)]
pub struct Cli {
    /// API token from the vendor portal
    #[arg(long, env = "ARISTA_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Override the catalog base URL
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
