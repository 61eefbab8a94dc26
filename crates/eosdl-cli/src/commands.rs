//! Subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use eosdl_core::{Branch, PackageType, ReleaseType};
use eosdl_download::DEFAULT_MAX_CONCURRENCY;

/// Package type as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PackageArg {
    /// EOS switch images (also cEOS and vEOS)
    Switch,
    /// CloudVision Portal packages
    Platform,
}

impl From<PackageArg> for PackageType {
    fn from(arg: PackageArg) -> Self {
        match arg {
            PackageArg::Switch => Self::Switch,
            PackageArg::Platform => Self::Platform,
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query the catalog
    Info {
        #[command(subcommand)]
        command: InfoCommand,
    },

    /// Download an artifact and optionally post-process it
    Get(GetArgs),
}

/// Catalog queries.
#[derive(Subcommand, Debug)]
pub enum InfoCommand {
    /// List published versions, newest first
    Versions(FilterArgs),
    /// Show the newest version matching the filters
    Latest(FilterArgs),
    /// List published branches, newest first
    Branches {
        #[arg(long, value_enum, default_value = "switch")]
        package: PackageArg,
    },
}

/// Filters shared by catalog queries.
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[arg(long, value_enum, default_value = "switch")]
    pub package: PackageArg,
    /// Restrict to a MAJOR.MINOR branch, e.g. 4.29
    #[arg(long)]
    pub branch: Option<Branch>,
    /// Restrict to a release type (M, F, INT)
    #[arg(long = "release-type")]
    pub release_type: Option<ReleaseType>,
}

/// Arguments of `get`.
#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// What to download
    #[arg(value_enum)]
    pub package: PackageArg,

    /// Exact version, e.g. 4.29.3M or 2023.1.0
    #[arg(long, conflicts_with = "latest", required_unless_present = "latest")]
    pub version: Option<String>,

    /// Newest version matching --branch and --release-type
    #[arg(long)]
    pub latest: bool,

    #[arg(long, requires = "latest")]
    pub branch: Option<Branch>,

    #[arg(long = "release-type", requires = "latest")]
    pub release_type: Option<ReleaseType>,

    /// Artifact format (default for switch, ova for platform)
    #[arg(long)]
    pub format: Option<String>,

    /// Destination directory
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,

    /// Download even if the file exists; re-run post-processing
    #[arg(long)]
    pub force: bool,

    /// Show what would happen without downloading
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Parallel transfers
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub concurrency: usize,

    /// Import the downloaded cEOS image as NAME:TAG
    #[arg(long = "import-docker", value_name = "NAME:TAG")]
    pub import_docker: Option<String>,

    /// Provision a vEOS-lab image into this lab node directory
    #[arg(long = "eve-ng", value_name = "DIR")]
    pub eve_ng: Option<PathBuf>,

    /// Disable zero touch provisioning in the provisioned image
    #[arg(long = "disable-ztp", requires = "eve_ng")]
    pub disable_ztp: bool,
}
