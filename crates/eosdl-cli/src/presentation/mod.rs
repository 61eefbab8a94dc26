//! Shared CLI presentation utilities.
//!
//! Format-only: no domain transforms.

pub mod output;
pub mod progress;

pub use output::{print_branches, print_entries, print_import, print_provision, print_results};
pub use progress::{DownloadProgressBar, render};
