//! Plain-text output of command results on stdout.

use std::fmt::Write;

use eosdl_core::{Branch, CatalogEntry};
use eosdl_download::{DownloadResult, DownloadStatus, Verification};
use eosdl_runtime::{ImportReport, ProvisionReport};
use indicatif::HumanBytes;

/// One line per entry: version and published formats.
pub fn format_entries(entries: &[CatalogEntry]) -> String {
    let width = entries
        .iter()
        .map(|e| e.version.to_string().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        let formats: Vec<&str> = entry.available_formats().collect();
        let _ = writeln!(
            out,
            "{:<width$}  {}",
            entry.version.to_string(),
            formats.join(", ")
        );
    }
    out
}

pub fn print_entries(entries: &[CatalogEntry]) {
    if entries.is_empty() {
        println!("No matching versions");
    } else {
        print!("{}", format_entries(entries));
    }
}

pub fn print_branches(branches: &[Branch]) {
    for branch in branches {
        println!("{branch}");
    }
}

/// Human-readable line for a download result.
pub fn format_result(result: &DownloadResult) -> String {
    let path = result.path.display();
    if result.dry_run {
        return match result.status {
            DownloadStatus::Cached => format!("would reuse   {path}"),
            DownloadStatus::Pending => format!("would fetch   {path}"),
            _ => format!(
                "cannot fetch  {path}: {}",
                result.error.as_ref().map_or_else(String::new, ToString::to_string)
            ),
        };
    }

    match (&result.status, &result.error) {
        (DownloadStatus::Failed, Some(error)) => format!("failed        {path}: {error}"),
        (DownloadStatus::Cached, _) => format!("cached        {path}"),
        (status, _) => {
            let check = match result.verification {
                Verification::Verified => "checksum ok",
                Verification::Unverified => "no checksum published",
                Verification::Skipped => "not verified",
            };
            format!(
                "{:<13} {path} ({}, {check})",
                status.label(),
                HumanBytes(result.bytes_transferred)
            )
        }
    }
}

pub fn print_results(results: &[DownloadResult]) {
    for result in results {
        println!("{}", format_result(result));
    }
}

pub fn print_import(report: &ImportReport) {
    if report.imported {
        println!("imported      {} ({})", report.reference, report.runtime);
    } else {
        println!("present       {} ({})", report.reference, report.runtime);
    }
}

pub fn print_provision(report: &ProvisionReport) {
    println!("provisioned   {}", report.disk_path.display());
    for step in &report.performed {
        println!("  done     {step}");
    }
    for step in &report.skipped {
        println!("  skipped  {step}");
    }
}
