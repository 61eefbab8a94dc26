//! `eosdl get`: resolve, download, then optionally import or provision.

use eosdl_core::{ArtifactDescriptor, CoreError, PackageType, ResolveFilter};
use eosdl_download::{
    CancellationToken, DownloadOptions, DownloadOrchestrator, DownloadResult, DownloadStatus,
};
use tracing::{debug, info};

use super::post_process::{import_container, parse_image_ref, provision_lab};
use crate::bootstrap::CliContext;
use crate::commands::GetArgs;
use crate::error::CliError;
use crate::presentation::{self, print_import, print_provision, print_results};

/// Format used when `--format` is omitted.
pub const fn default_format(package: PackageType) -> &'static str {
    match package {
        PackageType::Switch => "default",
        PackageType::Platform => "ova",
    }
}

fn is_container_format(format: &str) -> bool {
    format.to_ascii_lowercase().starts_with("ceos")
}

fn is_lab_disk_format(format: &str) -> bool {
    format.to_ascii_lowercase().starts_with("veos")
}

/// Reject post-processing flags that cannot apply to the chosen format
/// before anything touches the network.
fn check_post_processing(args: &GetArgs, format: &str) -> Result<(), CliError> {
    if args.import_docker.is_some() && !is_container_format(format) {
        return Err(CliError::Arguments(format!(
            "--import-docker needs a cEOS format, not '{format}'"
        )));
    }
    if args.eve_ng.is_some() && !is_lab_disk_format(format) {
        return Err(CliError::Arguments(format!(
            "--eve-ng needs a vEOS format, not '{format}'"
        )));
    }
    Ok(())
}

/// Resolve the requested artifact and run the download (or dry run).
pub async fn fetch(ctx: &CliContext, args: &GetArgs) -> Result<Vec<DownloadResult>, CliError> {
    let package = PackageType::from(args.package);
    let format = args
        .format
        .clone()
        .unwrap_or_else(|| default_format(package).to_string());
    check_post_processing(args, &format)?;

    let filter = ResolveFilter::from_request(package, args.version.as_deref(), args.latest)
        .map_err(CoreError::from)?
        .with_branch(args.branch)
        .with_release_type(args.release_type);

    let session = ctx.session().await?;
    let entry = ctx.catalog.resolve(&session, &filter).await?;
    let descriptor = ctx.catalog.describe(&entry, &format)?;
    info!(version = %entry.version, %format, file = %descriptor.file_name, "Selected artifact");

    let options = DownloadOptions::new(&args.output)
        .with_force(args.force)
        .with_dry_run(args.dry_run)
        .with_max_concurrency(args.concurrency);
    let orchestrator = ctx.orchestrator(&session)?;
    Ok(download(&orchestrator, &[descriptor], &options, &ctx.cancel).await)
}

async fn download(
    orchestrator: &DownloadOrchestrator,
    descriptors: &[ArtifactDescriptor],
    options: &DownloadOptions,
    cancel: &CancellationToken,
) -> Vec<DownloadResult> {
    if options.dry_run() {
        return orchestrator.run(descriptors, options, cancel.clone()).await;
    }

    let stop = CancellationToken::new();
    let renderer = tokio::spawn(presentation::render(
        orchestrator.progress().subscribe(),
        stop.clone(),
    ));
    let results = orchestrator.run(descriptors, options, cancel.clone()).await;
    stop.cancel();
    if let Err(e) = renderer.await {
        debug!(error = %e, "Progress renderer ended abnormally");
    }
    results
}

/// Turn per-task failures into the command's error.
fn check_results(results: &[DownloadResult]) -> Result<(), CliError> {
    if results.iter().any(DownloadResult::is_cancelled) {
        return Err(CliError::Cancelled);
    }
    let failed = results
        .iter()
        .filter(|r| r.status == DownloadStatus::Failed)
        .count();
    if failed > 0 {
        return Err(CliError::Download(format!(
            "{failed} of {} downloads failed",
            results.len()
        )));
    }
    Ok(())
}

pub async fn execute(ctx: &CliContext, args: GetArgs) -> Result<(), CliError> {
    let image_ref = args
        .import_docker
        .as_deref()
        .map(parse_image_ref)
        .transpose()?;

    let results = fetch(ctx, &args).await?;
    print_results(&results);
    check_results(&results)?;

    // A single descriptor is requested, so there is exactly one result.
    let Some(result) = results.into_iter().next() else {
        return Ok(());
    };

    if args.dry_run {
        if let Some((name, tag)) = &image_ref {
            println!("would import  {} as {name}:{tag}", result.path.display());
        }
        if let Some(dir) = &args.eve_ng {
            println!("would provision {} into {}", result.path.display(), dir.display());
        }
        return Ok(());
    }

    if let Some((name, tag)) = image_ref {
        let report =
            import_container(ctx.runner(), result.path.clone(), name, tag, args.force).await?;
        print_import(&report);
    }
    if let Some(dir) = args.eve_ng {
        let report =
            provision_lab(ctx.runner(), result.path, dir, args.force, args.disable_ztp).await?;
        print_provision(&report);
    }
    Ok(())
}
