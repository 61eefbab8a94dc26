//! `eosdl get` against an in-memory catalog.

use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use eosdl_cli::{Cli, CliContext, CliError, Commands, GetArgs, handlers};
use eosdl_core::{
    ArtifactDescriptor, ArtifactFile, CatalogEntry, CatalogError, CatalogPort, CatalogResult,
    Manifest, PackageType, Session, Version,
};
use eosdl_download::{CancellationToken, DownloadStatus};
use url::Url;

struct StaticCatalog {
    manifest: Manifest,
}

impl StaticCatalog {
    fn new() -> Self {
        let mut builder = Manifest::builder();
        for v in ["4.29.1M", "4.29.3M", "4.29.2F", "4.30.0F"] {
            let version = Version::parse(v).unwrap();
            builder.add_artifact(
                PackageType::Switch,
                version.clone(),
                "default",
                ArtifactFile::new(format!("EOS-{v}.swi"), format!("eos/EOS-{v}.swi")),
            );
            builder.add_artifact(
                PackageType::Switch,
                version,
                "cEOS",
                ArtifactFile::new(
                    format!("cEOS-lab-{v}.tar.xz"),
                    format!("eos/cEOS-lab-{v}.tar.xz"),
                ),
            );
        }
        Self {
            manifest: builder.build(),
        }
    }
}

#[async_trait]
impl CatalogPort for StaticCatalog {
    async fn authenticate(&self, token: &str) -> CatalogResult<Session> {
        if token == "valid" {
            Ok(Session::new("session-code"))
        } else {
            Err(CatalogError::AuthenticationError {
                reason: "token rejected".to_string(),
            })
        }
    }

    async fn fetch_manifest(
        &self,
        _session: &Session,
        _package: PackageType,
    ) -> CatalogResult<Manifest> {
        Ok(self.manifest.clone())
    }

    fn describe(&self, entry: &CatalogEntry, format: &str) -> CatalogResult<ArtifactDescriptor> {
        let file = entry
            .file(format)
            .ok_or_else(|| CatalogError::FormatUnavailable {
                version: entry.version.to_string(),
                format: format.to_string(),
                available: entry.available_formats().collect::<Vec<_>>().join(", "),
            })?;
        let url = Url::parse("https://downloads.example.com/")
            .unwrap()
            .join(&file.download_path)
            .unwrap();
        Ok(ArtifactDescriptor::new(
            entry.clone(),
            format,
            file.file_name.clone(),
            url,
        ))
    }
}

fn context(token: Option<&str>) -> CliContext {
    CliContext::new(
        Arc::new(StaticCatalog::new()),
        token.map(str::to_string),
        CancellationToken::new(),
    )
}

fn get_args(argv: &[&str]) -> GetArgs {
    let mut full = vec!["eosdl", "get"];
    full.extend_from_slice(argv);
    match Cli::parse_from(full).command {
        Commands::Get(args) => args,
        Commands::Info { .. } => unreachable!(),
    }
}

#[tokio::test]
async fn dry_run_resolves_latest_on_branch_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();
    let args = get_args(&[
        "switch", "--latest", "--branch", "4.29", "--output", out, "--dry-run",
    ]);

    let results = handlers::get::fetch(&context(Some("valid")), &args)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].dry_run);
    assert_eq!(results[0].status, DownloadStatus::Pending);
    assert_eq!(results[0].path, dir.path().join("EOS-4.29.3M.swi"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn dry_run_reports_existing_file_as_cached() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cEOS-lab-4.30.0F.tar.xz"), b"x").unwrap();
    let out = dir.path().to_str().unwrap();
    let args = get_args(&[
        "switch", "--version", "4.30.0F", "--format", "ceos", "--output", out, "--dry-run",
    ]);

    let results = handlers::get::fetch(&context(Some("valid")), &args)
        .await
        .unwrap();
    assert_eq!(results[0].status, DownloadStatus::Cached);
}

#[tokio::test]
async fn missing_token_is_a_configuration_error() {
    let args = get_args(&["switch", "--latest", "--dry-run"]);
    let err = handlers::get::fetch(&context(None), &args).await.unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
    assert_eq!(err.exit_code(), 78);
}

#[tokio::test]
async fn rejected_token_is_an_authentication_error() {
    let args = get_args(&["switch", "--latest", "--dry-run"]);
    let err = handlers::get::fetch(&context(Some("expired")), &args)
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Authentication(_)));
}

#[tokio::test]
async fn unknown_version_is_not_found() {
    let args = get_args(&["switch", "--version", "4.28.1F", "--dry-run"]);
    let err = handlers::get::fetch(&context(Some("valid")), &args)
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::NotFound(_)));
}

#[tokio::test]
async fn unpublished_format_lists_alternatives() {
    let args = get_args(&["switch", "--latest", "--format", "vEOS-lab", "--dry-run"]);
    let err = handlers::get::fetch(&context(Some("valid")), &args)
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("vEOS-lab"));
    assert!(message.contains("cEOS, default"));
}
