//! Post-processing steps of `eosdl get`.
//!
//! The runtime crate is synchronous, so each step runs on the blocking pool.

use std::path::PathBuf;
use std::sync::Arc;

use eosdl_runtime::{
    CommandRunner, ContainerImporter, ImportOptions, ImportReport, LabImageProvisioner, ProvisionOptions,
    ProvisionReport, RuntimeResult,
};

use crate::error::CliError;

/// Split `NAME:TAG` at the last `:`. A `/` after it means there is no tag.
pub fn parse_image_ref(raw: &str) -> Result<(String, String), CliError> {
    match raw.rsplit_once(':') {
        Some((name, tag)) if !name.is_empty() && !tag.is_empty() && !tag.contains('/') => {
            Ok((name.to_string(), tag.to_string()))
        }
        _ => Err(CliError::Arguments(format!(
            "expected NAME:TAG for --import-docker, got '{raw}'"
        ))),
    }
}

async fn blocking<T: Send + 'static>(
    task: impl FnOnce() -> RuntimeResult<T> + Send + 'static,
) -> Result<T, CliError> {
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| CliError::Process(format!("post-processing task failed: {e}")))?
        .map_err(CliError::from)
}

pub async fn import_container(
    runner: Arc<dyn CommandRunner>,
    image: PathBuf,
    name: String,
    tag: String,
    force: bool,
) -> Result<ImportReport, CliError> {
    blocking(move || {
        let options = ImportOptions {
            force,
            runtime: None,
        };
        ContainerImporter::new(runner).import(&image, &name, &tag, &options)
    })
    .await
}

pub async fn provision_lab(
    runner: Arc<dyn CommandRunner>,
    image: PathBuf,
    target_dir: PathBuf,
    force: bool,
    disable_ztp: bool,
) -> Result<ProvisionReport, CliError> {
    blocking(move || {
        let options = ProvisionOptions::default()
            .with_force(force)
            .with_disable_auto_provision(disable_ztp);
        LabImageProvisioner::new(runner).provision(&image, &target_dir, &options)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_ref_splits_on_last_colon() {
        assert_eq!(
            parse_image_ref("ceos:4.29.3M").unwrap(),
            ("ceos".to_string(), "4.29.3M".to_string())
        );
        assert_eq!(
            parse_image_ref("lab/ceos:latest").unwrap(),
            ("lab/ceos".to_string(), "latest".to_string())
        );
    }

    #[test]
    fn image_ref_requires_a_tag() {
        assert!(parse_image_ref("ceos").is_err());
        assert!(parse_image_ref("ceos:").is_err());
        assert!(parse_image_ref(":tag").is_err());
        assert!(parse_image_ref("registry:5000/ceos").is_err());
    }
}
