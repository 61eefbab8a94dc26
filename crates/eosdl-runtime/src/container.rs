//! Import of container image tarballs (cEOS) into a local container runtime.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info};

use crate::command::{Args, CommandRunner, run_checked};
use crate::error::{RuntimeError, RuntimeResult};

/// Lowercase path components separated by `/`, each made of alphanumerics
/// joined by `.`, `_` or `-`.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[._-]+[a-z0-9]+)*(?:/[a-z0-9]+(?:[._-]+[a-z0-9]+)*)*$")
        .expect("image name pattern is a valid regex")
});

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").expect("image tag pattern is a valid regex")
});

/// Container CLIs that accept `import` and `images --quiet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRuntime {
    Docker,
    Podman,
}

impl ContainerRuntime {
    /// Detection order when no runtime is requested.
    pub const PREFERENCE: [Self; 2] = [Self::Docker, Self::Podman];

    pub const fn binary(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }
}

impl fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Options for [`ContainerImporter::import`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Import even when `name:tag` already exists.
    pub force: bool,
    /// Use this runtime instead of auto-detecting.
    pub runtime: Option<ContainerRuntime>,
}

/// What an import did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub runtime: ContainerRuntime,
    /// `name:tag`.
    pub reference: String,
    /// `false` when an existing image was kept.
    pub imported: bool,
}

/// Validate an image name and tag and join them into a reference.
pub fn image_reference(name: &str, tag: &str) -> RuntimeResult<String> {
    if !NAME_PATTERN.is_match(name) {
        return Err(RuntimeError::invalid(
            "image name",
            name,
            "expected lowercase alphanumerics separated by '.', '_', '-' or '/'",
        ));
    }
    if !TAG_PATTERN.is_match(tag) {
        return Err(RuntimeError::invalid(
            "image tag",
            tag,
            "expected up to 128 of [A-Za-z0-9_.-], not starting with '.' or '-'",
        ));
    }
    Ok(format!("{name}:{tag}"))
}

/// A relative path starting with `-` would be read as an option.
pub(crate) fn path_arg(path: &Path) -> OsString {
    if path.is_relative() && path.as_os_str().to_string_lossy().starts_with('-') {
        Path::new(".").join(path).into_os_string()
    } else {
        path.as_os_str().to_os_string()
    }
}

/// Imports image tarballs with docker or podman.
pub struct ContainerImporter {
    runner: Arc<dyn CommandRunner>,
}

impl ContainerImporter {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Pick the runtime to use: the requested one if installed, otherwise
    /// the first installed entry of [`ContainerRuntime::PREFERENCE`].
    pub fn detect_runtime(
        &self,
        requested: Option<ContainerRuntime>,
    ) -> RuntimeResult<(ContainerRuntime, PathBuf)> {
        if let Some(runtime) = requested {
            let path = self.runner.locate(runtime.binary())?;
            return Ok((runtime, path));
        }

        for runtime in ContainerRuntime::PREFERENCE {
            if let Ok(path) = self.runner.locate(runtime.binary()) {
                debug!(%runtime, path = %path.display(), "Detected container runtime");
                return Ok((runtime, path));
            }
        }

        Err(RuntimeError::BinaryNotFound {
            binary: "docker or podman".to_string(),
        })
    }

    /// Import `image_path` as `name:tag`.
    ///
    /// Skips the import when the runtime already lists the reference, unless
    /// `options.force` is set.
    pub fn import(
        &self,
        image_path: &Path,
        name: &str,
        tag: &str,
        options: &ImportOptions,
    ) -> RuntimeResult<ImportReport> {
        let reference = image_reference(name, tag)?;
        if !image_path.is_file() {
            return Err(RuntimeError::InputNotFound(image_path.to_path_buf()));
        }

        let (runtime, _) = self.detect_runtime(options.runtime)?;
        let binary = runtime.binary();

        if !options.force {
            let listed = run_checked(
                self.runner.as_ref(),
                binary,
                &Args::new().arg("images").arg("--quiet").arg(&reference),
            )?;
            if !listed.stdout.trim().is_empty() {
                info!(%runtime, %reference, "Image already present, skipping import");
                return Ok(ImportReport {
                    runtime,
                    reference,
                    imported: false,
                });
            }
        }

        run_checked(
            self.runner.as_ref(),
            binary,
            &Args::new()
                .arg("import")
                .arg(path_arg(image_path))
                .arg(&reference),
        )?;
        info!(%runtime, %reference, path = %image_path.display(), "Imported container image");

        Ok(ImportReport {
            runtime,
            reference,
            imported: true,
        })
    }
}
