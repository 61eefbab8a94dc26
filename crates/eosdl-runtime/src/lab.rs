//! Preparation of vEOS-lab disks for a lab emulator (EVE-NG layout).
//!
//! The provisioner converts the downloaded VMDK into `hda.qcow2` inside the
//! target directory, fixes permissions and can switch off Zero Touch
//! Provisioning inside the image.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::command::{Args, CommandRunner, run_checked};
use crate::container::path_arg;
use crate::error::{RuntimeError, RuntimeResult};

/// Disk conversion tool used unless overridden.
pub const DEFAULT_CONVERTER: &str = "qemu-img";
/// Tool used to edit files inside the converted disk.
pub const GUESTFISH: &str = "guestfish";
/// Name of the disk the emulator expects in a node image directory.
pub const DISK_FILE_NAME: &str = "hda.qcow2";
/// File inside the image whose content disables Zero Touch Provisioning.
pub const ZTP_CONFIG_PATH: &str = "/zerotouch-config";
const ZTP_DISABLED: &str = "DISABLE=True";

/// Options for [`LabImageProvisioner::provision`].
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    /// Convert again even when the target disk exists.
    pub force: bool,
    /// Write the ZTP disable marker into the image.
    pub disable_auto_provision: bool,
    /// Binary performing `convert -f vmdk -O qcow2`.
    pub converter: String,
    /// Optional wrapper invoked as `<wrapper> -a fixpermissions`.
    pub permission_fixer: Option<String>,
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self {
            force: false,
            disable_auto_provision: false,
            converter: DEFAULT_CONVERTER.to_string(),
            permission_fixer: None,
        }
    }
}

impl ProvisionOptions {
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub const fn with_disable_auto_provision(mut self, disable: bool) -> Self {
        self.disable_auto_provision = disable;
        self
    }

    #[must_use]
    pub fn with_converter(mut self, converter: impl Into<String>) -> Self {
        self.converter = converter.into();
        self
    }

    #[must_use]
    pub fn with_permission_fixer(mut self, wrapper: impl Into<String>) -> Self {
        self.permission_fixer = Some(wrapper.into());
        self
    }
}

/// Individual provisioning steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    CreateDirectory,
    ConvertDisk,
    FixPermissions,
    DisableAutoProvision,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateDirectory => "create directory",
            Self::ConvertDisk => "convert disk",
            Self::FixPermissions => "fix permissions",
            Self::DisableAutoProvision => "disable zero touch provisioning",
        })
    }
}

/// Outcome of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// The converted disk.
    pub disk_path: PathBuf,
    /// Steps that changed something, in execution order.
    pub performed: Vec<ProvisionStep>,
    /// Steps found already satisfied or not requested.
    pub skipped: Vec<ProvisionStep>,
}

impl ProvisionReport {
    fn new(disk_path: PathBuf) -> Self {
        Self {
            disk_path,
            performed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn record(&mut self, step: ProvisionStep, performed: bool) {
        debug!(%step, performed, "Provisioning step");
        if performed {
            self.performed.push(step);
        } else {
            self.skipped.push(step);
        }
    }
}

/// Turns a vEOS-lab VMDK into a ready-to-boot lab node image.
pub struct LabImageProvisioner {
    runner: Arc<dyn CommandRunner>,
}

impl LabImageProvisioner {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Provision `image_path` into `target_dir`.
    ///
    /// Steps run one at a time; the first failing step aborts the rest and
    /// leaves what was already done in place.
    pub fn provision(
        &self,
        image_path: &Path,
        target_dir: &Path,
        options: &ProvisionOptions,
    ) -> RuntimeResult<ProvisionReport> {
        if !image_path.is_file() {
            return Err(RuntimeError::InputNotFound(image_path.to_path_buf()));
        }

        let disk = target_dir.join(DISK_FILE_NAME);
        let mut report = ProvisionReport::new(disk.clone());

        let create = !target_dir.is_dir();
        if create {
            std::fs::create_dir_all(target_dir).map_err(|e| {
                RuntimeError::io(format!("failed to create {}", target_dir.display()), e)
            })?;
        }
        report.record(ProvisionStep::CreateDirectory, create);

        let convert = options.force || !disk.exists();
        if convert {
            self.convert(image_path, target_dir, &disk, options)?;
        }
        report.record(ProvisionStep::ConvertDisk, convert);

        report.record(ProvisionStep::FixPermissions, self.fix_permissions(&disk, options)?);

        if options.disable_auto_provision {
            run_checked(
                self.runner.as_ref(),
                GUESTFISH,
                &Args::new()
                    .arg("--rw")
                    .arg("-a")
                    .arg(path_arg(&disk))
                    .arg("-m")
                    .arg("/dev/sda1")
                    .arg("write")
                    .arg(ZTP_CONFIG_PATH)
                    .arg(ZTP_DISABLED),
            )?;
        }
        report.record(
            ProvisionStep::DisableAutoProvision,
            options.disable_auto_provision,
        );

        info!(
            disk = %disk.display(),
            performed = report.performed.len(),
            skipped = report.skipped.len(),
            "Lab image provisioned"
        );
        Ok(report)
    }

    /// Convert into a scratch file next to `disk` and move it into place
    /// only once the converter exits cleanly, so an interrupted conversion
    /// never leaves a disk that a later run would reuse.
    fn convert(
        &self,
        image_path: &Path,
        target_dir: &Path,
        disk: &Path,
        options: &ProvisionOptions,
    ) -> RuntimeResult<()> {
        let scratch = PartialDisk::new(
            target_dir.join(format!(".{DISK_FILE_NAME}.{}.part", Uuid::new_v4().simple())),
        );
        run_checked(
            self.runner.as_ref(),
            &options.converter,
            &Args::new()
                .arg("convert")
                .arg("-f")
                .arg("vmdk")
                .arg("-O")
                .arg("qcow2")
                .arg(path_arg(image_path))
                .arg(path_arg(scratch.path())),
        )?;
        scratch.persist(disk)
    }

    fn fix_permissions(&self, disk: &Path, options: &ProvisionOptions) -> RuntimeResult<bool> {
        let mut changed = false;

        #[cfg(unix)]
        if disk.exists() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(disk, std::fs::Permissions::from_mode(0o644)).map_err(
                |e| RuntimeError::io(format!("failed to set permissions on {}", disk.display()), e),
            )?;
            changed = true;
        }

        if let Some(wrapper) = &options.permission_fixer {
            run_checked(
                self.runner.as_ref(),
                wrapper,
                &Args::new().arg("-a").arg("fixpermissions"),
            )?;
            changed = true;
        }

        Ok(changed)
    }
}

/// Scratch conversion output, removed on drop unless persisted.
struct PartialDisk {
    path: PathBuf,
    armed: bool,
}

impl PartialDisk {
    const fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn persist(mut self, target: &Path) -> RuntimeResult<()> {
        std::fs::rename(&self.path, target).map_err(|e| {
            RuntimeError::io(
                format!("converter produced no usable {}", target.display()),
                e,
            )
        })?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for PartialDisk {
    fn drop(&mut self) {
        if self.armed && std::fs::remove_file(&self.path).is_ok() {
            debug!(path = %self.path.display(), "Removed partial disk");
        }
    }
}
