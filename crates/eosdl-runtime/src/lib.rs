//! Post-processing for downloaded artifacts.
//!
//! - [`ContainerImporter`] loads a cEOS tarball into docker or podman.
//! - [`LabImageProvisioner`] converts a vEOS-lab VMDK into a lab node disk.
//!
//! Both go through the [`CommandRunner`] seam and are synchronous: only one
//! external tool runs at a time. Async callers should wrap them in
//! `spawn_blocking`.

#![deny(unused_crate_dependencies)]

mod command;
mod container;
mod error;
mod lab;

pub use command::{Args, CommandOutput, CommandRunner, SystemRunner, run_checked};
pub use container::{
    ContainerImporter, ContainerRuntime, ImportOptions, ImportReport, image_reference,
};
pub use error::{RuntimeError, RuntimeResult};
pub use lab::{
    DEFAULT_CONVERTER, DISK_FILE_NAME, GUESTFISH, LabImageProvisioner, ProvisionOptions,
    ProvisionReport, ProvisionStep, ZTP_CONFIG_PATH,
};
