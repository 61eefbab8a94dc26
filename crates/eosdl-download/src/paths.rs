//! Destination path planning for downloads.
//!
//! Artifacts and checksum files land flat in the destination directory under
//! their published names. In-flight transfers write to a uniquely named
//! hidden `.part` file next to the target and are renamed into place.

use std::path::{Path, PathBuf};

use eosdl_core::DownloadError;
use uuid::Uuid;

/// A planned download destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDestination {
    /// Directory receiving the file.
    pub dir: PathBuf,
    /// Published filename.
    pub file_name: String,
}

impl DownloadDestination {
    /// Plan the destination of `file_name` inside `dir`.
    ///
    /// Only the final path component of `file_name` is kept, so a catalog
    /// entry can never direct a write outside `dir`.
    pub fn plan(dir: &Path, file_name: &str) -> Result<Self, DownloadError> {
        let name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.starts_with('.'))
            .ok_or_else(|| {
                DownloadError::io("InvalidInput", format!("unusable file name '{file_name}'"))
            })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            file_name: name.to_string(),
        })
    }

    /// Final location of the file.
    pub fn final_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// A fresh temporary path for one transfer attempt.
    pub fn temp_path(&self) -> PathBuf {
        self.dir.join(format!(
            ".{}.{}.part",
            self.file_name,
            Uuid::new_v4().simple()
        ))
    }

    /// Whether the final file is already present.
    pub fn exists(&self) -> bool {
        self.final_path().is_file()
    }

    /// Ensure the directory exists, creating it if necessary.
    pub async fn ensure_dir(&self) -> Result<(), DownloadError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DownloadError::from_io_error("create_dir", &e))
    }
}

/// Whether `name` looks like one of our temporary transfer files.
pub fn is_temp_file(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".part")
}

/// Removes a partial file when dropped unless it was persisted.
///
/// Covers early returns, errors, and tasks aborted mid-transfer.
pub struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    /// Guard `path`.
    pub const fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Path being guarded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename into `target` and disarm the guard.
    pub async fn persist(mut self, target: &Path) -> Result<(), DownloadError> {
        tokio::fs::rename(&self.path, target)
            .await
            .map_err(|e| DownloadError::from_io_error("rename", &e))?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.armed {
            // Missing file is fine: the transfer may not have created it yet.
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
