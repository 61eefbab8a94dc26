//! Checksum computation and verification for downloaded artifacts.

use std::io::Read;
use std::path::{Path, PathBuf};

use eosdl_core::{Checksum, ChecksumAlgorithm, DownloadError};
use md5::Md5;
use sha2::{Digest, Sha512};

const BUFFER_SIZE: usize = 64 * 1024;

/// Hex digest of the file at `path`.
pub fn file_digest(path: &Path, algorithm: ChecksumAlgorithm) -> std::io::Result<String> {
    match algorithm {
        ChecksumAlgorithm::Sha512 => hash_file::<Sha512>(path),
        ChecksumAlgorithm::Md5 => hash_file::<Md5>(path),
    }
}

fn hash_file<D: Digest>(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = D::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compare the digest of `path` against `expected`.
///
/// `reported_path` is the name used in the mismatch error; verification
/// usually runs on the temporary file before it is renamed into place.
pub async fn verify_file(
    path: &Path,
    reported_path: &Path,
    expected: &Checksum,
) -> Result<(), DownloadError> {
    let owned: PathBuf = path.to_path_buf();
    let algorithm = expected.algorithm;
    let actual = tokio::task::spawn_blocking(move || file_digest(&owned, algorithm))
        .await
        .map_err(|e| DownloadError::io("Other", format!("digest task failed: {e}")))?
        .map_err(|e| DownloadError::from_io_error("checksum", &e))?;

    if actual == expected.value {
        Ok(())
    } else {
        Err(DownloadError::ChecksumMismatch {
            path: reported_path.to_path_buf(),
            algorithm,
            expected: expected.value.clone(),
            actual,
        })
    }
}

/// Read and parse a checksum file already on disk.
pub async fn read_checksum_file(
    path: &Path,
    algorithm: ChecksumAlgorithm,
    source_url: &str,
) -> Result<Checksum, DownloadError> {
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DownloadError::from_io_error("read checksum", &e))?;
    Checksum::parse_file(algorithm, &body).ok_or_else(|| DownloadError::InvalidChecksumFile {
        url: source_url.to_string(),
    })
}
