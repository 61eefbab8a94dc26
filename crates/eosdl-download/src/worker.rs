//! Download worker pipeline.
//!
//! One call of [`run_job`] takes a single descriptor from `Pending` to a
//! terminal status and always yields a [`DownloadResult`]; failures are
//! values, never panics or early aborts of the batch.
//!
//! Cancellation is handled via `tokio::select!` around every network await.
//! Partial files are owned by a [`PartialFile`] guard and vanish on any exit
//! path that does not rename them into place.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use eosdl_core::{
    ArtifactDescriptor, Checksum, ChecksumSource, DownloadError, DownloadResult, DownloadStatus,
    Verification,
};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::fetch::ArtifactFetcher;
use crate::paths::{DownloadDestination, PartialFile};
use crate::progress::ProgressAggregator;
use crate::verify::{read_checksum_file, verify_file};

/// Dependencies shared by all workers of a run.
#[derive(Clone)]
pub struct WorkerDeps {
    /// Transport.
    pub fetcher: Arc<dyn ArtifactFetcher>,
    /// Progress sink.
    pub progress: Arc<ProgressAggregator>,
}

/// A download job to be executed by the worker.
pub struct DownloadJob {
    /// Position in the input list; also the progress slot.
    pub index: usize,
    /// What to fetch.
    pub descriptor: ArtifactDescriptor,
    /// Directory receiving the file.
    pub destination_dir: PathBuf,
    /// Bypass the cache check.
    pub force: bool,
    /// Time allowed between two chunks.
    pub chunk_timeout: Duration,
    /// Cancellation token shared by the run.
    pub cancel: CancellationToken,
}

/// Build the result skeleton for a descriptor.
pub(crate) fn result_for(
    descriptor: &ArtifactDescriptor,
    path: PathBuf,
    status: DownloadStatus,
) -> DownloadResult {
    DownloadResult {
        file_name: descriptor.file_name.clone(),
        version: descriptor.version().clone(),
        format: descriptor.format.clone(),
        path,
        status,
        verification: Verification::Skipped,
        bytes_transferred: 0,
        dry_run: false,
        error: None,
    }
}

/// Decide what a run would do for `descriptor` without touching anything
/// but a metadata lookup.
pub fn plan_dry_run(descriptor: &ArtifactDescriptor, dir: &Path, force: bool) -> DownloadResult {
    match DownloadDestination::plan(dir, &descriptor.file_name) {
        Ok(dest) => {
            let status = if !force && dest.exists() {
                DownloadStatus::Cached
            } else {
                DownloadStatus::Pending
            };
            DownloadResult {
                dry_run: true,
                ..result_for(descriptor, dest.final_path(), status)
            }
        }
        Err(error) => DownloadResult {
            dry_run: true,
            error: Some(error),
            ..result_for(descriptor, dir.join(&descriptor.file_name), DownloadStatus::Failed)
        },
    }
}

/// Run a download job to completion.
///
/// 1. Cache check (skipped with `force`)
/// 2. Checksum file retrieval when only its location is known
/// 3. Streamed transfer into a temporary file
/// 4. Verification, then rename into place
pub async fn run_job(job: DownloadJob, deps: &WorkerDeps) -> DownloadResult {
    let index = job.index;
    let fallback_path = job.destination_dir.join(&job.descriptor.file_name);

    let dest = match DownloadDestination::plan(&job.destination_dir, &job.descriptor.file_name) {
        Ok(dest) => dest,
        Err(error) => return fail(&job, deps, fallback_path, 0, error),
    };
    let final_path = dest.final_path();

    if !job.force && dest.exists() {
        debug!(path = %final_path.display(), "Cache hit");
        deps.progress.set_status(index, DownloadStatus::Cached);
        return result_for(&job.descriptor, final_path, DownloadStatus::Cached);
    }

    if job.cancel.is_cancelled() {
        return fail(&job, deps, final_path, 0, DownloadError::Cancelled);
    }

    if let Err(error) = dest.ensure_dir().await {
        return fail(&job, deps, final_path, 0, error);
    }

    deps.progress.set_status(index, DownloadStatus::Downloading);
    let mut transferred = 0u64;

    // Step 2: expected digest
    let mut staged_checksum = None;
    let expected = match &job.descriptor.expected_checksum {
        Some(checksum) => Some(checksum.clone()),
        None => match &job.descriptor.checksum_source {
            Some(source) => match fetch_checksum(&job, deps, &dest, source).await {
                Ok((digest, bytes)) => {
                    transferred += bytes;
                    staged_checksum = digest.staged;
                    Some(digest.checksum)
                }
                Err(error) => return fail(&job, deps, final_path, transferred, error),
            },
            None => None,
        },
    };

    // Step 3: transfer
    let partial = PartialFile::new(dest.temp_path());
    match transfer(
        &job,
        deps,
        &job.descriptor.resolved_url,
        partial.path(),
        Some(index),
    )
    .await
    {
        Ok(bytes) => transferred += bytes,
        Err(error) => return fail(&job, deps, final_path, transferred, error),
    }

    // Step 4: verification
    let verification = match &expected {
        Some(checksum) => {
            deps.progress.set_status(index, DownloadStatus::Verifying);
            let outcome = tokio::select! {
                biased;
                () = job.cancel.cancelled() => Err(DownloadError::Cancelled),
                r = verify_file(partial.path(), &final_path, checksum) => r,
            };
            if let Err(error) = outcome {
                if matches!(error, DownloadError::ChecksumMismatch { .. }) {
                    warn!(path = %final_path.display(), "Checksum mismatch, removing file");
                }
                // The guard removes the corrupt data.
                drop(partial);
                return fail(&job, deps, final_path, transferred, error);
            }
            Verification::Verified
        }
        None => Verification::Unverified,
    };

    if let Err(error) = partial.persist(&final_path).await {
        return fail(&job, deps, final_path, transferred, error);
    }
    if let Some(StagedChecksum { file, target }) = staged_checksum {
        if let Err(error) = file.persist(&target).await {
            warn!(path = %target.display(), %error, "Checksum file not kept");
        }
    }

    info!(
        path = %final_path.display(),
        bytes = transferred,
        ?verification,
        "Download complete"
    );
    deps.progress.set_status(index, DownloadStatus::Done);
    DownloadResult {
        verification,
        bytes_transferred: transferred,
        ..result_for(&job.descriptor, final_path, DownloadStatus::Done)
    }
}

fn fail(
    job: &DownloadJob,
    deps: &WorkerDeps,
    path: PathBuf,
    transferred: u64,
    error: DownloadError,
) -> DownloadResult {
    if error.is_cancelled() {
        debug!(file = %job.descriptor.file_name, "Download cancelled");
    } else {
        warn!(file = %job.descriptor.file_name, %error, "Download failed");
    }
    deps.progress.set_status(job.index, DownloadStatus::Failed);
    DownloadResult {
        bytes_transferred: transferred,
        error: Some(error),
        ..result_for(&job.descriptor, path, DownloadStatus::Failed)
    }
}

/// A freshly fetched checksum file, kept aside until the artifact it
/// describes has been verified and moved into place.
struct StagedChecksum {
    file: PartialFile,
    target: PathBuf,
}

/// Expected digest for one artifact.
struct ExpectedDigest {
    checksum: Checksum,
    /// `None` when a local checksum file was reused.
    staged: Option<StagedChecksum>,
}

/// Obtain the expected digest from the published checksum file, reusing a
/// local copy unless `force` is set.
async fn fetch_checksum(
    job: &DownloadJob,
    deps: &WorkerDeps,
    dest: &DownloadDestination,
    source: &ChecksumSource,
) -> Result<(ExpectedDigest, u64), DownloadError> {
    let file_name = source
        .file_name()
        .map_or_else(|| format!("{}.{}", dest.file_name, source.algorithm.extension()), str::to_string);
    let checksum_dest = DownloadDestination::plan(&dest.dir, &file_name)?;
    let target = checksum_dest.final_path();

    if !job.force && checksum_dest.exists() {
        return match read_checksum_file(&target, source.algorithm, source.url.as_str()).await {
            Ok(checksum) => Ok((ExpectedDigest { checksum, staged: None }, 0)),
            Err(error) => {
                // Do not let an unreadable file satisfy the next cache check.
                let _ = tokio::fs::remove_file(&target).await;
                Err(error)
            }
        };
    }

    let file = PartialFile::new(checksum_dest.temp_path());
    let bytes = transfer(job, deps, &source.url, file.path(), None).await?;
    let checksum = read_checksum_file(file.path(), source.algorithm, source.url.as_str()).await?;
    Ok((
        ExpectedDigest {
            checksum,
            staged: Some(StagedChecksum { file, target }),
        },
        bytes,
    ))
}

/// Stream `url` into `temp`, honouring cancellation and the chunk timeout.
///
/// `progress_slot` is `Some` for the artifact itself; checksum files are not
/// counted in the progress display.
async fn transfer(
    job: &DownloadJob,
    deps: &WorkerDeps,
    url: &Url,
    temp: &Path,
    progress_slot: Option<usize>,
) -> Result<u64, DownloadError> {
    let opened = tokio::select! {
        biased;
        () = job.cancel.cancelled() => return Err(DownloadError::Cancelled),
        r = tokio::time::timeout(job.chunk_timeout, deps.fetcher.fetch(url)) => r,
    };
    let response = opened.map_err(|_| DownloadError::timeout(url.as_str()))??;

    if let Some(slot) = progress_slot {
        deps.progress.start_transfer(slot, response.content_length);
    }

    let mut file = tokio::fs::File::create(temp)
        .await
        .map_err(|e| DownloadError::from_io_error("create", &e))?;
    let mut body = response.body;
    let mut written = 0u64;

    loop {
        let next = tokio::select! {
            biased;
            () = job.cancel.cancelled() => return Err(DownloadError::Cancelled),
            r = tokio::time::timeout(job.chunk_timeout, body.next()) => r,
        };
        let chunk = match next {
            Err(_) => return Err(DownloadError::timeout(url.as_str())),
            Ok(None) => break,
            Ok(Some(chunk)) => chunk?,
        };

        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::from_io_error("write", &e))?;
        written += chunk.len() as u64;
        if let Some(slot) = progress_slot {
            deps.progress.advance(slot, chunk.len() as u64);
        }
    }

    file.flush()
        .await
        .map_err(|e| DownloadError::from_io_error("flush", &e))?;
    file.sync_all()
        .await
        .map_err(|e| DownloadError::from_io_error("sync", &e))?;

    debug!(%url, bytes = written, "Transfer finished");
    Ok(written)
}
