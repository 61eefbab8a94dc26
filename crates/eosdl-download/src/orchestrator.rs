//! Batch download orchestration.
//!
//! Dispatches one worker task per descriptor onto the tokio runtime, bounded
//! by a semaphore of `max_concurrency` permits, and collects the results in
//! input order.

use std::sync::Arc;

use eosdl_core::{ArtifactDescriptor, DownloadError, DownloadOptions, DownloadResult, DownloadStatus};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::fetch::ArtifactFetcher;
use crate::progress::ProgressAggregator;
use crate::worker::{DownloadJob, WorkerDeps, plan_dry_run, result_for, run_job};

/// Runs batches of downloads.
pub struct DownloadOrchestrator {
    deps: WorkerDeps,
}

impl DownloadOrchestrator {
    /// Create an orchestrator over `fetcher` with a fresh progress aggregator.
    pub fn new(fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        Self::with_progress(fetcher, Arc::new(ProgressAggregator::new()))
    }

    /// Create an orchestrator reporting into an existing aggregator.
    pub fn with_progress(
        fetcher: Arc<dyn ArtifactFetcher>,
        progress: Arc<ProgressAggregator>,
    ) -> Self {
        Self {
            deps: WorkerDeps { fetcher, progress },
        }
    }

    /// Progress of the current or last run.
    pub fn progress(&self) -> Arc<ProgressAggregator> {
        Arc::clone(&self.deps.progress)
    }

    /// Download every descriptor.
    ///
    /// Returns exactly one result per descriptor, in input order. Per-task
    /// failures (including cancellation) are reported in the results; this
    /// call itself never fails.
    pub async fn run(
        &self,
        descriptors: &[ArtifactDescriptor],
        options: &DownloadOptions,
        cancel: CancellationToken,
    ) -> Vec<DownloadResult> {
        self.deps
            .progress
            .begin(descriptors.iter().map(|d| d.file_name.clone()));

        if options.dry_run() {
            debug!(count = descriptors.len(), "Dry run");
            return descriptors
                .iter()
                .map(|d| plan_dry_run(d, options.destination_dir(), options.force()))
                .collect();
        }

        let permits = Arc::new(Semaphore::new(options.max_concurrency()));
        let mut handles = Vec::with_capacity(descriptors.len());

        for (index, descriptor) in descriptors.iter().enumerate() {
            let job = DownloadJob {
                index,
                descriptor: descriptor.clone(),
                destination_dir: options.destination_dir().to_path_buf(),
                force: options.force(),
                chunk_timeout: options.chunk_timeout(),
                cancel: cancel.clone(),
            };
            let deps = self.deps.clone();
            let permits = Arc::clone(&permits);

            handles.push(tokio::spawn(async move {
                // Acquire only fails on a closed semaphore; this one never is.
                let Ok(_permit) = permits.acquire_owned().await else {
                    let path = job.destination_dir.join(&job.descriptor.file_name);
                    return DownloadResult {
                        error: Some(DownloadError::Cancelled),
                        ..result_for(&job.descriptor, path, DownloadStatus::Failed)
                    };
                };
                run_job(job, &deps).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (handle, descriptor) in handles.into_iter().zip(descriptors) {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_error) => {
                    self.deps.progress.set_status(results.len(), DownloadStatus::Failed);
                    DownloadResult {
                        error: Some(DownloadError::io(
                            "Other",
                            format!("download task ended abnormally: {join_error}"),
                        )),
                        ..result_for(
                            descriptor,
                            options.destination_dir().join(&descriptor.file_name),
                            DownloadStatus::Failed,
                        )
                    }
                }
            };
            results.push(result);
        }

        let done = results.iter().filter(|r| r.is_success()).count();
        info!(
            requested = descriptors.len(),
            succeeded = done,
            cancelled = cancel.is_cancelled(),
            "Download batch finished"
        );
        results
    }
}
