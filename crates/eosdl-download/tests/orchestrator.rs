//! End-to-end behaviour of the download orchestrator against a fake fetcher.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use eosdl_core::{
    ArtifactDescriptor, ArtifactFile, Checksum, ChecksumAlgorithm, Manifest, PackageType, Version,
};
use eosdl_download::{
    ArtifactFetcher, CancellationToken, DownloadError, DownloadOptions, DownloadOrchestrator,
    DownloadStatus, FetchResponse, Verification, file_digest, is_temp_file,
};
use futures_util::StreamExt;
use futures_util::stream;
use url::Url;

const BASE: &str = "https://downloads.example.com/";

/// How the fake answers one URL.
#[derive(Clone)]
enum Behaviour {
    /// Serve these bytes in two chunks.
    Serve(Vec<u8>),
    /// Serve one chunk, then never finish.
    Stall(Vec<u8>),
    /// Fail with this status.
    Status(u16),
}

#[derive(Default)]
struct FakeFetcher {
    routes: HashMap<String, Behaviour>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    fn route(mut self, file: &str, behaviour: Behaviour) -> Self {
        self.routes.insert(format!("{BASE}{file}"), behaviour);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactFetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.routes.get(url.as_str()).cloned() {
            Some(Behaviour::Serve(data)) => {
                let mid = data.len() / 2;
                let chunks = vec![
                    Ok(Bytes::copy_from_slice(&data[..mid])),
                    Ok(Bytes::copy_from_slice(&data[mid..])),
                ];
                Ok(FetchResponse {
                    content_length: Some(data.len() as u64),
                    body: stream::iter(chunks).boxed(),
                })
            }
            Some(Behaviour::Stall(data)) => Ok(FetchResponse {
                content_length: None,
                body: stream::once(async move { Ok(Bytes::from(data)) })
                    .chain(stream::pending())
                    .boxed(),
            }),
            Some(Behaviour::Status(code)) => {
                Err(DownloadError::failed_with_status(url.as_str(), code))
            }
            None => Err(DownloadError::failed_with_status(url.as_str(), 404)),
        }
    }
}

fn descriptor(file: &str) -> ArtifactDescriptor {
    let mut builder = Manifest::builder();
    builder.add_artifact(
        PackageType::Switch,
        Version::parse("4.29.3M").unwrap(),
        "default",
        ArtifactFile::new(file, file),
    );
    let entry = builder.build().entries()[0].clone();
    ArtifactDescriptor::new(
        entry,
        "default",
        file,
        Url::parse(BASE).unwrap().join(file).unwrap(),
    )
}

fn md5_of(dir: &Path, name: &str, data: &[u8]) -> String {
    let path = dir.join(format!("{name}.digest"));
    std::fs::write(&path, data).unwrap();
    let digest = file_digest(&path, ChecksumAlgorithm::Md5).unwrap();
    std::fs::remove_file(&path).unwrap();
    digest
}

fn visible_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn second_run_is_a_cache_hit() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(
        FakeFetcher::default().route("EOS-4.29.3M.swi", Behaviour::Serve(b"image".to_vec())),
    );
    let orchestrator = DownloadOrchestrator::new(fetcher.clone());
    let options = DownloadOptions::new(dir.path());
    let descriptors = [descriptor("EOS-4.29.3M.swi")];

    let first = orchestrator
        .run(&descriptors, &options, CancellationToken::new())
        .await;
    assert_eq!(first[0].status, DownloadStatus::Done);
    assert_eq!(first[0].verification, Verification::Unverified);
    assert_eq!(first[0].bytes_transferred, 5);
    assert_eq!(std::fs::read(dir.path().join("EOS-4.29.3M.swi")).unwrap(), b"image");
    assert_eq!(fetcher.calls(), 1);

    let second = orchestrator
        .run(&descriptors, &options, CancellationToken::new())
        .await;
    assert_eq!(second[0].status, DownloadStatus::Cached);
    assert!(second[0].is_success());
    assert_eq!(fetcher.calls(), 1);

    let forced = orchestrator
        .run(&descriptors, &options.clone().with_force(true), CancellationToken::new())
        .await;
    assert_eq!(forced[0].status, DownloadStatus::Done);
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn published_checksum_is_fetched_and_verified() {
    let dir = tempfile::tempdir().unwrap();
    let data = b"switch image bytes".to_vec();
    let digest = md5_of(dir.path(), "img", &data);
    let fetcher = Arc::new(
        FakeFetcher::default()
            .route("EOS-4.29.3M.swi", Behaviour::Serve(data))
            .route(
                "EOS-4.29.3M.swi.md5sum",
                Behaviour::Serve(format!("{digest}  EOS-4.29.3M.swi\n").into_bytes()),
            ),
    );
    let orchestrator = DownloadOrchestrator::new(fetcher.clone());
    let d = descriptor("EOS-4.29.3M.swi").with_checksum_source(
        ChecksumAlgorithm::Md5,
        Url::parse(BASE).unwrap().join("EOS-4.29.3M.swi.md5sum").unwrap(),
    );

    let results = orchestrator
        .run(&[d], &DownloadOptions::new(dir.path()), CancellationToken::new())
        .await;
    assert_eq!(results[0].status, DownloadStatus::Done);
    assert_eq!(results[0].verification, Verification::Verified);
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(
        visible_files(dir.path()),
        ["EOS-4.29.3M.swi", "EOS-4.29.3M.swi.md5sum"]
    );
}

#[tokio::test]
async fn checksum_file_is_not_kept_when_the_artifact_fails() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(
        FakeFetcher::default()
            .route("EOS-4.29.3M.swi", Behaviour::Status(503))
            .route(
                "EOS-4.29.3M.swi.md5sum",
                Behaviour::Serve(b"0123456789abcdef0123456789abcdef\n".to_vec()),
            ),
    );
    let d = descriptor("EOS-4.29.3M.swi").with_checksum_source(
        ChecksumAlgorithm::Md5,
        Url::parse(BASE).unwrap().join("EOS-4.29.3M.swi.md5sum").unwrap(),
    );

    let results = DownloadOrchestrator::new(fetcher.clone())
        .run(&[d], &DownloadOptions::new(dir.path()), CancellationToken::new())
        .await;
    assert_eq!(results[0].status, DownloadStatus::Failed);
    assert_eq!(fetcher.calls(), 2);
    assert!(visible_files(dir.path()).is_empty());
}

#[tokio::test]
async fn corrupt_download_is_removed_and_refetched() {
    let dir = tempfile::tempdir().unwrap();
    let good = b"the real image".to_vec();
    let expected = Checksum::new(ChecksumAlgorithm::Md5, md5_of(dir.path(), "good", &good));
    let mut corrupt = good.clone();
    corrupt[0] ^= 0xff;

    let bad_fetcher =
        Arc::new(FakeFetcher::default().route("EOS-4.29.3M.swi", Behaviour::Serve(corrupt)));
    let d = descriptor("EOS-4.29.3M.swi").with_expected_checksum(expected);
    let options = DownloadOptions::new(dir.path());

    let results = DownloadOrchestrator::new(bad_fetcher)
        .run(std::slice::from_ref(&d), &options, CancellationToken::new())
        .await;
    assert_eq!(results[0].status, DownloadStatus::Failed);
    assert!(matches!(
        results[0].error,
        Some(DownloadError::ChecksumMismatch { .. })
    ));
    assert!(visible_files(dir.path()).is_empty());

    let good_fetcher =
        Arc::new(FakeFetcher::default().route("EOS-4.29.3M.swi", Behaviour::Serve(good)));
    let retry = DownloadOrchestrator::new(good_fetcher.clone())
        .run(&[d], &options, CancellationToken::new())
        .await;
    assert_eq!(good_fetcher.calls(), 1);
    assert_eq!(retry[0].status, DownloadStatus::Done);
    assert_eq!(retry[0].verification, Verification::Verified);
}

#[tokio::test]
async fn dry_run_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("images");
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("cached.swi"), b"old").unwrap();

    let fetcher = Arc::new(FakeFetcher::default());
    let descriptors = [descriptor("cached.swi"), descriptor("fresh.swi")];
    let results = DownloadOrchestrator::new(fetcher.clone())
        .run(
            &descriptors,
            &DownloadOptions::new(&target).with_dry_run(true),
            CancellationToken::new(),
        )
        .await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.dry_run));
    assert_eq!(results[0].status, DownloadStatus::Cached);
    assert_eq!(results[1].status, DownloadStatus::Pending);
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(visible_files(&target), ["cached.swi"]);
}

#[tokio::test]
async fn failures_are_isolated_and_order_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(
        FakeFetcher::default()
            .route("a.swi", Behaviour::Serve(b"aaaa".to_vec()))
            .route("b.swi", Behaviour::Status(503))
            .route("c.swi", Behaviour::Serve(b"cccc".to_vec())),
    );
    let descriptors = [descriptor("a.swi"), descriptor("b.swi"), descriptor("c.swi")];
    let results = DownloadOrchestrator::new(fetcher)
        .run(
            &descriptors,
            &DownloadOptions::new(dir.path()).with_max_concurrency(2),
            CancellationToken::new(),
        )
        .await;

    let names: Vec<&str> = results.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, ["a.swi", "b.swi", "c.swi"]);
    assert_eq!(results[0].status, DownloadStatus::Done);
    assert!(matches!(
        results[1].error,
        Some(DownloadError::DownloadFailed {
            status_code: Some(503),
            ..
        })
    ));
    assert_eq!(results[2].status, DownloadStatus::Done);
    assert_eq!(visible_files(dir.path()), ["a.swi", "c.swi"]);
}

#[tokio::test]
async fn stalled_transfer_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(
        FakeFetcher::default().route("slow.swi", Behaviour::Stall(b"partial".to_vec())),
    );
    let results = DownloadOrchestrator::new(fetcher)
        .run(
            &[descriptor("slow.swi")],
            &DownloadOptions::new(dir.path()).with_chunk_timeout(Duration::from_millis(50)),
            CancellationToken::new(),
        )
        .await;

    assert!(matches!(
        results[0].error,
        Some(DownloadError::NetworkTimeout { .. })
    ));
    assert!(visible_files(dir.path()).is_empty());
}

#[tokio::test]
async fn cancellation_leaves_no_partial_files() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(
        FakeFetcher::default()
            .route("done.swi", Behaviour::Serve(b"finished".to_vec()))
            .route("stuck.swi", Behaviour::Stall(b"half".to_vec()))
            .route(
                "stuck.swi.md5sum",
                Behaviour::Serve(b"0123456789abcdef0123456789abcdef  stuck.swi\n".to_vec()),
            ),
    );
    let stuck = descriptor("stuck.swi").with_checksum_source(
        ChecksumAlgorithm::Md5,
        Url::parse(BASE).unwrap().join("stuck.swi.md5sum").unwrap(),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let results = DownloadOrchestrator::new(fetcher)
        .run(
            &[descriptor("done.swi"), stuck],
            &DownloadOptions::new(dir.path()),
            cancel,
        )
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, DownloadStatus::Done);
    assert_eq!(results[1].status, DownloadStatus::Failed);
    assert!(results[1].is_cancelled());

    // The checksum of the cancelled artifact was fetched but is not kept.
    let files = visible_files(dir.path());
    assert_eq!(files, ["done.swi"]);
    assert!(!files.iter().any(|f| is_temp_file(f)));
}
