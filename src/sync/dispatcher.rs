use crate::archive::ArchiveFile;
use crate::error::TransferError;
use crate::origin::OriginConnector;
use crate::store::{
    ArchiveStore, ArchiveUploader, FileRequest, FileResponse, Project, UploadStatus,
};
use crate::sync::cancel::CancelToken;
use crate::sync::checksum::{ChecksumDiffer, Verdict};
use crate::sync::config::SyncConfig;
use bytes::Bytes;
use crossbeam_channel::{after, bounded, select, Receiver};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Outcome counters shared by every worker of a run.
#[derive(Debug, Default)]
pub struct SyncMetrics {
    synced: AtomicU64,
    skipped: AtomicU64,
    errors: AtomicU64,
}

impl SyncMetrics {
    pub fn synced(&self) -> u64 {
        self.synced.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            synced: self.synced(),
            skipped: self.skipped(),
            errors: self.errors(),
        }
    }

    fn add_synced(&self) {
        self.synced.fetch_add(1, Ordering::Relaxed);
    }

    fn add_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn add_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub synced: u64,
    pub skipped: u64,
    pub errors: u64,
}

/// Why a worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkerExit {
    /// The queue was closed and fully drained.
    Drained,
    /// The worker could not open its origin connection.
    ConnectFailed,
    /// Too many origin fetches failed.
    FetchFailures,
    /// A file could not be uploaded within the allowed attempts.
    UploadFailures,
    Cancelled,
}

/// What the workers of one dispatch did.
#[derive(Debug, Default, Clone)]
pub struct DispatchReport {
    pub exits: Vec<WorkerExit>,
    /// Files found in sync or uploaded, in the order each worker handled them.
    pub processed: Vec<ArchiveFile>,
}

enum UploadResult {
    Done,
    /// Rejected for good; the file is skipped.
    Rejected,
    Stop(WorkerExit),
}

/// Uploads the archives of a queue that differ from the store, using a pool of workers.
///
/// Every worker opens its own origin connection. Workers stop when the queue is closed and
/// drained, when cancelled, or when their failure budget is spent; the other workers carry on.
#[derive(Clone)]
pub struct UploadDispatcher {
    connector: Arc<dyn OriginConnector>,
    store: Arc<dyn ArchiveStore>,
    uploader: Arc<dyn ArchiveUploader>,
    metrics: Arc<SyncMetrics>,
    cancel: CancelToken,
    project: Project,
    workers: usize,
    max_fetch_failures: u32,
    max_upload_attempts: u32,
    retry_interval: Duration,
    upload_timeout: Duration,
}

impl UploadDispatcher {
    pub fn new(
        connector: Arc<dyn OriginConnector>,
        store: Arc<dyn ArchiveStore>,
        uploader: Arc<dyn ArchiveUploader>,
        config: &SyncConfig,
    ) -> UploadDispatcher {
        UploadDispatcher {
            connector,
            store,
            uploader,
            metrics: Arc::new(SyncMetrics::default()),
            cancel: CancelToken::new(),
            project: config.project,
            workers: config.workers.max(1),
            max_fetch_failures: config.max_fetch_failures.max(1),
            max_upload_attempts: config.max_upload_attempts.max(1),
            retry_interval: config.retry_interval,
            upload_timeout: config.upload_timeout,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<SyncMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn metrics(&self) -> &Arc<SyncMetrics> {
        &self.metrics
    }

    /// Runs the workers until they all stopped. Returns once the queue is closed and drained,
    /// or every worker gave up.
    pub fn run(&self, queue: Receiver<ArchiveFile>) -> DispatchReport {
        let results: Vec<(WorkerExit, Vec<ArchiveFile>)> = thread::scope(|s| {
            let handles: Vec<_> = (0..self.workers)
                .map(|id| {
                    let queue = queue.clone();
                    s.spawn(move || self.worker(id, queue))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        error!("upload worker panicked");
                        (WorkerExit::Cancelled, vec![])
                    })
                })
                .collect()
        });

        let mut report = DispatchReport::default();
        for (exit, processed) in results {
            report.exits.push(exit);
            report.processed.extend(processed);
        }
        report
    }

    fn worker(&self, id: usize, queue: Receiver<ArchiveFile>) -> (WorkerExit, Vec<ArchiveFile>) {
        let mut processed = vec![];
        let origin = match self.connector.connect() {
            Ok(origin) => origin,
            Err(e) => {
                error!("worker {}: failed to connect to origin: {}", id, e);
                self.metrics.add_error();
                return (WorkerExit::ConnectFailed, processed);
            }
        };
        let differ = ChecksumDiffer::new(origin.as_ref(), self.store.as_ref());
        let mut fetch_failures = 0;

        loop {
            if self.cancel.is_cancelled() {
                return (WorkerExit::Cancelled, processed);
            }
            let file = select! {
                recv(queue) -> msg => match msg {
                    Ok(file) => file,
                    Err(_) => return (WorkerExit::Drained, processed),
                },
                recv(self.cancel.channel()) -> _ => return (WorkerExit::Cancelled, processed),
            };

            let content = match differ.needs_upload(&file.path) {
                Ok(Verdict::InSync) => {
                    debug!("{} already in sync", file.path);
                    self.metrics.add_skipped();
                    processed.push(file);
                    continue;
                }
                Ok(Verdict::Upload { content, .. }) => content,
                Err(e) => {
                    fetch_failures += 1;
                    self.metrics.add_error();
                    warn!(
                        "worker {}: file {} cannot be downloaded ({}/{}): {}",
                        id, file.path, fetch_failures, self.max_fetch_failures, e
                    );
                    if fetch_failures >= self.max_fetch_failures {
                        error!("worker {}: too many fetch failures, stopping", id);
                        return (WorkerExit::FetchFailures, processed);
                    }
                    continue;
                }
            };

            match self.upload(id, &file, content) {
                UploadResult::Done => {
                    self.metrics.add_synced();
                    processed.push(file);
                }
                UploadResult::Rejected => {}
                UploadResult::Stop(exit) => return (exit, processed),
            }
        }
    }

    fn upload(&self, id: usize, file: &ArchiveFile, content: Bytes) -> UploadResult {
        let request = FileRequest::new(&file.path, content, self.project);
        info!("writing {}", file.path);
        for attempt in 1..=self.max_upload_attempts {
            let result = match self.upload_once(request.clone()) {
                Some(result) => result,
                None => return UploadResult::Stop(WorkerExit::Cancelled),
            };
            let e = match result.and_then(|resp| match resp.status {
                UploadStatus::Success => Ok(()),
                _ => Err(TransferError::Rejected {
                    filename: file.path.clone(),
                    message: resp.message,
                }),
            }) {
                Ok(()) => return UploadResult::Done,
                Err(e) => e,
            };
            self.metrics.add_error();
            if !e.is_transient() {
                error!("worker {}: upload of {} rejected: {}", id, file.path, e);
                return UploadResult::Rejected;
            }
            warn!(
                "worker {}: upload of {} failed (attempt {}/{}): {}",
                id, file.path, attempt, self.max_upload_attempts, e
            );
            if attempt < self.max_upload_attempts && !self.cancel.sleep(self.retry_interval) {
                return UploadResult::Stop(WorkerExit::Cancelled);
            }
        }
        error!("worker {}: giving up on {}, stopping", id, file.path);
        UploadResult::Stop(WorkerExit::UploadFailures)
    }

    /// One upload call bounded by the upload timeout. `None` when cancelled while waiting.
    ///
    /// A call that times out is abandoned; its thread finishes in the background and may still
    /// commit its write after a retry has. Stores must tolerate overlapping writes of one path
    /// (see [LocalStore](crate::store::LocalStore)), and both writes carry the same content.
    fn upload_once(&self, request: FileRequest) -> Option<Result<FileResponse, TransferError>> {
        let (sender, receiver) = bounded(1);
        let uploader = self.uploader.clone();
        let filename = request.filename.clone();
        thread::spawn(move || {
            let _ = sender.send(uploader.upload(request));
        });
        select! {
            recv(receiver) -> msg => Some(msg.unwrap_or_else(|_| {
                Err(TransferError::Rejected {
                    filename: filename.clone(),
                    message: "uploader panicked".to_string(),
                })
            })),
            recv(after(self.upload_timeout)) -> _ => Some(Err(TransferError::Timeout {
                operation: format!("upload of {}", filename),
                after: self.upload_timeout,
            })),
            recv(self.cancel.channel()) -> _ => None,
        }
    }
}
