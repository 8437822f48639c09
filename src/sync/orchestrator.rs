use crate::archive::{ArchiveFile, TimeWindow};
use crate::error::SyncError;
use crate::origin::OriginConnector;
use crate::store::{ArchiveStore, ArchiveUploader};
use crate::sync::cancel::CancelToken;
use crate::sync::config::SyncConfig;
use crate::sync::dispatcher::{MetricsSnapshot, SyncMetrics, UploadDispatcher, WorkerExit};
use crate::sync::walker::RemoteTreeWalker;
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, select};
use log::{error, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Two consecutive archives of a collector further apart than the gap threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveGap {
    pub collector: String,
    pub prev: String,
    pub next: String,
    pub gap: Duration,
}

/// Aggregate result of a synchronization run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub collectors: usize,
    pub discovered: usize,
    pub metrics: MetricsSnapshot,
    pub gaps: Vec<ArchiveGap>,
    pub worker_exits: BTreeMap<String, Vec<WorkerExit>>,
}

/// Mirrors the archives of a time window from the origin into the store.
///
/// Discovery is retried with a constant backoff. Each collector then gets its own queue and
/// upload workers, and all collectors run concurrently. File failures are counted, not fatal.
pub struct SyncOrchestrator {
    connector: Arc<dyn OriginConnector>,
    store: Arc<dyn ArchiveStore>,
    uploader: Arc<dyn ArchiveUploader>,
    config: SyncConfig,
    cancel: CancelToken,
}

impl SyncOrchestrator {
    pub fn new(
        connector: Arc<dyn OriginConnector>,
        store: Arc<dyn ArchiveStore>,
        uploader: Arc<dyn ArchiveUploader>,
        config: SyncConfig,
    ) -> SyncOrchestrator {
        SyncOrchestrator {
            connector,
            store,
            uploader,
            config,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn sync(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<SyncReport, SyncError> {
        let window = TimeWindow::new(start, end)?;
        let candidates = self.discover(&window)?;
        info!("found {} roots to be synced", candidates.len());

        let metrics = Arc::new(SyncMetrics::default());
        let dispatcher = UploadDispatcher::new(
            self.connector.clone(),
            self.store.clone(),
            self.uploader.clone(),
            &self.config,
        )
        .with_metrics(metrics.clone())
        .with_cancel(self.cancel.clone());

        let mut report = SyncReport {
            collectors: candidates.len(),
            discovered: candidates.values().map(|files| files.len()).sum(),
            ..Default::default()
        };

        let results = thread::scope(|s| {
            let handles: Vec<_> = candidates
                .iter()
                .map(|(root, files)| {
                    let dispatcher = &dispatcher;
                    s.spawn(move || self.sync_collector(dispatcher, root, files))
                })
                .collect();
            handles
                .into_iter()
                .zip(candidates.keys())
                .map(|(h, root)| {
                    let result = h.join().unwrap_or_else(|_| {
                        error!("synchronization of {} panicked", root);
                        (vec![], vec![])
                    });
                    (root.clone(), result)
                })
                .collect::<Vec<_>>()
        });

        for (root, (exits, gaps)) in results {
            report.worker_exits.insert(root, exits);
            report.gaps.extend(gaps);
        }
        report.metrics = metrics.snapshot();
        info!(
            "synced {}, skipped {}, errors {}, gaps {}",
            report.metrics.synced,
            report.metrics.skipped,
            report.metrics.errors,
            report.gaps.len()
        );
        Ok(report)
    }

    /// Lists the candidates, retrying with a constant backoff.
    fn discover(
        &self,
        window: &TimeWindow,
    ) -> Result<BTreeMap<String, Vec<ArchiveFile>>, SyncError> {
        let walker = RemoteTreeWalker::new(self.config.min_collectors);
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            if self.cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
            attempt += 1;
            let result = self
                .connector
                .connect()
                .map_err(SyncError::from)
                .and_then(|origin| walker.list_candidates(origin.as_ref(), window));
            let e = match result {
                Ok(candidates) => return Ok(candidates),
                Err(e) => e,
            };
            warn!("discovery attempt {}/{}: {}", attempt, max_attempts, e);
            if attempt >= max_attempts {
                return Err(SyncError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(e),
                });
            }
            if !self.cancel.sleep(self.config.retry_interval) {
                return Err(SyncError::Cancelled);
            }
        }
    }

    /// Feeds one collector's files, in order, to its own workers.
    fn sync_collector(
        &self,
        dispatcher: &UploadDispatcher,
        root: &str,
        files: &[ArchiveFile],
    ) -> (Vec<WorkerExit>, Vec<ArchiveGap>) {
        let (sender, receiver) = bounded(self.config.queue_capacity.max(1));
        let report = thread::scope(|s| {
            let workers = s.spawn(move || dispatcher.run(receiver));
            for file in files {
                let queued = select! {
                    send(sender, file.clone()) -> res => res.is_ok(),
                    recv(self.cancel.channel()) -> _ => false,
                };
                if !queued {
                    warn!("collector {:?}: stopped queueing at {}", root, file.path);
                    break;
                }
            }
            drop(sender);
            workers.join().unwrap_or_default()
        });

        let mut processed = report.processed;
        processed.sort_by(|a, b| a.path.cmp(&b.path));
        let gaps = find_gaps(root, &processed, self.config.gap_threshold);
        info!(
            "collector {:?}: processed {} of {} files",
            root,
            processed.len(),
            files.len()
        );
        (report.exits, gaps)
    }
}

/// Gaps between consecutive archives, which must be in ascending order.
pub fn find_gaps(
    collector: &str,
    files: &[ArchiveFile],
    threshold: Duration,
) -> Vec<ArchiveGap> {
    files
        .windows(2)
        .filter_map(|pair| {
            let gap = (pair[1].timestamp - pair[0].timestamp).to_std().ok()?;
            if gap <= threshold {
                return None;
            }
            warn!(
                "archive missing: collector {:?}, prev {}, next {}, gap {} minutes",
                collector,
                pair[0].path,
                pair[1].path,
                gap.as_secs() / 60
            );
            Some(ArchiveGap {
                collector: collector.to_string(),
                prev: pair[0].path.clone(),
                next: pair[1].path.clone(),
                gap,
            })
        })
        .collect()
}
