/*!
Archive synchronization: mirrors the update archives of the origin into the store.

A run goes through the following stages:
1. [RemoteTreeWalker] lists the archives of every collector within the time window;
2. [SyncOrchestrator] queues each collector's archives, in order, to its upload workers;
3. [UploadDispatcher] workers use [ChecksumDiffer] to skip archives already mirrored and upload
   the others;
4. the [SyncReport] gathers the counters and the gaps found between consecutive archives.

# Example

```no_run
use bgpkit_mirror::origin::LocalMirror;
use bgpkit_mirror::store::{LocalStore, Project, StoreReceiver};
use bgpkit_mirror::sync::{SyncConfig, SyncOrchestrator};
use chrono::{Duration, Utc};
use std::sync::Arc;

let store = Arc::new(LocalStore::new("/data/archive"));
let receiver = StoreReceiver::new().with_store(Project::RouteViews, store.clone());
let orchestrator = SyncOrchestrator::new(
    Arc::new(LocalMirror::new("/mnt/archive.routeviews.org")),
    store,
    Arc::new(receiver),
    SyncConfig::default(),
);
let end = Utc::now();
let report = orchestrator.sync(end - Duration::hours(6), end).unwrap();
println!("{:?}", report.metrics);
```
*/
mod cancel;
mod checksum;
mod config;
mod dispatcher;
mod orchestrator;
mod walker;

pub use cancel::CancelToken;
pub use checksum::{ChecksumDiffer, Verdict};
pub use config::SyncConfig;
pub use dispatcher::{DispatchReport, MetricsSnapshot, SyncMetrics, UploadDispatcher, WorkerExit};
pub use orchestrator::{find_gaps, ArchiveGap, SyncOrchestrator, SyncReport};
pub use walker::RemoteTreeWalker;
