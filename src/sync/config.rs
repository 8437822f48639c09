use crate::store::Project;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings of a synchronization run.
///
/// Durations are given in whole seconds when read from JSON. Missing fields take their default.
///
/// ```
/// use bgpkit_mirror::sync::SyncConfig;
/// use std::time::Duration;
///
/// let config = SyncConfig::from_json(r#"{"min_collectors": 2, "retry_interval": 1}"#).unwrap();
/// assert_eq!(config.min_collectors, 2);
/// assert_eq!(config.retry_interval, Duration::from_secs(1));
/// assert_eq!(config.max_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Collectors with archives a listing must find to be trusted.
    pub min_collectors: usize,
    /// Consecutive archives further apart than this are reported as a gap.
    #[serde(with = "duration_secs")]
    pub gap_threshold: Duration,
    /// Pause between attempts, for both discovery and uploads.
    #[serde(with = "duration_secs")]
    pub retry_interval: Duration,
    /// Discovery attempts before giving up.
    pub max_attempts: u32,
    /// Upload workers per collector. Above 1, a collector's files may be uploaded out of order.
    pub workers: usize,
    pub queue_capacity: usize,
    /// Origin fetch failures after which a worker stops.
    pub max_fetch_failures: u32,
    /// Attempts per file before a worker stops.
    pub max_upload_attempts: u32,
    /// Bound on a single upload call, whatever the cancellation state.
    #[serde(with = "duration_secs")]
    pub upload_timeout: Duration,
    /// Bound on a single origin request, for origins that talk to the network.
    #[serde(with = "duration_secs")]
    pub fetch_timeout: Duration,
    pub project: Project,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            min_collectors: 34,
            gap_threshold: Duration::from_secs(15 * 60),
            retry_interval: Duration::from_secs(10),
            max_attempts: 5,
            workers: 1,
            queue_capacity: 64,
            max_fetch_failures: 5,
            max_upload_attempts: 5,
            upload_timeout: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(60),
            project: Project::RouteViews,
        }
    }
}

impl SyncConfig {
    pub fn from_json(input: &str) -> Result<SyncConfig, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn with_min_collectors(mut self, min_collectors: usize) -> Self {
        self.min_collectors = min_collectors;
        self
    }

    pub fn with_gap_threshold(mut self, gap_threshold: Duration) -> Self {
        self.gap_threshold = gap_threshold;
        self
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_max_fetch_failures(mut self, max_fetch_failures: u32) -> Self {
        self.max_fetch_failures = max_fetch_failures;
        self
    }

    pub fn with_max_upload_attempts(mut self, max_upload_attempts: u32) -> Self {
        self.max_upload_attempts = max_upload_attempts;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn with_upload_timeout(mut self, upload_timeout: Duration) -> Self {
        self.upload_timeout = upload_timeout;
        self
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.project = project;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
