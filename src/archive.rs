/*!
Archive file naming: collector roots, update directories and the timestamps encoded in file names.

Update archives are published under `<root>/bgpdata/<YYYY.MM>/UPDATES/updates.<YYYYMMDD>.<HHMM>.<ext>`,
where the root is empty for the default collector. All times are UTC.
*/
use crate::error::{ParserError, SyncError};
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Directory marking the start of a collector's archive tree.
pub const BGPDATA_DIR: &str = "bgpdata";
/// Sub-directory holding update archives within a month.
pub const UPDATES_DIR: &str = "UPDATES";

/// An update archive at the origin, identified by its path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ArchiveFile {
    /// Path relative to the origin root, e.g. `route-views.linx/bgpdata/2022.04/UPDATES/...`.
    pub path: String,
    /// Collector root directory, empty for the default collector.
    pub collector_root: String,
    pub timestamp: DateTime<Utc>,
}

impl ArchiveFile {
    /// Builds an archive from its path, reading the timestamp from the file name.
    pub fn new(collector_root: &str, path: &str) -> Result<ArchiveFile, ParserError> {
        Ok(ArchiveFile {
            path: path.to_string(),
            collector_root: collector_root.to_string(),
            timestamp: time_from_filename(path)?,
        })
    }
}

impl Display for ArchiveFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Parses the UTC timestamp out of an update archive name.
///
/// Only the last path segment is considered. It must have exactly four dot-separated fields,
/// `updates.YYYYMMDD.HHMM.ext`.
///
/// ```
/// use bgpkit_mirror::archive::time_from_filename;
///
/// let ts = time_from_filename("route-views.linx/bgpdata/2022.04/UPDATES/updates.20220427.1900.bz2").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2022-04-27T19:00:00+00:00");
/// assert!(time_from_filename("updates.20220427.1900").is_err());
/// ```
pub fn time_from_filename(name: &str) -> Result<DateTime<Utc>, ParserError> {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    let fields: Vec<&str> = file_name.split('.').collect();
    if fields.len() != 4 {
        return Err(ParserError::ParseError(format!("bad filename {}", name)));
    }
    let ts = NaiveDateTime::parse_from_str(&format!("{}.{}", fields[1], fields[2]), "%Y%m%d.%H%M")
        .map_err(|e| {
            ParserError::ParseError(format!("failed to parse timestamp {}: {}", name, e))
        })?;
    Ok(ts.and_utc())
}

/// Directory listing the update archives of `root` for `month` (`YYYY.MM`).
pub fn updates_dir(root: &str, month: &str) -> String {
    match root.is_empty() {
        true => format!("{}/{}/{}", BGPDATA_DIR, month, UPDATES_DIR),
        false => format!("{}/{}/{}/{}", root, BGPDATA_DIR, month, UPDATES_DIR),
    }
}

/// A non-empty time range, `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<TimeWindow, SyncError> {
        if start >= end {
            return Err(SyncError::InvalidWindow {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(TimeWindow { start, end })
    }

    /// Strictly inside the window: both bounds are excluded.
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.start < *ts && *ts < self.end
    }

    pub fn months(&self) -> Vec<String> {
        spanned_months(self.start, self.end)
    }
}

/// Every calendar month touched by the range, formatted `YYYY.MM`, in ascending order.
///
/// The months of `start` and `end` are both included whatever the day and time, so a range from
/// the last second of October to the first second of December spans three months. The result is
/// empty when `start` is not before `end`.
pub fn spanned_months(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<String> {
    let mut months = vec![];
    if start >= end {
        return months;
    }
    let (mut year, mut month) = (start.year(), start.month());
    while (year, month) <= (end.year(), end.month()) {
        months.push(format!("{:04}.{:02}", year, month));
        (year, month) = match month {
            12 => (year + 1, 1),
            m => (year, m + 1),
        };
    }
    months
}
