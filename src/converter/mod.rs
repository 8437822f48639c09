/*!
Conversion of bzip2-compressed MRT update archives into gzip-compressed newline-delimited JSON,
one [UpdateRow] per BGP UPDATE, ready for loading into a warehouse.

[convert] works on any reader/writer pair. [ArchiveConverter] runs it between two
[ArchiveStore]s, deriving the destination object and the collector name from the source path.

# Example

```no_run
use bgpkit_mirror::converter::ArchiveConverter;
use bgpkit_mirror::store::{LocalStore, Project};
use std::sync::Arc;

let converter = ArchiveConverter::new(
    Arc::new(LocalStore::new("/data/archive")),
    Arc::new(LocalStore::new("/data/converted")),
    Project::RouteViews,
);
let outcome = converter
    .process("route-views.linx/bgpdata/2022.04/UPDATES/updates.20220427.1900.bz2")
    .unwrap();
println!("{:?}", outcome);
```
*/
mod event;

pub use event::{ConversionEvent, EventKind, EventOutcome};

use crate::error::{ConvertError, ParserError};
use crate::models::{DecodedRecord, UpdateRow};
use crate::parser::{decode, RecordReader};
use crate::store::{ArchiveStore, Project};
use bzip2::read::MultiBzDecoder;
use crossbeam_channel::bounded;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info, warn};
use serde::Serialize;
use std::io::{Read, Write};
use std::sync::Arc;
use std::thread;

/// Collector of archives stored directly under `bgpdata/`.
pub const DEFAULT_COLLECTOR: &str = "route-views2";

/// Per-archive record counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConvertStats {
    /// Records framed from the archive.
    pub records: usize,
    /// Rows written.
    pub updates: usize,
    /// Records that are not BGP updates: state changes, other message and entry types.
    pub skipped: usize,
    /// Records that failed to decode.
    pub errors: usize,
}

/// Converts one bzip2-compressed MRT archive into gzip-compressed JSON lines.
///
/// Records that fail to decode are logged and skipped. A stream that ends inside a record fails
/// with [ConvertError::TruncatedArchive]; the rows converted before that point are still written
/// and the gzip stream is finished.
pub fn convert<R: Read, W: Write>(
    collector: &str,
    raw: R,
    dst: W,
) -> Result<ConvertStats, ConvertError> {
    let mut reader = RecordReader::new(MultiBzDecoder::new(raw));
    let mut encoder = GzEncoder::new(dst, Compression::default());
    let mut stats = ConvertStats::default();

    loop {
        let (header, payload) = match reader.next_record() {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(e @ ParserError::TruncatedRecord { .. }) => {
                encoder.finish()?;
                return Err(ConvertError::TruncatedArchive {
                    records: stats.records,
                    source: e,
                });
            }
            Err(ParserError::IoError(e)) => return Err(ConvertError::Io(e)),
            Err(e) => return Err(e.into()),
        };
        stats.records += 1;

        let record = match decode(Some(&header), payload, collector) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "failed to parse update (type {}, subtype {}): {}",
                    header.entry_type, header.entry_subtype, e
                );
                stats.errors += 1;
                continue;
            }
        };

        match &record {
            DecodedRecord::Announcement(update) | DecodedRecord::Withdrawal(update) => {
                serde_json::to_writer(&mut encoder, &UpdateRow::from_record(update)?)?;
                encoder.write_all(b"\n")?;
                stats.updates += 1;
            }
            DecodedRecord::StateChange(_) | DecodedRecord::Unknown { .. } => {
                debug!(
                    "unsupported message types: type {}, subtype {}",
                    header.entry_type, header.entry_subtype
                );
                stats.skipped += 1;
            }
        }
    }

    encoder.finish()?;
    Ok(stats)
}

/// Object name of the converted archive: the last extension of `src` replaced by `gz`.
///
/// ```
/// use bgpkit_mirror::converter::destination_path;
///
/// assert_eq!(
///     destination_path("bgpdata/2022.04/UPDATES/updates.20220427.1900.bz2"),
///     "bgpdata/2022.04/UPDATES/updates.20220427.1900.gz"
/// );
/// ```
pub fn destination_path(src: &str) -> String {
    let name_start = src.rfind('/').map(|i| i + 1).unwrap_or(0);
    match src[name_start..].rfind('.') {
        Some(dot) => format!("{}.gz", &src[..name_start + dot]),
        None => format!("{}.gz", src),
    }
}

/// Collector name of a RouteViews archive path.
///
/// The path is treated as starting with `/`. It must contain `bgpdata`; archives directly under
/// `bgpdata/` belong to [DEFAULT_COLLECTOR], others to their first directory.
pub fn collector_from_path(path: &str) -> Result<String, ConvertError> {
    if path.is_empty() {
        return Err(ConvertError::InvalidPath {
            path: path.to_string(),
            reason: "empty file path",
        });
    }
    let path = match path.starts_with('/') {
        true => path.to_string(),
        false => format!("/{}", path),
    };
    if !path.contains("bgpdata") {
        return Err(ConvertError::InvalidPath {
            path,
            reason: "not a RouteViews archive path",
        });
    }
    let first = path.split('/').nth(1).unwrap_or_default();
    Ok(match first {
        "bgpdata" => DEFAULT_COLLECTOR.to_string(),
        collector => collector.to_string(),
    })
}

/// Result of converting one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConvertOutcome {
    Converted {
        destination: String,
        stats: ConvertStats,
    },
    /// The destination already existed; the source was not read.
    Skipped { destination: String },
}

/// Converts archives from a source store into a destination store.
#[derive(Clone)]
pub struct ArchiveConverter {
    source: Arc<dyn ArchiveStore>,
    destination: Arc<dyn ArchiveStore>,
    project: Project,
}

impl ArchiveConverter {
    pub fn new(
        source: Arc<dyn ArchiveStore>,
        destination: Arc<dyn ArchiveStore>,
        project: Project,
    ) -> ArchiveConverter {
        ArchiveConverter {
            source,
            destination,
            project,
        }
    }

    fn collector(&self, src_path: &str) -> Result<String, ConvertError> {
        match self.project {
            Project::RouteViews => collector_from_path(src_path),
            project => {
                warn!("unsupported project type {}", project);
                Ok(String::new())
            }
        }
    }

    /// Converts `src_path` unless its converted archive already exists.
    ///
    /// The destination object is written once, after the whole archive converted successfully.
    pub fn process(&self, src_path: &str) -> Result<ConvertOutcome, ConvertError> {
        let destination = destination_path(src_path);
        if self.destination.exists(&destination)? {
            warn!("converted archive {} already exists", destination);
            return Ok(ConvertOutcome::Skipped { destination });
        }

        let collector = self.collector(src_path)?;
        let content = self.source.read(src_path)?;
        if content.is_empty() {
            return Err(ConvertError::EmptyArchive(src_path.to_string()));
        }

        let mut buf = vec![];
        let stats = convert(&collector, content.as_ref(), &mut buf)?;
        self.destination.write(&destination, &buf)?;
        info!(
            "converted {} into {}: {} updates from {} records",
            src_path, destination, stats.updates, stats.records
        );
        Ok(ConvertOutcome::Converted { destination, stats })
    }

    /// Converts every path using `workers` threads. Results come back in input order.
    pub fn process_all(
        &self,
        paths: &[String],
        workers: usize,
    ) -> Vec<(String, Result<ConvertOutcome, ConvertError>)> {
        let (job_sender, job_receiver) = bounded::<(usize, &String)>(workers.max(1) * 2);
        let (result_sender, result_receiver) = bounded(paths.len().max(1));

        thread::scope(|s| {
            for _ in 0..workers.max(1) {
                let job_receiver = job_receiver.clone();
                let result_sender = result_sender.clone();
                s.spawn(move || {
                    for (index, path) in job_receiver {
                        let result = self.process(path);
                        if let Err(e) = &result {
                            warn!("failed to convert {}: {}", path, e);
                        }
                        if result_sender.send((index, path.clone(), result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(job_receiver);
            drop(result_sender);

            for job in paths.iter().enumerate() {
                if job_sender.send(job).is_err() {
                    break;
                }
            }
            drop(job_sender);
        });

        let mut results: Vec<_> = result_receiver.try_iter().collect();
        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, path, result)| (path, result))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_from_path() {
        let cases = [
            ("bgpdata/2022.04/UPDATES/updates.20220427.1900.bz2", Some("route-views2")),
            ("/bgpdata/2022.04/UPDATES/updates.20220427.1900.bz2", Some("route-views2")),
            (
                "route-views.linx/bgpdata/2022.04/UPDATES/updates.20220427.1900.bz2",
                Some("route-views.linx"),
            ),
            (
                "/route-views.sydney/bgpdata/2022.04/UPDATES/updates.20220427.1900.bz2",
                Some("route-views.sydney"),
            ),
            ("route-views.linx/2022.04/UPDATES/updates.20220427.1900.bz2", None),
            ("", None),
        ];
        for (path, want) in cases {
            match want {
                Some(want) => assert_eq!(collector_from_path(path).unwrap(), want),
                None => assert!(matches!(
                    collector_from_path(path),
                    Err(ConvertError::InvalidPath { .. })
                )),
            }
        }
    }

    #[test]
    fn test_destination_path() {
        assert_eq!(destination_path("a/b/updates.20220427.1900.bz2"), "a/b/updates.20220427.1900.gz");
        assert_eq!(destination_path("route-views.linx/bgpdata/x"), "route-views.linx/bgpdata/x.gz");
        assert_eq!(destination_path("updates.bz2"), "updates.gz");
    }
}
