use crate::archive::{time_from_filename, updates_dir, ArchiveFile, TimeWindow, BGPDATA_DIR};
use crate::error::SyncError;
use crate::origin::{ArchiveOrigin, EntryKind};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Lists the update archives an origin holds for a time window, per collector root.
#[derive(Debug, Clone)]
pub struct RemoteTreeWalker {
    min_collectors: usize,
}

impl RemoteTreeWalker {
    pub fn new(min_collectors: usize) -> RemoteTreeWalker {
        RemoteTreeWalker { min_collectors }
    }

    /// Archives strictly inside `window`, keyed by collector root and sorted by path.
    ///
    /// The root directory `bgpdata` is the default collector, keyed by `""`. Month directories
    /// that are missing or empty contribute nothing. Collectors without archives are left out,
    /// and finding fewer than the minimum fails with [SyncError::IncompleteDiscovery].
    pub fn list_candidates(
        &self,
        origin: &dyn ArchiveOrigin,
        window: &TimeWindow,
    ) -> Result<BTreeMap<String, Vec<ArchiveFile>>, SyncError> {
        let roots: Vec<String> = origin
            .list("")?
            .into_iter()
            .filter(|e| e.kind == EntryKind::Directory)
            .map(|e| match e.name == BGPDATA_DIR {
                true => String::new(),
                false => e.name,
            })
            .collect();
        let months = window.months();

        let mut candidates = BTreeMap::new();
        let mut total = 0;
        for root in roots {
            let mut files = vec![];
            for month in &months {
                let dir = updates_dir(&root, month);
                let entries = match origin.list(&dir) {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!("listing {}: {}", dir, e);
                        continue;
                    }
                };
                if entries.is_empty() {
                    debug!("{} is empty", dir);
                }
                for entry in entries.into_iter().filter(|e| !e.is_dir()) {
                    let timestamp = match time_from_filename(&entry.name) {
                        Ok(ts) => ts,
                        Err(e) => {
                            warn!("failed to parse archive {}: {}", entry.name, e);
                            continue;
                        }
                    };
                    if window.contains(&timestamp) {
                        files.push(ArchiveFile {
                            path: format!("{}/{}", dir, entry.name),
                            collector_root: root.clone(),
                            timestamp,
                        });
                    }
                }
            }
            if files.is_empty() {
                continue;
            }
            files.sort_by(|a, b| a.path.cmp(&b.path));
            files.dedup_by(|a, b| a.path == b.path);
            total += files.len();
            candidates.insert(root, files);
        }

        if candidates.len() < self.min_collectors {
            return Err(SyncError::IncompleteDiscovery {
                want: self.min_collectors,
                got: candidates.len(),
            });
        }
        info!(
            "checking {} files from {} collectors",
            total,
            candidates.len()
        );
        Ok(candidates)
    }
}
