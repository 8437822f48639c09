use crate::error::TransferError;
use crate::store::{validate_object_path, ArchiveStore};
use bytes::Bytes;
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static PART_SEQ: AtomicU64 = AtomicU64::new(0);

/// An [ArchiveStore] backed by a directory tree.
///
/// Paths are relative to the root, and a path that would leave it is an invalid request. Writes
/// go to a uniquely named `.part` sibling first and are renamed into place once complete, so
/// concurrent writers of one path never share a temporary file and the last rename wins.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(root: P) -> LocalStore {
        LocalStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> Result<PathBuf, TransferError> {
        let relative = path.trim_start_matches('/');
        validate_object_path(relative)?;
        Ok(self.root.join(relative))
    }
}

impl ArchiveStore for LocalStore {
    fn md5(&self, path: &str) -> Result<Option<[u8; 16]>, TransferError> {
        match fs::read(self.full_path(path)?) {
            Ok(content) => Ok(Some(md5::compute(content).0)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TransferError::io(path, e)),
        }
    }

    fn exists(&self, path: &str) -> Result<bool, TransferError> {
        self.full_path(path)?
            .try_exists()
            .map_err(|e| TransferError::io(path, e))
    }

    fn read(&self, path: &str) -> Result<Bytes, TransferError> {
        match fs::read(self.full_path(path)?) {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(TransferError::NotFound(path.to_string()))
            }
            Err(e) => Err(TransferError::io(path, e)),
        }
    }

    fn write(&self, path: &str, content: &[u8]) -> Result<(), TransferError> {
        let full_path = self.full_path(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| TransferError::io(path, e))?;
        }
        let mut part = full_path.clone().into_os_string();
        part.push(format!(
            ".{}.{}.part",
            std::process::id(),
            PART_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&part, content).map_err(|e| TransferError::io(path, e))?;
        if let Err(e) = fs::rename(&part, &full_path) {
            let _ = fs::remove_file(&part);
            return Err(TransferError::io(path, e));
        }
        debug!("stored {} ({} bytes)", full_path.display(), content.len());
        Ok(())
    }
}
