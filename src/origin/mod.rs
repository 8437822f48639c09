//! Archive origins: the hierarchical namespace the collectors publish their archives to.
//!
//! An origin only needs to list directories and retrieve files. [LocalMirror] serves a mounted
//! tree, [HttpMirror] (feature `http`) walks the directory index pages of a web server.

mod local;
pub use local::LocalMirror;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::HttpMirror;

use crate::error::TransferError;
use bytes::Bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of a directory listing. `name` is the last path segment only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OriginEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl OriginEntry {
    pub fn file(name: &str) -> OriginEntry {
        OriginEntry {
            name: name.to_string(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: &str) -> OriginEntry {
        OriginEntry {
            name: name.to_string(),
            kind: EntryKind::Directory,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Read access to the origin. Paths are relative to the origin root, `""` being the root itself.
pub trait ArchiveOrigin {
    fn list(&self, path: &str) -> Result<Vec<OriginEntry>, TransferError>;

    fn retrieve(&self, path: &str) -> Result<Bytes, TransferError>;
}

/// Opens origin connections. Every worker thread connects on its own.
pub trait OriginConnector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn ArchiveOrigin>, TransferError>;
}

impl<F> OriginConnector for F
where
    F: Fn() -> Result<Box<dyn ArchiveOrigin>, TransferError> + Send + Sync,
{
    fn connect(&self) -> Result<Box<dyn ArchiveOrigin>, TransferError> {
        self()
    }
}
