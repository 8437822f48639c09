/*!
Durable object storage for mirrored and converted archives, and the upload request/response pair
used to put archives into it.
*/
mod local;
mod receiver;

pub use local::LocalStore;
pub use receiver::StoreReceiver;

use crate::error::TransferError;
use bytes::Bytes;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Component, Path};
use std::str::FromStr;

/// Checks that `path` names an object below a store root: only plain segments, no `..`, root
/// or prefix components.
pub fn validate_object_path(path: &str) -> Result<(), TransferError> {
    let confined = Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    match confined {
        true => Ok(()),
        false => Err(TransferError::InvalidRequest(format!(
            "{} is outside of the store",
            path
        ))),
    }
}

/// An object store keyed by path.
pub trait ArchiveStore: Send + Sync {
    /// MD5 digest of the stored object, `None` when the object does not exist.
    fn md5(&self, path: &str) -> Result<Option<[u8; 16]>, TransferError>;

    fn exists(&self, path: &str) -> Result<bool, TransferError>;

    fn read(&self, path: &str) -> Result<Bytes, TransferError>;

    /// Stores `content` at `path`, replacing any existing object. Readers never observe a
    /// partially written object.
    fn write(&self, path: &str, content: &[u8]) -> Result<(), TransferError>;
}

/// The data source an archive belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
    Default,
)]
#[repr(u8)]
pub enum Project {
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown = 0,
    #[serde(rename = "ROUTEVIEWS")]
    RouteViews = 1,
    #[serde(rename = "RIPE_RIS")]
    RipeRis = 2,
    #[serde(rename = "RPKI_RARC")]
    RpkiRarc = 3,
    #[serde(rename = "ROUTEVIEWS_RIB")]
    RouteViewsRib = 4,
}

impl Display for Project {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Project::Unknown => "UNKNOWN",
            Project::RouteViews => "ROUTEVIEWS",
            Project::RipeRis => "RIPE_RIS",
            Project::RpkiRarc => "RPKI_RARC",
            Project::RouteViewsRib => "ROUTEVIEWS_RIB",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Project {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ROUTEVIEWS" => Ok(Project::RouteViews),
            "RIPE_RIS" => Ok(Project::RipeRis),
            "RPKI_RARC" => Ok(Project::RpkiRarc),
            "ROUTEVIEWS_RIB" => Ok(Project::RouteViewsRib),
            _ => Err(TransferError::InvalidRequest(format!("unknown project {}", s))),
        }
    }
}

/// A request to store one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    pub filename: String,
    /// Lowercase hex MD5 of `content`, as computed by the sender.
    pub md5sum: String,
    pub content: Bytes,
    pub project: Project,
}

impl FileRequest {
    /// Builds a request for `content`, computing its checksum.
    pub fn new(filename: &str, content: Bytes, project: Project) -> FileRequest {
        FileRequest {
            filename: filename.to_string(),
            md5sum: format!("{:x}", md5::compute(&content)),
            content,
            project,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStatus {
    Unknown,
    Success,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResponse {
    pub status: UploadStatus,
    pub message: String,
}

impl FileResponse {
    pub fn success() -> FileResponse {
        FileResponse {
            status: UploadStatus::Success,
            message: String::new(),
        }
    }
}

/// The upload endpoint archives are sent to.
pub trait ArchiveUploader: Send + Sync {
    fn upload(&self, request: FileRequest) -> Result<FileResponse, TransferError>;
}
