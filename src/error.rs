/*!
error module defines the error types used in bgpkit-mirror.

Errors are split by the layer that produces them: [ParserError] for MRT/BGP decoding,
[ConvertError] for whole-archive conversion, [TransferError] for origin/store/upload I/O, and
[SyncError] for a synchronization run.
*/
use crate::models::AttrType;
use num_enum::{TryFromPrimitive, TryFromPrimitiveError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    /// The record cannot be decoded: missing header, bad framing, or a payload that does not
    /// match its header.
    ///
    /// ## Occurs during:
    ///  - Decoding of a single MRT record (the record is skipped, the stream continues)
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    /// The input ended in the middle of a record header or payload.
    ///
    /// ## Occurs during:
    ///  - Framing of MRT records from a stream
    #[error("truncated record: expected {expected} bytes, got {actual}")]
    TruncatedRecord { expected: usize, actual: usize },
    /// This error represents a [num_enum::TryFromPrimitiveError] error for any of a number of
    /// different types.
    ///
    /// ## Occurs during:
    ///  - Parsing of an MRT message body
    #[error("unrecognized value {value} for {type_name}")]
    UnrecognizedEnumVariant { type_name: &'static str, value: u64 },
    /// This error represents a [ipnet::PrefixLenError] error. It occurs if an address mask is
    /// larger than the length of the address it is being applied to.
    #[error("invalid network prefix mask")]
    InvalidPrefixLength(#[from] ipnet::PrefixLenError),
    #[error("not enough bytes to read {0}")]
    IoNotEnoughBytes(&'static str),
    #[error("invalid {attr_type:?} attribute: {reason}")]
    InvalidAttribute { attr_type: AttrType, reason: String },
    #[error("{0}")]
    ParseError(String),
    /// A general IO error triggered by the internal reader.
    #[error(transparent)]
    IoError(#[from] io::Error),
}

impl<T> From<TryFromPrimitiveError<T>> for ParserError
where
    T: TryFromPrimitive,
    T::Primitive: Into<u64>,
{
    #[inline]
    fn from(value: TryFromPrimitiveError<T>) -> Self {
        ParserError::UnrecognizedEnumVariant {
            type_name: T::NAME,
            value: value.number.into(),
        }
    }
}

/// Failures of reading, writing, or uploading an archive.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("object {0} not found")]
    NotFound(String),
    #[error("invalid upload request: {0}")]
    InvalidRequest(String),
    /// The declared checksum of an upload does not match its content. Never retried.
    #[error("checksum failure: requested {requested} != calculated {calculated}")]
    ChecksumMismatch {
        requested: String,
        calculated: String,
    },
    #[error("upload of {filename} rejected: {message}")]
    Rejected { filename: String, message: String },
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: String,
        after: std::time::Duration,
    },
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[cfg(feature = "http")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl TransferError {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        TransferError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether retrying the same operation could succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            TransferError::ChecksumMismatch { .. } | TransferError::InvalidRequest(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The archive ends mid-record. The whole conversion is rejected.
    #[error("truncated archive after {records} records: {source}")]
    TruncatedArchive {
        records: usize,
        #[source]
        source: ParserError,
    },
    #[error("invalid archive path {path}: {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("archive {0} has no content")]
    EmptyArchive(String),
    /// The decompressed stream could not be framed into records.
    #[error(transparent)]
    Parser(#[from] ParserError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("start time {start} should be before end time {end}")]
    InvalidWindow { start: String, end: String },
    /// Fewer collectors with archives were discovered than required.
    #[error("missing collectors: want {want}, got {got}")]
    IncompleteDiscovery { want: usize, got: usize },
    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<SyncError>,
    },
    #[error("synchronization cancelled")]
    Cancelled,
    #[error(transparent)]
    Transfer(#[from] TransferError),
}
