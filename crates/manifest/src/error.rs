//! Manifest Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Every message carries enough context (input line
//! number, canonical URI, underlying failure text) to locate the offending
//! input without re-running.

use crate::address::ObjectAddress;
use derive_more::{Display, Error};
use skiff_storage::error::Error as StorageError;
use std::io::Error as IoError;
use std::path::PathBuf;

/// A manifest pipeline error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for manifest operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Input line is not a well-formed `s3://bucket/key` address
    #[display("malformed S3 URI at line {line}: {text:?} (expected s3://bucket/key)")]
    MalformedAddress { line: usize, text: String },
    /// Nothing usable remained after parsing the input
    #[display("no S3 URIs found in input")]
    NoAddresses,
    /// Key has no final non-empty segment to use as a file name
    #[display("could not derive file_name from S3 key at line {line}: {key:?}")]
    UnderivableFileName { line: usize, key: String },
    /// Worker count below one
    #[display("workers must be >= 1")]
    WorkerCount,
    /// Metadata query failed or returned no usable size
    #[display("failed to fetch size for line {line} ({uri}): {message}")]
    Fetch { line: usize, uri: String, message: String },
    /// Byte stream failed to open or terminated abnormally
    #[display("failed to stream object for line {line} ({uri}): {message}")]
    Hash { line: usize, uri: String, message: String },
    /// Input file missing or unreadable
    #[display("failed to read input file: {}", _0.display())]
    InputUnreadable(#[error(not(source))] PathBuf),
    /// Underlying I/O error (manifest output path)
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Anything outside the handled taxonomy (task panics, poisoned state)
    #[display("unexpected failure: {_0}")]
    Unexpected(#[error(not(source))] String),
}

impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Wrap a storage error from a metadata query, preserving its error
    /// tree while lifting the failure text into the message.
    #[track_caller]
    pub fn fetch(address: &ObjectAddress, error: StorageError) -> Error {
        let message = (*error).to_string();
        error.raise(Self::Fetch {
            line: address.line,
            uri: address.uri.clone(),
            message,
        })
    }

    /// Wrap a storage error from opening the byte stream.
    #[track_caller]
    pub fn hash(address: &ObjectAddress, error: StorageError) -> Error {
        let message = (*error).to_string();
        error.raise(Self::Hash {
            line: address.line,
            uri: address.uri.clone(),
            message,
        })
    }

    /// Wrap an I/O error raised mid-stream while hashing.
    #[track_caller]
    pub fn hash_read(address: &ObjectAddress, error: IoError) -> Error {
        Error::from(Self::Hash {
            line: address.line,
            uri: address.uri.clone(),
            message: error.to_string(),
        })
    }
}
