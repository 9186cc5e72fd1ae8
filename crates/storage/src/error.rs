//! Storage Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, in the same shape as every other crate in this
//! workspace.

use derive_more::{Display, Error};

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong
/// internally. Callers that need input-line context (the manifest pipeline)
/// wrap these in their own kinds.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Object does not exist in the backend
    #[display("object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },
    /// Network-related error (S3 connections, etc.)
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// Backend reported a failure for an operation
    #[display("backend error: {_0}")]
    Backend(#[error(not(source))] String),
    /// Metadata query succeeded but carried no usable size
    #[display("missing content length for s3://{bucket}/{key}")]
    MissingContentLength { bucket: String, key: String },
}
