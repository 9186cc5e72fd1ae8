//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, the capability boundary
//! the manifest pipeline consumes: one metadata query and one byte-stream
//! read per object, nothing more.

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "s3")]
mod s3;

#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
#[cfg(feature = "s3")]
pub use self::s3::S3Backend;
use crate::error::Result;
use async_trait::async_trait;
use tokio::io::AsyncRead;

/// A finite, single-pass stream of object bytes.
///
/// Read errors surface as `std::io::Error` mid-stream; the stream ends
/// naturally when the reader returns zero bytes.
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

/// Unified interface for object storage backends.
///
/// Both operations are asynchronous and independent: an object's metadata
/// and its contents are fetched by separate requests. Implementations do
/// not retry; the caller decides what a failure means for the run.
///
/// # Examples
///
/// ```no_run
/// use skiff_storage::{StorageBackend, error::Result};
///
/// async fn size_of(backend: &dyn StorageBackend) -> Result<u64> {
///     backend.stat("my-bucket", "data/reads.bam").await
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend. Used for logging only.
    fn name(&self) -> &str;

    /// Size of the object in bytes, without reading its contents.
    ///
    /// Fails if the backend reports an error for the object or the
    /// response carries no usable content length.
    async fn stat(&self, bucket: &str, key: &str) -> Result<u64>;

    /// Open the object for a single streaming read of its full contents.
    ///
    /// The async setup (issuing the request) happens before returning; the
    /// returned reader yields the body incrementally and is suitable for
    /// feeding a running digest without buffering the whole object.
    async fn byte_stream(&self, bucket: &str, key: &str) -> Result<ObjectReader>;
}
