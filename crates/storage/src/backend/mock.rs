//! In-memory storage backend for testing.

use crate::backend::ObjectReader;
use crate::error::{ErrorKind, Result};
use crate::{BackendHandle, StorageBackend};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, ReadBuf};

#[derive(Debug, Default, Clone)]
struct MockObject {
    data: Vec<u8>,
    latency: Option<Duration>,
    stat_error: Option<String>,
    stream_error: Option<String>,
}

/// In-memory storage backend for testing.
///
/// Objects live in a `HashMap` keyed by `(bucket, key)`, built up front with
/// the builder methods, so trait methods operate on `&self` without any
/// locking. Per-object latency and failure injection let tests exercise
/// completion-order and fail-fast behaviour without network access, and
/// atomic call counters let tests assert that no backend call was made at
/// all.
pub struct MockBackend {
    name: String,
    objects: HashMap<(String, String), MockObject>,
    stat_calls: AtomicUsize,
    stream_calls: AtomicUsize,
}

impl MockBackend {
    /// Create a mock backend pre-populated with objects.
    pub fn with_objects(
        objects: impl IntoIterator<Item = (impl Into<String>, impl Into<String>, impl Into<Vec<u8>>)>,
    ) -> Self {
        let mut backend = Self::default();
        for (bucket, key, data) in objects {
            backend = backend.with_object(bucket, key, data);
        }
        backend
    }

    /// Add a single object.
    pub fn with_object(mut self, bucket: impl Into<String>, key: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.entry(bucket, key).data = data.into();
        self
    }

    /// Delay both `stat` and `byte_stream` for one object.
    pub fn with_latency(mut self, bucket: impl Into<String>, key: impl Into<String>, latency: Duration) -> Self {
        self.entry(bucket, key).latency = Some(latency);
        self
    }

    /// Make `stat` fail for one object with the given message.
    pub fn fail_stat(mut self, bucket: impl Into<String>, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.entry(bucket, key).stat_error = Some(message.into());
        self
    }

    /// Make the byte stream for one object fail mid-read: the reader yields
    /// the first half of the object's data, then an I/O error.
    pub fn fail_stream(mut self, bucket: impl Into<String>, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.entry(bucket, key).stream_error = Some(message.into());
        self
    }

    /// Number of `stat` calls made against this backend.
    pub fn stat_calls(&self) -> usize {
        self.stat_calls.load(Ordering::SeqCst)
    }

    /// Number of `byte_stream` calls made against this backend.
    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    /// Wrap this backend in the shared handle type the pipeline consumes.
    pub fn into_handle(self) -> BackendHandle {
        Arc::new(self)
    }

    fn entry(&mut self, bucket: impl Into<String>, key: impl Into<String>) -> &mut MockObject {
        self.objects.entry((bucket.into(), key.into())).or_default()
    }

    fn object(&self, bucket: &str, key: &str) -> Result<&MockObject> {
        self.objects.get(&(bucket.to_owned(), key.to_owned())).ok_or_else(|| {
            exn::Exn::from(ErrorKind::NotFound {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            })
        })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            objects: HashMap::new(),
            stat_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stat(&self, bucket: &str, key: &str) -> Result<u64> {
        self.stat_calls.fetch_add(1, Ordering::SeqCst);
        let object = self.object(bucket, key)?;
        if let Some(latency) = object.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(message) = &object.stat_error {
            exn::bail!(ErrorKind::Backend(message.clone()));
        }
        Ok(object.data.len() as u64)
    }

    async fn byte_stream(&self, bucket: &str, key: &str) -> Result<ObjectReader> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        let object = self.object(bucket, key)?;
        if let Some(latency) = object.latency {
            tokio::time::sleep(latency).await;
        }
        match &object.stream_error {
            Some(message) => {
                let half = object.data.len() / 2;
                Ok(Box::new(FailingReader {
                    head: Cursor::new(object.data[..half].to_vec()),
                    message: Some(message.clone()),
                }))
            },
            None => Ok(Box::new(Cursor::new(object.data.clone()))),
        }
    }
}

/// Reader that yields a prefix of the object's bytes and then an error,
/// standing in for a transfer that dies partway through.
struct FailingReader {
    head: Cursor<Vec<u8>>,
    message: Option<String>,
}

impl AsyncRead for FailingReader {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let me = self.get_mut();
        let before = buf.filled().len();
        match Pin::new(&mut me.head).poll_read(cx, buf) {
            Poll::Ready(Ok(())) if buf.filled().len() == before => match me.message.take() {
                Some(message) => Poll::Ready(Err(io::Error::other(message))),
                None => Poll::Ready(Ok(())),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_stat_returns_size() {
        let backend = MockBackend::with_objects([("b", "dir/a.txt", b"hello".to_vec())]);
        assert_eq!(backend.stat("b", "dir/a.txt").await.unwrap(), 5);
        assert_eq!(backend.stat_calls(), 1);
    }

    #[tokio::test]
    async fn test_stat_not_found() {
        let backend = MockBackend::default();
        let err = backend.stat("b", "missing").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_stat_failure_injection() {
        let backend = MockBackend::default().fail_stat("b", "k", "403 Forbidden");
        let err = backend.stat("b", "k").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Backend(message) if message == "403 Forbidden"));
    }

    #[tokio::test]
    async fn test_byte_stream_reads_full_object() {
        let backend = MockBackend::with_objects([("b", "k", b"0123456789".to_vec())]);
        let mut reader = backend.byte_stream("b", "k").await.unwrap();
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await.unwrap();
        assert_eq!(data, b"0123456789");
        assert_eq!(backend.stream_calls(), 1);
    }

    #[tokio::test]
    async fn test_stream_failure_injection_errors_mid_read() {
        let backend = MockBackend::with_objects([("b", "k", b"0123456789".to_vec())]).fail_stream("b", "k", "connection reset");
        let mut reader = backend.byte_stream("b", "k").await.unwrap();
        let mut data = Vec::new();
        let err = reader.read_to_end(&mut data).await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
        // The prefix was delivered before the failure.
        assert_eq!(data, b"01234");
    }
}
