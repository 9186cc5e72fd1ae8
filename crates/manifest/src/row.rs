//! Manifest rows and the per-address fetch-and-hash.

use crate::address::ObjectAddress;
use crate::error::{ErrorKind, Result};
use crate::hash::md5_hex;
use skiff_storage::BackendHandle;

/// Fixed ACL marker meaning no access restriction.
pub const DEFAULT_ACL: &str = "*";

/// One data line of the output manifest.
///
/// Created only after both a successful size query and a successful
/// full-stream hash. `guid` is always empty; the catalog assigns
/// identifiers downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub guid: String,
    pub file_name: String,
    pub md5: String,
    pub size: u64,
    pub acl: String,
    pub authz: String,
    pub urls: String,
}

/// Fetch one object's metadata and contents and assemble its manifest row.
///
/// The object is read twice, by independent requests: a metadata query for
/// the size, then a full streaming read for the digest. The file name is
/// derived before either request, so an underivable name never costs a
/// backend call.
pub async fn build_row(backend: &BackendHandle, address: &ObjectAddress, authz: &str) -> Result<ManifestRow> {
    let file_name = address.file_name()?.to_owned();
    let size = backend
        .stat(&address.bucket, &address.key)
        .await
        .map_err(|error| ErrorKind::fetch(address, error))?;
    let reader = backend
        .byte_stream(&address.bucket, &address.key)
        .await
        .map_err(|error| ErrorKind::hash(address, error))?;
    let md5 = md5_hex(reader).await.map_err(|error| ErrorKind::hash_read(address, error))?;
    tracing::debug!(uri = address.uri, size, md5, "assembled manifest row");
    Ok(ManifestRow {
        guid: String::new(),
        file_name,
        md5,
        size,
        acl: DEFAULT_ACL.to_owned(),
        authz: authz.to_owned(),
        urls: address.uri.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_storage::backend::MockBackend;

    fn address(uri: &str, line: usize) -> ObjectAddress {
        ObjectAddress::parse(uri, line).unwrap()
    }

    #[tokio::test]
    async fn test_build_row_success() {
        let backend = MockBackend::with_objects([("b", "dir/a.txt", b"hello world".to_vec())]).into_handle();
        let row = build_row(&backend, &address("s3://b/dir/a.txt", 1), "/programs/X").await.unwrap();
        assert_eq!(row.guid, "");
        assert_eq!(row.file_name, "a.txt");
        assert_eq!(row.md5, "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(row.size, 11);
        assert_eq!(row.acl, "*");
        assert_eq!(row.authz, "/programs/X");
        assert_eq!(row.urls, "s3://b/dir/a.txt");
    }

    #[tokio::test]
    async fn test_stat_failure_becomes_fetch_error_with_context() {
        let backend = MockBackend::default().fail_stat("b", "k", "403 Forbidden").into_handle();
        let err = build_row(&backend, &address("s3://b/k", 3), "/p").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fetch { line: 3, .. }));
        let message = err.to_string();
        assert!(message.contains("line 3"), "missing line in {message:?}");
        assert!(message.contains("s3://b/k"), "missing uri in {message:?}");
        assert!(message.contains("403 Forbidden"), "missing cause in {message:?}");
    }

    #[tokio::test]
    async fn test_missing_object_is_a_fetch_error() {
        let backend = MockBackend::default().into_handle();
        let err = build_row(&backend, &address("s3://b/nope", 1), "/p").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fetch { line: 1, .. }));
        assert!(err.to_string().contains("object not found"));
    }

    #[tokio::test]
    async fn test_stream_failure_becomes_hash_error() {
        let backend = MockBackend::with_objects([("b", "k", b"0123456789".to_vec())])
            .fail_stream("b", "k", "connection reset")
            .into_handle();
        let err = build_row(&backend, &address("s3://b/k", 2), "/p").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Hash { line: 2, .. }));
        assert!(err.to_string().contains("connection reset"));
    }
}
