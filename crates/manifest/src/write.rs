//! Manifest serialization.

use crate::error::{ErrorKind, Result};
use crate::row::ManifestRow;
use std::fmt::Write as _;
use std::path::Path;

/// Manifest column names, in wire order.
///
/// The order is part of the external contract consumed by the indexing
/// service, which is why it is a fixed array and not something assembled
/// at runtime.
pub const MANIFEST_COLUMNS: [&str; 7] = ["guid", "file_name", "md5", "size", "acl", "authz", "urls"];

/// Render the complete manifest: a tab-separated header plus one line per
/// row in the given order, every line newline-terminated.
pub fn render(rows: &[ManifestRow]) -> String {
    let mut out = String::new();
    out.push_str(&MANIFEST_COLUMNS.join("\t"));
    out.push('\n');
    for row in rows {
        // write! to a String is infallible
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.guid, row.file_name, row.md5, row.size, row.acl, row.authz, row.urls
        );
    }
    out
}

/// Write the manifest to disk, creating parent directories as needed.
///
/// Called only once every row is known; the file is never created on a
/// partial result.
pub async fn write_manifest(path: &Path, rows: &[ManifestRow]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(ErrorKind::Io)?;
    }
    tokio::fs::write(path, render(rows)).await.map_err(ErrorKind::Io)?;
    Ok(())
}
