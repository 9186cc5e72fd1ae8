//! Concurrent fetch-and-hash manifest pipeline.
//!
//! Turns a list of `s3://bucket/key` locations into a validated,
//! tab-separated manifest suitable for bulk registration into an index
//! service: parse and validate every address up front, fetch each object's
//! size and stream its bytes through an MD5 digest across a bounded worker
//! pool, then write the rows in input order. The run is all-or-nothing —
//! the first error aborts everything and no manifest file is produced.

pub mod address;
pub mod error;
pub mod hash;
pub mod row;
pub mod schedule;
pub mod write;

use crate::address::parse_addresses;
use crate::error::{ErrorKind, Result};
use crate::schedule::build_rows;
use crate::write::write_manifest;
use exn::ResultExt;
use skiff_storage::BackendHandle;
use std::path::PathBuf;

/// One manifest-generation run.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Text file with one S3 URI per line.
    pub input: PathBuf,
    /// Where the manifest TSV is written.
    pub output: PathBuf,
    /// Authz value applied uniformly to every row.
    pub authz: String,
    /// Worker pool size; must be at least 1.
    pub workers: usize,
    /// Discard the first non-blank input line unparsed.
    pub skip_header: bool,
}

/// Run the whole pipeline and return the number of rows written.
///
/// Phase order is part of the contract: the worker count is checked before
/// the input file is touched, parsing completes before any backend call,
/// and the output file is written only after every row is built.
pub async fn generate(backend: &BackendHandle, request: &GenerateRequest) -> Result<usize> {
    if request.workers < 1 {
        exn::bail!(ErrorKind::WorkerCount);
    }
    let input = tokio::fs::read_to_string(&request.input)
        .await
        .or_raise(|| ErrorKind::InputUnreadable(request.input.clone()))?;
    let addresses = parse_addresses(&input, request.skip_header)?;
    tracing::info!(backend = backend.name(), count = addresses.len(), workers = request.workers, "parsed object addresses");
    let rows = build_rows(backend, addresses, &request.authz, request.workers).await?;
    write_manifest(&request.output, &rows).await?;
    tracing::info!(path = %request.output.display(), rows = rows.len(), "wrote manifest");
    Ok(rows.len())
}
