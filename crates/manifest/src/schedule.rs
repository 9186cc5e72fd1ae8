//! Bounded, order-preserving, fail-fast row building.
//!
//! One task per address, gated by a semaphore with `workers` permits.
//! Each task is tagged with its submission index and writes exactly one
//! result slot, so the final row order equals input line order no matter
//! which tasks finish first. The first failure wins: a shared latch stops
//! tasks that have not yet started, and tasks still in flight are aborted
//! when the set is dropped on the error return path.

use crate::address::ObjectAddress;
use crate::error::{ErrorKind, Result};
use crate::row::{ManifestRow, build_row};
use exn::{OptionExt, ResultExt};
use skiff_storage::BackendHandle;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Build one manifest row per address across a bounded worker pool.
///
/// `workers == 1` runs strictly sequentially in input order and is the
/// reference semantics for the concurrent path. Each address gets exactly
/// one attempt; there are no retries and no timeouts.
pub async fn build_rows(
    backend: &BackendHandle,
    addresses: Vec<ObjectAddress>,
    authz: &str,
    workers: usize,
) -> Result<Vec<ManifestRow>> {
    if workers < 1 {
        exn::bail!(ErrorKind::WorkerCount);
    }
    if workers == 1 {
        let mut rows = Vec::with_capacity(addresses.len());
        for address in &addresses {
            rows.push(build_row(backend, address, authz).await?);
        }
        return Ok(rows);
    }

    let mut slots: Vec<Option<ManifestRow>> = vec![None; addresses.len()];
    let semaphore = Arc::new(Semaphore::new(workers));
    let failed = Arc::new(AtomicBool::new(false));
    let mut tasks = JoinSet::new();
    for (index, address) in addresses.into_iter().enumerate() {
        let backend = Arc::clone(backend);
        let authz = authz.to_owned();
        let semaphore = Arc::clone(&semaphore);
        let failed = Arc::clone(&failed);
        tasks.spawn(async move {
            // unwrap is safe: semaphore is never closed
            let _permit = semaphore.acquire_owned().await.unwrap();
            if failed.load(Ordering::Acquire) {
                // A sibling already failed; this fetch never starts.
                return (index, None);
            }
            let result = build_row(&backend, &address, &authz).await;
            if result.is_err() {
                failed.store(true, Ordering::Release);
            }
            (index, Some(result))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined.or_raise(|| ErrorKind::Unexpected("row builder task panicked".to_string()))?;
        match outcome {
            Some(Ok(row)) => slots[index] = Some(row),
            // First failure wins. Dropping `tasks` here aborts anything
            // still in flight at its next await point.
            Some(Err(error)) => return Err(error),
            None => {},
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.ok_or_raise(|| ErrorKind::Unexpected("manifest row slot left unfilled".to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_addresses;
    use rstest::rstest;
    use skiff_storage::backend::MockBackend;
    use std::time::Duration;

    #[tokio::test]
    async fn test_zero_workers_rejected_before_any_backend_call() {
        let backend = MockBackend::with_objects([("b", "k", b"data".to_vec())]);
        let stats = Arc::new(backend);
        let handle: BackendHandle = stats.clone();
        let addresses = parse_addresses("s3://b/k", false).unwrap();
        let err = build_rows(&handle, addresses, "/p", 0).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::WorkerCount));
        assert_eq!(stats.stat_calls(), 0);
        assert_eq!(stats.stream_calls(), 0);
    }

    #[rstest]
    #[case::sequential(1)]
    #[case::concurrent(4)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_row_order_matches_input_order_under_latency(#[case] workers: usize) {
        // The first object is the slowest, so completion order inverts
        // input order when running concurrently.
        let backend = MockBackend::with_objects([
            ("b", "dir/a.txt", b"aaa".to_vec()),
            ("b", "dir/b.txt", b"bb".to_vec()),
            ("b", "dir/c.txt", b"c".to_vec()),
        ])
        .with_latency("b", "dir/a.txt", Duration::from_millis(80))
        .with_latency("b", "dir/b.txt", Duration::from_millis(40))
        .into_handle();
        let addresses = parse_addresses("s3://b/dir/a.txt\ns3://b/dir/b.txt\ns3://b/dir/c.txt", false).unwrap();
        let rows = build_rows(&backend, addresses, "/p", workers).await.unwrap();
        let names: Vec<_> = rows.iter().map(|row| row.file_name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "c.txt"]);
        let sizes: Vec<_> = rows.iter().map(|row| row.size).collect();
        assert_eq!(sizes, [3, 2, 1]);
    }

    #[rstest]
    #[case::sequential(1)]
    #[case::concurrent(3)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_first_failure_aborts_the_run(#[case] workers: usize) {
        let backend = MockBackend::with_objects([
            ("b", "ok1.txt", b"1".to_vec()),
            ("b", "ok2.txt", b"2".to_vec()),
        ])
        .fail_stat("b", "bad.txt", "AccessDenied")
        .into_handle();
        let addresses = parse_addresses("s3://b/ok1.txt\ns3://b/bad.txt\ns3://b/ok2.txt", false).unwrap();
        let err = build_rows(&backend, addresses, "/p", workers).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fetch { line: 2, .. }));
        assert!(err.to_string().contains("AccessDenied"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_duplicate_addresses_fetched_independently() {
        let backend = MockBackend::with_objects([("b", "k.txt", b"payload".to_vec())]);
        let stats = Arc::new(backend);
        let handle: BackendHandle = stats.clone();
        let addresses = parse_addresses("s3://b/k.txt\ns3://b/k.txt", false).unwrap();
        let rows = build_rows(&handle, addresses, "/p", 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], rows[1]);
        // No dedup: each duplicate costs its own stat and stream.
        assert_eq!(stats.stat_calls(), 2);
        assert_eq!(stats.stream_calls(), 2);
    }
}
