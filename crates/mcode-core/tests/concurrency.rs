//! Concurrent use of shared services.
//!
//! Services are shared across tasks. Concurrent writes to the same
//! value-set are not serialized: each submits its own transaction based
//! on the same cached original.

mod common;

use common::Harness;
use mcode_model::ContentHash;
use mcode_test_utils::ids;
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_each_submit() {
    let h = Harness::as_domain(ids::D1);
    let writes = Arc::new(h.writes.clone());

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let writes = Arc::clone(&writes);
            tokio::spawn(async move {
                writes
                    .update_domain_manual_value(ids::ITERATION, "ed2.scalar1", &n.to_string())
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("task panicked").expect("write accepted");
    }

    let written = h.writer.written();
    assert_eq!(written.len(), 16);

    let bases: HashSet<Option<ContentHash>> =
        written.iter().map(|c| c.operations[0].base_hash).collect();
    assert_eq!(bases.len(), 1, "every write is based on the same original");

    let container_ids: HashSet<_> = written.iter().map(|c| c.id).collect();
    assert_eq!(container_ids.len(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reads_share_one_index() {
    let h = Harness::as_domain(ids::D2);
    let reads = Arc::new(h.reads.clone());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let reads = Arc::clone(&reads);
            tokio::spawn(async move { reads.domain_computed_value(ids::ITERATION, "ed2.scalar1") })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.expect("task panicked").expect("read"), "2");
    }
    assert!(reads.resolver().index().is_loaded(ids::ITERATION));
}
