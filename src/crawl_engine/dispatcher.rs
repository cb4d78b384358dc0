//! ID-list partitioning and concurrent worker fan-out.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::domain::collection::ResultCollection;
use crate::domain::session::SessionProvider;
use crate::infrastructure::classifier::PageClassifier;

use super::worker;

/// Split an ordered, duplicate-free ID list into contiguous-in-list-order,
/// near-equal assignments.
///
/// The last assignment absorbs the remainder, so the union of all assignments
/// is exactly the input. Fewer IDs than workers degrades to one ID per worker;
/// an empty assignment is never produced.
pub fn partition(ids: &[u32], worker_count: usize) -> Vec<Vec<u32>> {
    if ids.is_empty() || worker_count == 0 {
        return Vec::new();
    }

    let workers = worker_count.min(ids.len());
    let per_worker = ids.len() / workers;

    (0..workers)
        .map(|slot| {
            let start = slot * per_worker;
            let end = if slot == workers - 1 {
                ids.len()
            } else {
                start + per_worker
            };
            ids[start..end].to_vec()
        })
        .collect()
}

/// Run one dispatch round: partition `ids`, spawn one worker per assignment,
/// and wait for every worker to stop.
///
/// Failures never cross worker boundaries. A worker that exceeds
/// `worker_timeout` is abandoned and a worker that panics is logged; either
/// way its unfinished IDs simply stay missing for the next retry round.
pub async fn dispatch(
    provider: Arc<dyn SessionProvider>,
    classifier: Arc<PageClassifier>,
    collection: &ResultCollection,
    ids: &[u32],
    worker_count: usize,
    worker_timeout: Duration,
) {
    let assignments = partition(ids, worker_count);
    if assignments.is_empty() {
        return;
    }

    debug!(
        ids = ids.len(),
        workers = assignments.len(),
        "dispatching assignments"
    );

    let handles: Vec<_> = assignments
        .into_iter()
        .enumerate()
        .map(|(slot, assignment)| {
            let provider = Arc::clone(&provider);
            let classifier = Arc::clone(&classifier);
            let collection = collection.clone();
            tokio::spawn(async move {
                let run = worker::run_worker(slot, provider, classifier, collection, assignment);
                if tokio::time::timeout(worker_timeout, run).await.is_err() {
                    warn!(worker = slot, "worker timed out, unfinished IDs stay missing");
                }
            })
        })
        .collect();

    for (slot, joined) in join_all(handles).await.into_iter().enumerate() {
        if let Err(e) = joined {
            warn!(worker = slot, "worker aborted: {e}");
        }
    }
}
