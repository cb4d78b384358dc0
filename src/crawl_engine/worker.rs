//! One worker: one session, one assignment, a straight-line loop.
//!
//! All retry policy lives in the controller; the worker never retries
//! anything. Its failure modes degrade to "these IDs are still missing":
//! session acquisition failure drops the whole assignment, a per-ID fetch
//! failure drops that ID.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::collection::ResultCollection;
use crate::domain::record::CourseRecord;
use crate::domain::session::SessionProvider;
use crate::infrastructure::classifier::PageClassifier;

pub(crate) async fn run_worker(
    slot: usize,
    provider: Arc<dyn SessionProvider>,
    classifier: Arc<PageClassifier>,
    collection: ResultCollection,
    assignment: Vec<u32>,
) {
    let mut session = match provider.acquire().await {
        Ok(session) => session,
        Err(e) => {
            // Worker-fatal, not process-fatal: the whole assignment stays
            // missing and the retry controller picks it up.
            warn!(
                worker = slot,
                pending = assignment.len(),
                "session acquisition failed: {e}"
            );
            return;
        }
    };

    for course_id in assignment {
        // A retry round may be re-dispatching an ID that a slow worker from an
        // earlier round already wrote. First write wins, so don't even fetch.
        if collection.contains(course_id).await {
            debug!(worker = slot, course_id, "already recorded, skipping");
            continue;
        }

        let page = match session.fetch(course_id).await {
            Ok(page) => page,
            Err(e) => {
                // ID-local failure: skip, no partial record, becomes a gap.
                warn!(worker = slot, course_id, "skipping: {e}");
                continue;
            }
        };

        let (status, detail) = classifier.classify(&page);
        info!(course_id, status = %status, "{detail}");

        if !collection.insert(CourseRecord::new(course_id, status, detail)).await {
            debug!(worker = slot, course_id, "lost first-write race, record kept as-is");
        }
    }

    debug!(worker = slot, "assignment finished, releasing session");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl_engine::testing::ScriptedProvider;
    use crate::domain::record::CourseStatus;

    fn classifier() -> Arc<PageClassifier> {
        Arc::new(PageClassifier::new().unwrap())
    }

    #[tokio::test]
    async fn auth_failure_appends_nothing() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.fail_first_acquires(1);
        let collection = ResultCollection::new();

        run_worker(
            0,
            provider.clone(),
            classifier(),
            collection.clone(),
            (1..=5).collect(),
        )
        .await;

        assert!(collection.is_empty().await);
        assert_eq!(collection.missing_ids(5).await, vec![1, 2, 3, 4, 5]);
        // It never got as far as fetching.
        assert_eq!(provider.fetch_count(1), 0);
    }

    #[tokio::test]
    async fn fetch_failure_skips_only_that_id() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.fail_fetch_times(3, 1);
        let collection = ResultCollection::new();

        run_worker(
            0,
            provider,
            classifier(),
            collection.clone(),
            (1..=5).collect(),
        )
        .await;

        assert_eq!(collection.len().await, 4);
        assert_eq!(collection.missing_ids(5).await, vec![3]);
    }

    #[tokio::test]
    async fn already_recorded_ids_are_not_refetched() {
        let provider = Arc::new(ScriptedProvider::new());
        let collection = ResultCollection::new();
        collection
            .insert(CourseRecord::new(2, CourseStatus::Success, "earlier round"))
            .await;

        run_worker(
            0,
            provider.clone(),
            classifier(),
            collection.clone(),
            vec![1, 2, 3],
        )
        .await;

        assert_eq!(provider.fetch_count(2), 0);
        let records = collection.sorted_records().await;
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].detail, "earlier round");
    }

    #[tokio::test]
    async fn classified_pages_become_records() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.serve_error_page(2);
        provider.serve_blank_page(3);
        let collection = ResultCollection::new();

        run_worker(0, provider, classifier(), collection.clone(), vec![1, 2, 3]).await;

        let records = collection.sorted_records().await;
        assert_eq!(records[0].status, CourseStatus::Success);
        assert_eq!(records[0].detail, "Course 1");
        assert_eq!(records[1].status, CourseStatus::Error);
        assert_eq!(records[2].status, CourseStatus::NoContent);
    }
}
