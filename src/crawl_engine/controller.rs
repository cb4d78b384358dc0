//! Retry controller: the top-level state machine of a run.
//!
//! `Initial -> Dispatching -> GapCheck -> {Dispatching | Done}`. The first
//! round dispatches the full universe; every further round dispatches the
//! current gap with a worker count bounded by the gap size. Rounds are
//! bounded: once the budget is exhausted, still-missing IDs are recorded as
//! `Unresolved` so the export never silently drops an ID.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::domain::collection::ResultCollection;
use crate::domain::record::CourseRecord;
use crate::domain::session::SessionProvider;
use crate::infrastructure::classifier::PageClassifier;
use crate::infrastructure::config::EngineConfig;

use super::dispatcher::dispatch;

pub struct CrawlEngine {
    provider: Arc<dyn SessionProvider>,
    classifier: Arc<PageClassifier>,
    config: EngineConfig,
}

impl CrawlEngine {
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        classifier: Arc<PageClassifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            provider,
            classifier,
            config,
        }
    }

    /// Enumerate `[1, total_courses]` until every ID has a record, then return
    /// the records in ascending ID order.
    pub async fn run(&self, total_courses: u32) -> Vec<CourseRecord> {
        let collection = ResultCollection::new();
        let worker_timeout = Duration::from_secs(self.config.worker_timeout_secs);

        let universe: Vec<u32> = (1..=total_courses).collect();
        info!(
            total_courses,
            workers = self.config.worker_count,
            "dispatching full ID universe"
        );
        dispatch(
            Arc::clone(&self.provider),
            Arc::clone(&self.classifier),
            &collection,
            &universe,
            self.config.worker_count,
            worker_timeout,
        )
        .await;

        let mut round = 0u32;
        loop {
            let gap = collection.missing_ids(total_courses).await;
            if gap.is_empty() {
                info!(total_courses, "all course IDs recorded");
                break;
            }

            if round >= self.config.max_retry_rounds {
                warn!(
                    unresolved = gap.len(),
                    rounds = round,
                    "retry budget exhausted, recording remaining IDs as unresolved"
                );
                for course_id in gap {
                    collection
                        .insert(CourseRecord::unresolved(course_id, round))
                        .await;
                }
                break;
            }

            round += 1;
            let workers = self.config.worker_count.min(gap.len());
            info!(round, remaining = gap.len(), "retrying missing course IDs: {gap:?}");

            sleep(retry_backoff(round, self.config.retry_base_delay_ms)).await;
            dispatch(
                Arc::clone(&self.provider),
                Arc::clone(&self.classifier),
                &collection,
                &gap,
                workers,
                worker_timeout,
            )
            .await;
        }

        collection.sorted_records().await
    }
}

/// Exponential backoff between retry rounds, capped at 32x the base delay.
fn retry_backoff(round: u32, base_delay_ms: u64) -> Duration {
    Duration::from_millis(base_delay_ms * (1 << round.saturating_sub(1).min(5)))
}
