//! Shared result collection with first-write-wins inserts.
//!
//! The collection is the only state shared across workers. Mutual exclusion
//! covers just the insert/lookup boundary, never a worker's fetch loop, so
//! concurrent fetching is not serialized.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::record::CourseRecord;

/// ID-keyed record store shared by all workers of a run.
///
/// Grows monotonically and never shrinks. Cloning is cheap and every clone
/// refers to the same underlying map.
#[derive(Clone, Default)]
pub struct ResultCollection {
    inner: Arc<Mutex<BTreeMap<u32, CourseRecord>>>,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record unless one already exists for the ID.
    ///
    /// First write wins: a retry round racing a slow original worker can both
    /// produce a record for the same ID, and exactly one of them lands.
    /// Returns whether this call inserted the record.
    pub async fn insert(&self, record: CourseRecord) -> bool {
        let mut map = self.inner.lock().await;
        match map.entry(record.course_id) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(record);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub async fn contains(&self, course_id: u32) -> bool {
        self.inner.lock().await.contains_key(&course_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Gap detection: IDs of `[1, total]` with no record yet, in ascending
    /// order. Pure function of collection state.
    pub async fn missing_ids(&self, total: u32) -> Vec<u32> {
        let map = self.inner.lock().await;
        (1..=total).filter(|id| !map.contains_key(id)).collect()
    }

    /// Snapshot of all records in ascending ID order.
    pub async fn sorted_records(&self) -> Vec<CourseRecord> {
        self.inner.lock().await.values().cloned().collect()
    }
}
