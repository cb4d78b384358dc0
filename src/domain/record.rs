//! Result record types for classified course pages.

use serde::{Deserialize, Serialize};

/// Terminal classification of one course ID.
///
/// Every ID in the universe ends up with exactly one of these. `NoContent` is a
/// valid outcome (the page matched none of the recognized shapes), distinct
/// from a missing record, which stays in the gap and gets retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseStatus {
    /// Course page found; detail carries the course name.
    Success,
    /// The site rendered a fatal error box; detail carries its message.
    Error,
    /// Page fetched but no error box and no course header.
    NoContent,
    /// Still missing after the retry budget was exhausted.
    Unresolved,
}

impl CourseStatus {
    /// Label used in the exported CSV and per-ID log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
            Self::NoContent => "No course",
            Self::Unresolved => "Unresolved",
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified course ID. Created exactly once per ID, immutable after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course_id: u32,
    pub status: CourseStatus,
    pub detail: String,
}

impl CourseRecord {
    pub fn new(course_id: u32, status: CourseStatus, detail: impl Into<String>) -> Self {
        Self {
            course_id,
            status,
            detail: detail.into(),
        }
    }

    /// Record for an ID that never resolved within the retry budget.
    pub fn unresolved(course_id: u32, rounds: u32) -> Self {
        Self::new(
            course_id,
            CourseStatus::Unresolved,
            format!("no record after {rounds} retry rounds"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_match_export_format() {
        assert_eq!(CourseStatus::Success.as_str(), "Success");
        assert_eq!(CourseStatus::Error.as_str(), "Error");
        assert_eq!(CourseStatus::NoContent.as_str(), "No course");
        assert_eq!(CourseStatus::Unresolved.as_str(), "Unresolved");
    }

    #[test]
    fn unresolved_record_names_the_budget() {
        let record = CourseRecord::unresolved(42, 5);
        assert_eq!(record.course_id, 42);
        assert_eq!(record.status, CourseStatus::Unresolved);
        assert!(record.detail.contains("5 retry rounds"));
    }
}
