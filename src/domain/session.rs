//! Session and fetch seams between the crawl engine and the LMS site.
//!
//! The engine only ever sees these traits; the reqwest-backed implementation
//! lives in `infrastructure::http_session`, and tests substitute scripted
//! providers to inject failures.

use async_trait::async_trait;
use thiserror::Error;

/// A fetched enrolment page plus the URL the request actually landed on.
///
/// The post-redirect URL matters: the site redirects visible courses to
/// `course/view.php`, which the classifier treats as a success signal.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub body: String,
}

#[derive(Error, Debug)]
pub enum SessionError {
    /// Login handshake or session acquisition failed. Worker-fatal: the whole
    /// assignment stays missing and the retry controller picks it up.
    #[error("authentication failed: {reason}")]
    Auth { reason: String },

    /// Transport failure for a single course ID. ID-local: the worker skips
    /// the ID and moves on.
    #[error("fetch failed for course {course_id}: {reason}")]
    Fetch { course_id: u32, reason: String },
}

impl SessionError {
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }

    pub fn fetch(course_id: u32, reason: impl Into<String>) -> Self {
        Self::Fetch {
            course_id,
            reason: reason.into(),
        }
    }
}

/// One authenticated session, owned by exactly one worker for its lifetime.
/// Never shared or pooled; dropped when the worker finishes its assignment.
#[async_trait]
pub trait CourseSession: Send {
    /// Fetch the enrolment page for one course ID.
    async fn fetch(&mut self, course_id: u32) -> Result<FetchedPage, SessionError>;
}

/// Produces authenticated sessions, one per worker per dispatch round.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn CourseSession>, SessionError>;
}
