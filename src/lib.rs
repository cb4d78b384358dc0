//! Course Census - concurrent course-ID enumeration for Moodle-style LMS sites
//!
//! Partitions a fixed course-ID space across concurrent workers, fetches one
//! enrolment page per ID through an authenticated session, classifies each page
//! into a result record, and re-dispatches whatever is still missing until the
//! collection is complete or the retry budget runs out.

pub mod crawl_engine;
pub mod domain;
pub mod infrastructure;
