//! Core domain types: result records, the shared collection, and the
//! session/classification seams the crawl engine drives.

pub mod collection;
pub mod record;
pub mod session;

pub use collection::ResultCollection;
pub use record::{CourseRecord, CourseStatus};
pub use session::{CourseSession, FetchedPage, SessionError, SessionProvider};
