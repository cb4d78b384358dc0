//! The work-distribution and retry-until-complete orchestration layer.
//!
//! A run is a sequence of dispatch rounds. Each round partitions its input ID
//! list across workers, every worker owns one authenticated session and a
//! straight-line fetch/classify/append loop, and the retry controller keeps
//! re-dispatching whatever is still missing until the collection is complete
//! or the retry budget runs out.

pub mod controller;
pub mod dispatcher;
pub mod worker;

pub use controller::CrawlEngine;
pub use dispatcher::{dispatch, partition};
