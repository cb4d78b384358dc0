//! Infrastructure: configuration, logging, the reqwest-backed session
//! provider, the scraper-backed page classifier, and the CSV sink.

pub mod classifier;
pub mod config;
pub mod export;
pub mod http_session;
pub mod logging;

pub use classifier::PageClassifier;
pub use config::AppConfig;
pub use http_session::MoodleSessionProvider;
