//! Application configuration.
//!
//! Serde-backed sections with per-section defaults, loaded from a JSON file
//! when one is given. Credentials are never expected to live in the file on
//! shared machines; `COURSE_CENSUS_USERNAME` / `COURSE_CENSUS_PASSWORD`
//! override whatever the file holds.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tokio::fs;

pub const USERNAME_ENV: &str = "COURSE_CENSUS_USERNAME";
pub const PASSWORD_ENV: &str = "COURSE_CENSUS_PASSWORD";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub credentials: Credentials,
    pub engine: EngineConfig,
    pub request: RequestConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Target site and the size of the ID universe to enumerate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL of the LMS instance.
    pub base_url: String,

    /// Course IDs `1..=total_courses` are enumerated.
    pub total_courses: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://scele.cs.ui.ac.id".to_string(),
            total_courses: 4096,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Dispatch and retry behaviour of the crawl engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Baseline worker count; retry rounds use `min(worker_count, gap size)`.
    pub worker_count: usize,

    /// Retry rounds after the initial dispatch before IDs are marked
    /// `Unresolved`.
    pub max_retry_rounds: u32,

    /// Base delay before the first retry round; doubles each round, capped.
    pub retry_base_delay_ms: u64,

    /// Wall-clock budget for one worker's whole assignment. A stalled worker
    /// is abandoned and its unfinished IDs become gaps.
    pub worker_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: 8,
            max_retry_rounds: 5,
            retry_base_delay_ms: 1000,
            worker_timeout_secs: 300,
        }
    }
}

/// HTTP client behaviour for every session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_requests_per_second: u32,

    /// Login handshake attempts before acquisition counts as failed. The site
    /// sometimes bounces a correct login back to the login form once.
    pub login_max_attempts: u32,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            user_agent: "course-census/0.2 (Educational Purpose)".to_string(),
            timeout_seconds: 30,
            max_requests_per_second: 5,
            login_max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Path of the exported CSV.
    pub output_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: "courses_results.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set.
    pub level: String,

    /// Also write logs to `<log_dir>/course-census.log`.
    pub file_output: bool,

    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_output: false,
            log_dir: "logs".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Credentials from the environment take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(username) = std::env::var(USERNAME_ENV) {
            self.credentials.username = username;
        }
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            self.credentials.password = password;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.site.total_courses == 0 {
            bail!("site.total_courses must be at least 1");
        }
        if self.engine.worker_count == 0 {
            bail!("engine.worker_count must be at least 1");
        }
        if self.request.max_requests_per_second == 0 {
            bail!("request.max_requests_per_second must be at least 1");
        }
        if self.credentials.username.is_empty() || self.credentials.password.is_empty() {
            bail!("credentials are required (set {USERNAME_ENV} and {PASSWORD_ENV})");
        }
        Ok(())
    }
}
