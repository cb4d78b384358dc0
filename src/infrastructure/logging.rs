//! Logging initialization.
//!
//! Console output through a fmt layer with an `EnvFilter` (`RUST_LOG` wins
//! over the configured level), plus an optional non-blocking file layer. The
//! appender guard must stay alive for the process lifetime or buffered lines
//! are lost on exit.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use super::config::LoggingConfig;

static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Initialize the global subscriber. Call once, before any crawling starts.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console_layer = fmt::layer().with_target(false);

    let file_layer = if config.file_output {
        std::fs::create_dir_all(&config.log_dir)
            .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;
        let appender = rolling::never(&config.log_dir, "course-census.log");
        let (writer, guard) = non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        Some(fmt::layer().with_writer(writer).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging subscriber")?;

    Ok(())
}
