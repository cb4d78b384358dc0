//! Binary entrypoint: load config, wire the engine, run, export.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use course_census::crawl_engine::CrawlEngine;
use course_census::infrastructure::export::export_csv;
use course_census::infrastructure::logging::init_logging;
use course_census::infrastructure::{AppConfig, MoodleSessionProvider, PageClassifier};

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(Path::new(&path)).await?,
        None => AppConfig::default(),
    };
    config.apply_env_overrides();
    config.validate()?;
    init_logging(&config.logging)?;

    info!(
        base_url = %config.site.base_url,
        total_courses = config.site.total_courses,
        workers = config.engine.worker_count,
        "starting course census"
    );

    let provider = Arc::new(MoodleSessionProvider::new(config.clone()));
    let classifier = Arc::new(PageClassifier::new()?);
    let engine = CrawlEngine::new(provider, classifier, config.engine.clone());

    let records = engine.run(config.site.total_courses).await;

    let output = PathBuf::from(&config.export.output_path);
    export_csv(&output, &records)?;
    info!(
        records = records.len(),
        output = %output.display(),
        "results exported"
    );

    Ok(())
}
