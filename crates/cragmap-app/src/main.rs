//! cragmap binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize logging (stderr, so stdout only carries the report)
//! 3. Build the record source (local file, or cached remote dataset)
//! 4. Cluster, summarize and print the report

mod cli;
mod report;

use std::time::Duration;

use clap::Parser;
use cragmap_core::config::CragConfig;
use cragmap_core::error::{CragError, Result};
use cragmap_core::Record;
use cragmap_source::{CachedSource, FileSource, HttpFetcher, RecordSource};
use tracing_subscriber::EnvFilter;

use crate::cli::CliArgs;

/// The concrete sources the binary can run against.
enum AppSource {
    File(FileSource),
    Remote(CachedSource<HttpFetcher>),
}

impl RecordSource for AppSource {
    async fn get_records(&self) -> Result<Vec<Record>> {
        match self {
            AppSource::File(source) => source.get_records().await,
            AppSource::Remote(source) => source.get_records().await,
        }
    }
}

fn build_source(args: &CliArgs, config: &CragConfig) -> Result<AppSource> {
    if let Some(ref path) = args.input {
        return Ok(AppSource::File(FileSource::new(path)));
    }

    let source_cfg = &config.source;
    let fetcher = HttpFetcher::new(
        source_cfg.url.clone(),
        Duration::from_secs(source_cfg.timeout_secs),
    )?;
    let max_age = match source_cfg.max_age_hours {
        0 => None,
        hours => Some(Duration::from_secs(hours * 3600)),
    };
    let cache_path = source_cfg.resolved_cache_path();
    tracing::debug!(path = %cache_path.display(), ?max_age, "Using dataset cache");

    Ok(AppSource::Remote(
        CachedSource::new(fetcher, cache_path)
            .with_max_age(max_age)
            .with_force_refresh(args.refresh),
    ))
}

fn init_tracing(cli_level: Option<String>, config_level: &str) {
    // --log-level beats RUST_LOG, which beats the config file.
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing exists so its log level can apply.
    let config_file = args.resolve_config_path();
    let loaded = CragConfig::load(&config_file);
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_tracing(args.resolve_log_level(), &config.general.log_level);

    tracing::info!("Starting cragmap v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Ok(_) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Err(CragError::Io(ref e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %config_file.display(), "No config file, using defaults")
        }
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config. Using defaults."
        ),
    }

    let radius_m = args.resolve_radius(config.cluster.radius_m);
    let metric = args.resolve_metric(config.cluster.metric);
    let source = build_source(&args, &config)?;

    let report = match report::build_report(&source, radius_m, metric).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build report");
            return Err(e.into());
        }
    };

    println!("{}", report.render(args.format)?);
    Ok(())
}
