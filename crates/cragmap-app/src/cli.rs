//! CLI argument definitions for the cragmap binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, ValueEnum};
use cragmap_core::Metric;
use std::path::PathBuf;

/// Group climbing areas into nearby clusters and summarize each one.
#[derive(Parser, Debug)]
#[command(name = "cragmap", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Cluster radius in meters. Zero or negative disables merging.
    #[arg(short = 'r', long = "radius", allow_negative_numbers = true)]
    pub radius: Option<f64>,

    /// Distance metric: haversine or equirectangular.
    #[arg(short = 'm', long = "metric")]
    pub metric: Option<Metric>,

    /// Read records from a local JSON file instead of the cached dataset.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Ignore the local cache and fetch the dataset again.
    #[arg(long = "refresh")]
    pub refresh: bool,

    /// Output format.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > CRAGMAP_CONFIG env var > ~/.cragmap/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CRAGMAP_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the cluster radius.
    ///
    /// Priority: --radius flag > CRAGMAP_RADIUS env var > config file value.
    pub fn resolve_radius(&self, config_radius: f64) -> f64 {
        self.radius_with_env(std::env::var("CRAGMAP_RADIUS").ok(), config_radius)
    }

    fn radius_with_env(&self, env: Option<String>, config_radius: f64) -> f64 {
        if let Some(r) = self.radius {
            return r;
        }
        env.and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(config_radius)
    }

    /// Resolve the distance metric.
    ///
    /// Priority: --metric flag > CRAGMAP_METRIC env var > config file value.
    pub fn resolve_metric(&self, config_metric: Metric) -> Metric {
        self.metric_with_env(std::env::var("CRAGMAP_METRIC").ok(), config_metric)
    }

    fn metric_with_env(&self, env: Option<String>, config_metric: Metric) -> Metric {
        if let Some(m) = self.metric {
            return m;
        }
        env.and_then(|v| v.parse::<Metric>().ok())
            .unwrap_or(config_metric)
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    /// Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".cragmap").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".cragmap").join("config.toml");
    }
    PathBuf::from("config.toml")
}
