//! Pipeline from a record source to a printable report.

use chrono::{DateTime, Utc};
use cragmap_core::error::{CragError, Result};
use cragmap_core::Metric;
use cragmap_insight::{summarize_all, AreaClusterer, AreaSummary};
use cragmap_source::RecordSource;
use serde::Serialize;

use crate::cli::OutputFormat;

/// Longest title shown in table output before truncation.
const MAX_TITLE_WIDTH: usize = 40;

/// Clustered view of the whole dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub radius_m: f64,
    pub metric: Metric,
    pub record_count: usize,
    pub areas: Vec<AreaSummary>,
}

/// Pull records, cluster them, and summarize every cluster.
pub async fn build_report<S: RecordSource>(
    source: &S,
    radius_m: f64,
    metric: Metric,
) -> Result<Report> {
    let records = source.get_records().await?;
    let record_count = records.len();

    let clusters = AreaClusterer::new(radius_m, metric)
        .cluster(records)
        .map_err(CragError::from)?;
    tracing::info!(
        records = record_count,
        clusters = clusters.len(),
        radius_m,
        %metric,
        "Clustering complete"
    );

    let areas = summarize_all(&clusters).map_err(CragError::from)?;

    Ok(Report {
        generated_at: Utc::now(),
        radius_m,
        metric,
        record_count,
        areas,
    })
}

impl Report {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Table => Ok(self.to_table()),
        }
    }

    fn to_table(&self) -> String {
        let title_width = self
            .areas
            .iter()
            .map(|a| a.title.chars().count().min(MAX_TITLE_WIDTH))
            .max()
            .unwrap_or(0)
            .max("AREA".len());

        let mut out = String::new();
        out.push_str(&format!(
            "{:>4}  {:<tw$}  {:>5}  {:>6}  {:>8}  {:>7}\n",
            "#",
            "AREA",
            "CRAGS",
            "ROUTES",
            "AVG POP",
            "MAX POP",
            tw = title_width
        ));
        for (i, area) in self.areas.iter().enumerate() {
            out.push_str(&format!(
                "{:>4}  {:<tw$}  {:>5}  {:>6}  {:>8.1}  {:>7}\n",
                i + 1,
                truncate(&area.title, MAX_TITLE_WIDTH),
                area.member_count,
                area.total_routes,
                area.average_popularity,
                area.max_popularity,
                tw = title_width
            ));
        }
        out.push_str(&format!(
            "{} records in {} areas (radius {} m, {})",
            self.record_count,
            self.areas.len(),
            self.radius_m,
            self.metric
        ));
        out
    }
}

fn truncate(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }
    let mut cut: String = title.chars().take(max - 1).collect();
    cut.push('~');
    cut
}
