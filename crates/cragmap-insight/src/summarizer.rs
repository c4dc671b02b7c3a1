//! Reduction of a cluster into an `AreaSummary`.

use cragmap_core::Record;

use crate::error::InsightError;
use crate::types::{AreaSummary, Cluster};

/// Summarize one group of records in a single pass.
///
/// The title comes from the most popular member. Only a strictly greater
/// popularity replaces the current title, so the earliest member wins ties.
/// Sums are kept in `i128`, so any mix of `i64` counts adds up exactly.
pub fn summarize(members: &[Record]) -> Result<AreaSummary, InsightError> {
    let (first, rest) = members.split_first().ok_or(InsightError::EmptyCluster)?;

    let mut total_routes = i128::from(first.total);
    let mut total_popularity = i128::from(first.popularity);
    let mut best = first;

    for rec in rest {
        total_routes += i128::from(rec.total);
        total_popularity += i128::from(rec.popularity);
        if rec.popularity > best.popularity {
            best = rec;
        }
    }

    Ok(AreaSummary {
        member_count: members.len(),
        total_routes,
        title: best.title.clone(),
        average_popularity: total_popularity as f64 / members.len() as f64,
        max_popularity: best.popularity,
    })
}

/// Summarize every cluster, preserving cluster order.
pub fn summarize_all(clusters: &[Cluster]) -> Result<Vec<AreaSummary>, InsightError> {
    clusters.iter().map(|c| summarize(c.members())).collect()
}
