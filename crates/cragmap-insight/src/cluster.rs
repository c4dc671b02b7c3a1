//! Greedy spatial clustering against fixed anchors.

use cragmap_core::{Distance, Metric, Record};

use crate::error::InsightError;
use crate::types::Cluster;

/// Default anchor radius, in meters.
pub const DEFAULT_RADIUS_M: f64 = 30_000.0;

/// Groups records into areas no further than `radius_m` from an anchor.
///
/// Records are visited in input order. Each one joins the first existing
/// cluster (in creation order) whose anchor is strictly closer than the
/// radius, or else starts a new cluster and becomes its anchor. Anchors are
/// never recomputed, so the outcome depends on input order: this is not
/// single-linkage or centroid clustering.
pub struct AreaClusterer<D = Metric> {
    radius_m: f64,
    distance: D,
}

impl AreaClusterer<Metric> {
    pub fn new(radius_m: f64, metric: Metric) -> Self {
        Self::with_distance(radius_m, metric)
    }
}

impl<D: Distance> AreaClusterer<D> {
    /// Cluster with an arbitrary distance function.
    pub fn with_distance(radius_m: f64, distance: D) -> Self {
        Self { radius_m, distance }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Partition `records` into clusters, in order of anchor creation.
    ///
    /// A radius that is zero, negative or NaN merges nothing: every record
    /// becomes a singleton. Fails on the first record with non-finite
    /// coordinates.
    pub fn cluster<I>(&self, records: I) -> Result<Vec<Cluster>, InsightError>
    where
        I: IntoIterator<Item = Record>,
    {
        let merging = self.radius_m > 0.0;
        let mut clusters: Vec<Cluster> = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            check_coordinates(index, &record)?;

            let home = if merging {
                clusters
                    .iter()
                    .position(|c| self.within_radius(&record, c.anchor()))
            } else {
                None
            };

            match home {
                Some(i) => clusters[i].push(record),
                None => clusters.push(Cluster::new(record)),
            }
        }

        Ok(clusters)
    }

    fn within_radius(&self, record: &Record, anchor: &Record) -> bool {
        let d = self.distance.distance(
            record.longitude,
            record.latitude,
            anchor.longitude,
            anchor.latitude,
        );
        // Strict: a record exactly at the radius does not join.
        d < self.radius_m
    }
}

impl Default for AreaClusterer<Metric> {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS_M, Metric::Haversine)
    }
}

fn check_coordinates(index: usize, record: &Record) -> Result<(), InsightError> {
    let reason = if !record.longitude.is_finite() {
        "non-finite longitude"
    } else if !record.latitude.is_finite() {
        "non-finite latitude"
    } else {
        return Ok(());
    };
    Err(InsightError::MalformedRecord {
        index,
        reason: reason.to_string(),
    })
}
