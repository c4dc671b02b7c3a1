//! Distance metrics over (longitude, latitude) pairs in degrees.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CragError;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A distance function in meters between two coordinates.
///
/// Implementations must be symmetric and return 0 for identical points.
/// Any `Fn(lon1, lat1, lon2, lat2) -> f64` closure is a `Distance`.
pub trait Distance: Send + Sync {
    fn distance(&self, lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64;
}

impl<F> Distance for F
where
    F: Fn(f64, f64, f64, f64) -> f64 + Send + Sync,
{
    fn distance(&self, lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
        self(lon1, lat1, lon2, lat2)
    }
}

/// Great-circle distance on a spherical earth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Haversine;

impl Distance for Haversine {
    fn distance(&self, lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
        let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
        let dlat = (lat2 - lat1).to_radians();
        let dlon = (lon2 - lon1).to_radians();
        let s1 = (dlat / 2.0).sin();
        let s2 = (dlon / 2.0).sin();
        let h = s1 * s1 + phi1.cos() * phi2.cos() * s2 * s2;
        // Rounding can push h a hair above 1 for antipodal points.
        2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
    }
}

/// Equirectangular projection. Cheap and accurate at crag-cluster scales
/// (tens of kilometers), drifts for long distances and near the poles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Equirectangular;

impl Distance for Equirectangular {
    fn distance(&self, lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
        let mean_lat = ((lat1 + lat2) / 2.0).to_radians();
        let mut dlon = (lon2 - lon1).abs();
        if dlon > 180.0 {
            dlon = 360.0 - dlon;
        }
        let x = dlon.to_radians() * mean_lat.cos();
        let y = (lat2 - lat1).to_radians();
        EARTH_RADIUS_METERS * (x * x + y * y).sqrt()
    }
}

/// Metric selectable from configuration or the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Haversine,
    Equirectangular,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Haversine => "haversine",
            Self::Equirectangular => "equirectangular",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = CragError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "haversine" => Ok(Self::Haversine),
            "equirectangular" => Ok(Self::Equirectangular),
            other => Err(CragError::Config(format!("unknown metric: {}", other))),
        }
    }
}

impl Distance for Metric {
    fn distance(&self, lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
        match self {
            Self::Haversine => Haversine.distance(lon1, lat1, lon2, lat2),
            Self::Equirectangular => Equirectangular.distance(lon1, lat1, lon2, lat2),
        }
    }
}
