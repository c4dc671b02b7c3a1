pub mod config;
pub mod error;
pub mod geo;
pub mod types;

pub use config::CragConfig;
pub use error::{CragError, Result};
pub use geo::{Distance, Equirectangular, Haversine, Metric};
pub use types::*;
