//! Cragmap insight crate - spatial clustering and per-area summaries.
//!
//! Provides:
//! - Greedy anchor-based clustering of climbing-area records
//! - Per-cluster summaries (representative title, route count, popularity)
//!
//! Everything here is pure and synchronous. Logging and retries belong to
//! the caller.

pub mod cluster;
pub mod error;
pub mod summarizer;
pub mod types;

pub use cluster::AreaClusterer;
pub use error::InsightError;
pub use summarizer::{summarize, summarize_all};
pub use types::{AreaSummary, Cluster};
