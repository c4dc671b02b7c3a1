//! Cragmap source crate - where climbing-area records come from.
//!
//! Provides the `RecordSource` trait and its implementations:
//! - `StaticSource` for records already in memory
//! - `FileSource` for a local JSON dump
//! - `CachedSource` for a remote dataset kept in a local cache file,
//!   re-fetched through a `PayloadFetcher` once the copy goes stale

pub mod cache;
pub mod fetch;
pub mod file;

use std::future::Future;

use cragmap_core::error::Result;
use cragmap_core::Record;

pub use cache::CachedSource;
pub use fetch::{HttpFetcher, MockFetcher, PayloadFetcher};
pub use file::FileSource;

/// Supplier of the current set of records.
///
/// Failures surface as `CragError::SourceUnavailable`, or as parse errors
/// when the payload arrives but cannot be read as records.
pub trait RecordSource: Send + Sync {
    fn get_records(&self) -> impl Future<Output = Result<Vec<Record>>> + Send;
}

/// Records held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<Record>,
}

impl StaticSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordSource for StaticSource {
    async fn get_records(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}
