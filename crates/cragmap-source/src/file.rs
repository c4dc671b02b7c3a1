use std::path::{Path, PathBuf};

use cragmap_core::error::{CragError, Result};
use cragmap_core::{parse_records, Record};

use crate::RecordSource;

/// Reads records from a local JSON file in the upstream format.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for FileSource {
    async fn get_records(&self) -> Result<Vec<Record>> {
        let payload = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CragError::SourceUnavailable(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        let records = parse_records(&payload)?;
        tracing::info!(
            path = %self.path.display(),
            count = records.len(),
            "Records loaded from file"
        );
        Ok(records)
    }
}
