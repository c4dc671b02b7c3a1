use cragmap_core::CragError;
use thiserror::Error;

/// Errors that can occur while clustering or summarizing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsightError {
    #[error("malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
    #[error("cannot summarize an empty cluster")]
    EmptyCluster,
}

impl From<InsightError> for CragError {
    fn from(err: InsightError) -> Self {
        match err {
            InsightError::MalformedRecord { index, reason } => {
                CragError::MalformedRecord { index, reason }
            }
            InsightError::EmptyCluster => CragError::EmptyCluster,
        }
    }
}
