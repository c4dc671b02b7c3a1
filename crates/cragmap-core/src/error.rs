use thiserror::Error;

/// Top-level error type for cragmap.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for CragError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CragError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("Record source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Cannot summarize an empty cluster")]
    EmptyCluster,
}

impl CragError {
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        CragError::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for CragError {
    fn from(err: toml::de::Error) -> Self {
        CragError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CragError {
    fn from(err: toml::ser::Error) -> Self {
        CragError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CragError {
    fn from(err: serde_json::Error) -> Self {
        CragError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for cragmap operations.
pub type Result<T> = std::result::Result<T, CragError>;
