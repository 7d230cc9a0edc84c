//! Error types for staysync.

use thiserror::Error;

/// Errors that abort a sync run.
///
/// Data-quality problems in destination rows and ambiguous matches are not
/// errors: they are logged and the run continues.
#[derive(Error, Debug)]
pub enum StaySyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar feed error: {0}")]
    Feed(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Destination error: {0}")]
    Destination(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StaySyncError {
    fn from(e: serde_json::Error) -> Self {
        StaySyncError::Serialization(e.to_string())
    }
}

/// Result type alias for staysync operations.
pub type StaySyncResult<T> = Result<T, StaySyncError>;
