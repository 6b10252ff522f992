//! Error types for indexsim
//!
//! Construction is the only fallible phase of the simulator: device geometry
//! and index parameters are validated once, operations afterwards are plain
//! arithmetic and return times directly.

use thiserror::Error;

/// Result type alias using SimError
pub type Result<T> = std::result::Result<T, SimError>;

/// Unified error type for indexsim
#[derive(Debug, Error)]
pub enum SimError {
    // -------------------------------------------------------------------------
    // Construction Errors
    // -------------------------------------------------------------------------
    #[error("Invalid device geometry: {0}")]
    InvalidGeometry(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Operation Errors
    // -------------------------------------------------------------------------
    #[error("Bulkload is not supported by {index}")]
    BulkloadUnsupported { index: String },

    // -------------------------------------------------------------------------
    // Report Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Workload worker panicked: {0}")]
    WorkerPanic(String),
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Serialization(err.to_string())
    }
}
