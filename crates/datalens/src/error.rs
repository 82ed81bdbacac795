//! Error types for the Datalens library.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::{DrillDownError, ExecutionError};

/// Main error type for Datalens operations.
#[derive(Debug, Error)]
pub enum DatalensError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Dataset has no data rows; no profile can be produced.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Dataset has no columns; no profile can be produced.
    #[error("No columns: {0}")]
    NoColumns(String),

    /// Structured failure while executing an analysis.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Structured failure during drill-down analysis.
    #[error(transparent)]
    DrillDown(#[from] DrillDownError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for Datalens operations.
pub type Result<T> = std::result::Result<T, DatalensError>;
