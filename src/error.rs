//! Error types for the delay_forecast crate

use thiserror::Error;

/// Custom error types for the delay_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Requested airport has no rows in the dataset
    #[error("Airport not found: {0}")]
    NotFound(String),

    /// Series too short to attempt any model fit
    #[error("Insufficient history: {len} observations, need at least {min}")]
    InsufficientHistory { len: usize, min: usize },

    /// Model name not present in the candidate catalog
    #[error("Unknown model name: {0}")]
    UnknownModel(String),

    /// Every catalog candidate failed last-point validation
    #[error("All ARIMA candidates failed: {0}")]
    AllCandidatesFailed(String),

    /// Refit on the full series failed after a candidate validated
    #[error("Model fit failed: {0}")]
    Fit(String),

    /// Error from invalid parameters or out-of-range arguments
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error related to data loading or shape
    #[error("Data error: {0}")]
    Data(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
