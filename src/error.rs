//! Error types for telofish

use thiserror::Error;

/// Main error type for cohort-assembly operations
#[derive(Error, Debug)]
pub enum TeloError {
    #[error("Could not read source table '{label}': {reason}")]
    SourceUnreadable { label: String, reason: String },

    #[error("No canonical timepoint matches label '{label}'")]
    NoTimepointMatch { label: String },

    #[error("Invalid calibration table: {reason}")]
    InvalidCalibration { reason: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for cohort-assembly operations
pub type Result<T> = std::result::Result<T, TeloError>;
