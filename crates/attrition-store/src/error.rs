use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("CSV file not found: {0}")]
    CsvNotFound(PathBuf),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    #[error("column {column}, row {row}: {reason}")]
    InvalidCell {
        column: String,
        /// 1-based data row, header excluded.
        row: usize,
        reason: String,
    },

    #[error("{predictions} predictions for {rows} rows")]
    LengthMismatch { rows: usize, predictions: usize },

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
