use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    #[error("expected NAME=VALUE, got {0:?}")]
    MalformedAssignment(String),

    #[error("{feature}: {value:?} is not a number")]
    NotNumeric { feature: String, value: String },

    #[error("{feature}: {value} is not a whole number")]
    NotWhole { feature: String, value: f64 },

    #[error("{feature}: {value} is outside {min}..={max}")]
    OutOfRange {
        feature: String,
        value: f64,
        min: i64,
        max: i64,
    },
}

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("reading vocabulary {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("vocabulary JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported vocabulary version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("vocabulary lists {0:?}, which is not a categorical feature")]
    NotCategorical(String),

    #[error("vocabulary for {feature} lists {value:?} more than once")]
    DuplicateValue { feature: String, value: String },
}
