//! Core types for attrition scoring: feature catalogue, raw records, and
//! category tables.

pub mod error;
pub mod features;
pub mod prediction;
pub mod record;
pub mod vocab;

pub use error::{RecordError, VocabularyError};
pub use features::{CATEGORICAL_FEATURES, FEATURES, FieldKind, FieldSpec};
pub use prediction::{Outcome, Prediction};
pub use record::{Record, Value};
pub use vocab::{CategoryMapping, CategoryTable, Code, VOCABULARY_VERSION};
