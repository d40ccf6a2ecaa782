//! Tabular input/output: CSV through Arrow, feature column selection, and
//! prediction export.

mod csv;
mod error;
mod frame;

pub use csv::{read_csv, read_csv_from, to_csv_bytes, write_csv};
pub use error::StoreError;
pub use frame::{
    FeatureSelection, PREDICTION_COLUMN, PROBABILITY_COLUMN, augment, records_to_table,
    select_features, to_records,
};
