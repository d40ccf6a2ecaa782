//! Manual single-employee prediction.

use std::path::Path;

use anyhow::Context;
use attrition_ai::Predictor;
use attrition_core::{Prediction, Record};
use tracing::debug;

use crate::display;

/// Build a record from the manual-entry defaults, an optional JSON record
/// file, and `Name=Value` assignments, applied in that order.
pub fn build_record(assignments: &[String], record_file: Option<&Path>) -> anyhow::Result<Record> {
    let mut record = Record::manual_defaults();

    if let Some(path) = record_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading record {}", path.display()))?;
        let overlay: Record = serde_json::from_str(&text)
            .with_context(|| format!("parsing record {}", path.display()))?;
        record.merge(overlay)?;
    }

    for assignment in assignments {
        record.assign(assignment)?;
    }

    record.validate()?;
    Ok(record)
}

pub fn run_predict(
    predictor: &mut Predictor,
    assignments: &[String],
    record_file: Option<&Path>,
    json: bool,
) -> anyhow::Result<Prediction> {
    let record = build_record(assignments, record_file)?;
    debug!(fields = record.len(), "manual record built");

    let prediction = predictor.predict_one(&record)?;
    display::print_prediction(&prediction, json)?;
    Ok(prediction)
}
