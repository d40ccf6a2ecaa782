//! Uploaded tables: feature column selection, conversion to records, and the
//! prediction-augmented export.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Builder, StringArray, StringBuilder};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use attrition_core::features::{self, FEATURES, FieldKind};
use attrition_core::{Prediction, Record, Value};
use tracing::{debug, warn};

use crate::StoreError;

/// Label column appended to scored tables.
pub const PREDICTION_COLUMN: &str = "Prediction";
/// Positive-class probability column appended to scored tables.
pub const PROBABILITY_COLUMN: &str = "Resignation_Probability";

/// Catalogue columns of an uploaded table.
pub struct FeatureSelection {
    /// Exactly the catalogue columns, in training order.
    pub table: RecordBatch,
    /// Columns of the upload that are not model features.
    pub dropped: Vec<String>,
}

/// Project an uploaded table onto the model's feature columns.
///
/// Fails with [`StoreError::MissingFeatures`] when any catalogue column is
/// absent. Columns outside the catalogue are dropped with a warning.
pub fn select_features(batch: &RecordBatch) -> Result<FeatureSelection, StoreError> {
    let schema = batch.schema();

    let missing: Vec<String> = features::feature_names()
        .filter(|name| schema.index_of(name).is_err())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(StoreError::MissingFeatures(missing));
    }

    let dropped: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .filter(|name| features::field(name).is_none())
        .collect();
    if !dropped.is_empty() {
        warn!(dropped = ?dropped, "dropping columns not used by the model");
    }

    let indices = features::feature_names()
        .map(|name| schema.index_of(name))
        .collect::<Result<Vec<_>, _>>()?;
    let table = batch.project(&indices)?;
    debug!(columns = table.num_columns(), rows = table.num_rows(), "selected feature columns");

    Ok(FeatureSelection { table, dropped })
}

/// Convert a feature table into raw records, one per row.
///
/// Numeric features must hold a number in every row. Categorical features
/// keep numeric cells as numbers and everything else as text; an empty cell
/// becomes empty text, which no established mapping contains, whatever type
/// the column was read as.
pub fn to_records(batch: &RecordBatch) -> Result<Vec<Record>, StoreError> {
    let schema = batch.schema();
    let mut records = vec![Record::new(); batch.num_rows()];

    for (field, col) in schema.fields().iter().zip(batch.columns()) {
        let name = field.name();
        let values = if !features::is_categorical(name) {
            numeric_cells(name, col)?
        } else if col.data_type().is_numeric() {
            coded_cells(col)?
        } else {
            text_cells(col)?
        };
        for (record, value) in records.iter_mut().zip(values) {
            record.insert(name.as_str(), value);
        }
    }

    Ok(records)
}

fn numeric_cells(name: &str, col: &ArrayRef) -> Result<Vec<Value>, StoreError> {
    let as_float = cast(col.as_ref(), &DataType::Float64)?;
    let floats = as_float
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| invalid(name, 0, "column does not cast to Float64"))?;

    (0..floats.len())
        .map(|row| {
            if col.is_null(row) {
                Err(invalid(name, row, "missing value"))
            } else if floats.is_null(row) {
                let raw = array_value_to_string(col.as_ref(), row).unwrap_or_default();
                Err(invalid(name, row, &format!("{raw:?} is not a number")))
            } else {
                Ok(Value::Number(floats.value(row)))
            }
        })
        .collect()
}

/// Categorical column read as numbers, e.g. a vocabulary coded `1`/`2`.
fn coded_cells(col: &ArrayRef) -> Result<Vec<Value>, StoreError> {
    let as_float = cast(col.as_ref(), &DataType::Float64)?;
    let Some(floats) = as_float.as_any().downcast_ref::<Float64Array>() else {
        return text_cells(col);
    };
    Ok((0..floats.len())
        .map(|row| {
            if floats.is_null(row) {
                Value::Category(String::new())
            } else {
                Value::Number(floats.value(row))
            }
        })
        .collect())
}

fn text_cells(col: &ArrayRef) -> Result<Vec<Value>, StoreError> {
    let as_text = cast(col.as_ref(), &DataType::Utf8)?;
    let Some(strings) = as_text.as_any().downcast_ref::<StringArray>() else {
        return Ok(vec![Value::Category(String::new()); col.len()]);
    };
    Ok((0..strings.len())
        .map(|row| {
            if strings.is_null(row) {
                Value::Category(String::new())
            } else {
                Value::Category(strings.value(row).to_string())
            }
        })
        .collect())
}

fn invalid(column: &str, row: usize, reason: &str) -> StoreError {
    StoreError::InvalidCell {
        column: column.to_string(),
        row: row + 1,
        reason: reason.to_string(),
    }
}

/// The uploaded table with [`PREDICTION_COLUMN`] and [`PROBABILITY_COLUMN`]
/// appended. Every original column is kept, including dropped ones; columns
/// already named like the outputs are replaced.
pub fn augment(batch: &RecordBatch, predictions: &[Prediction]) -> Result<RecordBatch, StoreError> {
    if predictions.len() != batch.num_rows() {
        return Err(StoreError::LengthMismatch {
            rows: batch.num_rows(),
            predictions: predictions.len(),
        });
    }

    let schema = batch.schema();
    let mut fields: Vec<Field> = Vec::with_capacity(schema.fields().len() + 2);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len() + 2);

    for (field, col) in schema.fields().iter().zip(batch.columns()) {
        if field.name() == PREDICTION_COLUMN || field.name() == PROBABILITY_COLUMN {
            continue;
        }
        fields.push(field.as_ref().clone());
        columns.push(col.clone());
    }

    fields.push(Field::new(PREDICTION_COLUMN, DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from_iter_values(
        predictions.iter().map(|p| p.outcome.as_str()),
    )));

    fields.push(Field::new(PROBABILITY_COLUMN, DataType::Float64, false));
    columns.push(Arc::new(Float64Array::from_iter_values(
        predictions.iter().map(|p| p.probability),
    )));

    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

/// Build a catalogue-shaped table from records, e.g. for a CSV template.
pub fn records_to_table(records: &[Record]) -> Result<RecordBatch, StoreError> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(FEATURES.len());

    for spec in FEATURES {
        let cells = records.iter().enumerate().map(|(row, record)| {
            record
                .get(spec.name)
                .ok_or_else(|| invalid(spec.name, row, "missing value"))
        });

        match spec.kind {
            FieldKind::Integer { .. } => {
                let mut builder = Int64Builder::with_capacity(records.len());
                for (row, cell) in cells.enumerate() {
                    let n = cell?
                        .as_number()
                        .ok_or_else(|| invalid(spec.name, row, "not a number"))?;
                    builder.append_value(n as i64);
                }
                columns.push(Arc::new(builder.finish()));
            }
            FieldKind::Category { .. } => {
                let mut builder = StringBuilder::new();
                for cell in cells {
                    builder.append_value(cell?.as_text());
                }
                columns.push(Arc::new(builder.finish()));
            }
        }
    }

    Ok(RecordBatch::try_new(
        Arc::new(features::input_schema()),
        columns,
    )?)
}
