//! Feature encoding: raw records → fully numeric matrix.
//!
//! Categorical features are label-encoded through a [`CategoryTable`].
//! A feature without an established mapping is fitted from the records being
//! encoded (distinct values sorted lexicographically, coded `0..k`), and the
//! fitted mapping is returned in an extended copy of the table. Values missing
//! from an established mapping take the unseen branch and encode to
//! [`Code::UNSEEN_SENTINEL`].

use std::collections::BTreeSet;

use attrition_core::features;
use attrition_core::{CategoryMapping, CategoryTable, Code, Record, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("no records to encode")]
    Empty,

    #[error("records have no columns")]
    NoColumns,

    #[error("row {row} has no value for {feature}")]
    MissingValue { row: usize, feature: String },

    #[error("row {row}, {feature}: {value:?} is not a number")]
    NotNumeric {
        row: usize,
        feature: String,
        value: String,
    },

    #[error("{values} values do not fill rows of {columns} columns")]
    Shape { values: usize, columns: usize },
}

/// A categorical cell whose value the mapping did not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnseenCell {
    /// 0-based row index.
    pub row: usize,
    pub feature: String,
    pub value: String,
}

/// Row-major numeric matrix with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    data: Vec<f64>,
    unseen: Vec<UnseenCell>,
}

impl FeatureMatrix {
    /// Build a matrix from row-major values.
    pub fn new(columns: Vec<String>, data: Vec<f64>) -> Result<Self, EncodeError> {
        if columns.is_empty() {
            return Err(EncodeError::NoColumns);
        }
        if data.len() % columns.len() != 0 {
            return Err(EncodeError::Shape {
                values: data.len(),
                columns: columns.len(),
            });
        }
        Ok(Self {
            columns,
            data,
            unseen: Vec::new(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.data.len() / self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// One row in column order, or `None` past the last row.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let width = self.columns.len();
        let start = index.checked_mul(width)?;
        self.data.get(start..start.checked_add(width)?)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.columns.len())
    }

    /// Value of a named column in one row.
    pub fn get(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.row(row)?.get(col).copied()
    }

    /// Categorical cells that took the unseen branch during encoding.
    pub fn unseen(&self) -> &[UnseenCell] {
        &self.unseen
    }

    /// Reorder columns to `order`. Returns `None` if a name is absent.
    pub fn select(&self, order: &[String]) -> Option<FeatureMatrix> {
        let indices: Vec<usize> = order
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Option<_>>()?;
        let data = self
            .rows()
            .flat_map(|row| indices.iter().map(move |&i| row[i]))
            .collect();
        Some(FeatureMatrix {
            columns: order.to_vec(),
            data,
            unseen: self.unseen.clone(),
        })
    }

    /// Values as `f32`, row-major, for tensor input.
    pub fn to_f32(&self) -> Vec<f32> {
        self.data.iter().map(|&v| v as f32).collect()
    }
}

/// Encode records against a category table.
///
/// Returns the matrix and the table extended with any mappings fitted from
/// this input. The input table is never modified. Columns come in catalogue
/// order, followed by non-catalogue columns sorted by name.
pub fn encode(
    records: &[Record],
    table: &CategoryTable,
) -> Result<(FeatureMatrix, CategoryTable), EncodeError> {
    if records.is_empty() {
        return Err(EncodeError::Empty);
    }

    let columns = column_order(records);
    if columns.is_empty() {
        return Err(EncodeError::NoColumns);
    }

    let mut table = table.clone();
    for name in columns.iter().filter(|c| features::is_categorical(c)) {
        if table.contains(name) {
            continue;
        }
        let observed: Vec<String> = records
            .iter()
            .filter_map(|r| r.get(name))
            .map(Value::as_text)
            .collect();
        let mapping = CategoryMapping::fit(observed.iter().map(String::as_str));
        debug!(feature = %name, categories = mapping.len(), "fitted category mapping");
        table.establish(name, mapping);
    }

    let mut data = Vec::with_capacity(records.len() * columns.len());
    let mut unseen = Vec::new();

    for (row, record) in records.iter().enumerate() {
        for name in &columns {
            let value = record.get(name).ok_or_else(|| EncodeError::MissingValue {
                row: row + 1,
                feature: name.clone(),
            })?;

            let mapping = table.get(name).filter(|_| features::is_categorical(name));
            let encoded = match mapping {
                Some(mapping) => {
                    match mapping.lookup(value) {
                        Code::Known(code) => code as f64,
                        Code::Unseen => {
                            unseen.push(UnseenCell {
                                row,
                                feature: name.clone(),
                                value: value.as_text(),
                            });
                            Code::UNSEEN_SENTINEL as f64
                        }
                    }
                }
                None => value.as_number().ok_or_else(|| EncodeError::NotNumeric {
                    row: row + 1,
                    feature: name.clone(),
                    value: value.to_string(),
                })?,
            };
            data.push(encoded);
        }
    }

    let mut matrix = FeatureMatrix::new(columns, data)?;
    matrix.unseen = unseen;
    Ok((matrix, table))
}

fn column_order(records: &[Record]) -> Vec<String> {
    let present: BTreeSet<&str> = records.iter().flat_map(|r| r.names()).collect();

    let mut columns: Vec<String> = features::feature_names()
        .filter(|name| present.contains(name))
        .map(str::to_string)
        .collect();
    columns.extend(
        present
            .iter()
            .filter(|name| features::field(name).is_none())
            .map(|name| name.to_string()),
    );
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, Value)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn fits_missing_mapping_from_batch() {
        let records = vec![
            record(&[("OverTime", "Yes".into()), ("Age", 30i64.into())]),
            record(&[("OverTime", "No".into()), ("Age", 41i64.into())]),
            record(&[("OverTime", "Yes".into()), ("Age", 25i64.into())]),
        ];

        let (matrix, table) = encode(&records, &CategoryTable::empty()).unwrap();
        assert_eq!(matrix.columns(), &["Age", "OverTime"]);
        assert_eq!(matrix.num_rows(), 3);
        assert_eq!(matrix.get(0, "OverTime"), Some(1.0));
        assert_eq!(matrix.get(1, "OverTime"), Some(0.0));
        assert_eq!(matrix.get(1, "Age"), Some(41.0));

        let overtime = table.get("OverTime").unwrap();
        assert_eq!(overtime.values(), &["No", "Yes"]);
        assert!(matrix.unseen().is_empty());
    }

    #[test]
    fn established_mapping_is_reused() {
        let first = vec![record(&[("Gender", "Male".into())])];
        let (_, table) = encode(&first, &CategoryTable::empty()).unwrap();

        // Female was not in the batch that established the mapping.
        let second = vec![
            record(&[("Gender", "Female".into())]),
            record(&[("Gender", "Male".into())]),
        ];
        let (matrix, table_after) = encode(&second, &table).unwrap();
        assert_eq!(matrix.get(0, "Gender"), Some(-1.0));
        assert_eq!(matrix.get(1, "Gender"), Some(0.0));
        assert_eq!(table_after, table);
    }

    #[test]
    fn unseen_value_takes_sentinel() {
        let records = vec![record(&[("Department", "R&D".into())])];
        let (matrix, _) = encode(&records, &CategoryTable::builtin()).unwrap();
        assert_eq!(matrix.get(0, "Department"), Some(Code::UNSEEN_SENTINEL as f64));
        assert_eq!(
            matrix.unseen(),
            &[UnseenCell {
                row: 0,
                feature: "Department".into(),
                value: "R&D".into(),
            }]
        );
    }

    #[test]
    fn input_table_is_untouched() {
        let table = CategoryTable::empty();
        let records = vec![record(&[("MaritalStatus", "Single".into())])];
        let (_, extended) = encode(&records, &table).unwrap();
        assert!(table.is_empty());
        assert_eq!(extended.len(), 1);
    }

    #[test]
    fn encoding_is_repeatable() {
        let records = vec![Record::manual_defaults(), Record::manual_defaults()];
        let table = CategoryTable::builtin();
        let (a, _) = encode(&records, &table).unwrap();
        let (b, _) = encode(&records, &table).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.num_columns(), features::FEATURES.len());
    }

    #[test]
    fn numeric_text_is_coerced() {
        let records = vec![record(&[("Age", " 42 ".into())])];
        let (matrix, _) = encode(&records, &CategoryTable::empty()).unwrap();
        assert_eq!(matrix.get(0, "Age"), Some(42.0));

        let bad = vec![record(&[("Age", "forty".into())])];
        assert!(matches!(
            encode(&bad, &CategoryTable::empty()),
            Err(EncodeError::NotNumeric { row: 1, .. })
        ));
    }

    #[test]
    fn numeric_category_matches_text_form() {
        let table = CategoryTable::from_json(
            r#"{"version": 1, "features": {"JobRole": ["1", "2"]}}"#,
        )
        .unwrap();
        let records = vec![record(&[("JobRole", 2i64.into())])];
        let (matrix, _) = encode(&records, &table).unwrap();
        assert_eq!(matrix.get(0, "JobRole"), Some(1.0));

        // Entries written with a different decimal form still match.
        let table = CategoryTable::from_json(
            r#"{"version": 1, "features": {"Gender": ["1.50", "2.50"]}}"#,
        )
        .unwrap();
        let records = vec![record(&[("Gender", 2.5.into())])];
        let (matrix, _) = encode(&records, &table).unwrap();
        assert_eq!(matrix.get(0, "Gender"), Some(1.0));
        assert!(matrix.unseen().is_empty());
    }

    #[test]
    fn ragged_records_fail() {
        let records = vec![
            record(&[("Age", 30i64.into()), ("JobLevel", 2i64.into())]),
            record(&[("Age", 31i64.into())]),
        ];
        let err = encode(&records, &CategoryTable::empty()).unwrap_err();
        assert!(matches!(err, EncodeError::MissingValue { row: 2, ref feature } if feature == "JobLevel"));
    }

    #[test]
    fn non_catalogue_columns_follow_catalogue() {
        let records = vec![record(&[
            ("Zeta", 1i64.into()),
            ("Age", 30i64.into()),
            ("Alpha", 2i64.into()),
        ])];
        let (matrix, _) = encode(&records, &CategoryTable::empty()).unwrap();
        assert_eq!(matrix.columns(), &["Age", "Alpha", "Zeta"]);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            encode(&[], &CategoryTable::builtin()),
            Err(EncodeError::Empty)
        ));
        assert!(matches!(
            encode(&[Record::new()], &CategoryTable::builtin()),
            Err(EncodeError::NoColumns)
        ));
    }

    #[test]
    fn select_reorders_columns() {
        let matrix =
            FeatureMatrix::new(vec!["a".into(), "b".into()], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let swapped = matrix.select(&["b".to_string(), "a".to_string()]).unwrap();
        assert_eq!(swapped.row(0), Some(&[2.0, 1.0][..]));
        assert_eq!(swapped.row(1), Some(&[4.0, 3.0][..]));
        assert_eq!(swapped.row(2), None);
        assert_eq!(swapped.row(usize::MAX), None);
        assert!(matrix.select(&["c".to_string()]).is_none());
    }

    #[test]
    fn shape_is_checked() {
        assert!(matches!(
            FeatureMatrix::new(vec!["a".into(), "b".into()], vec![1.0, 2.0, 3.0]),
            Err(EncodeError::Shape { values: 3, columns: 2 })
        ));
    }
}
