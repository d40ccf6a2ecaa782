//! Inference adapter: scores an encoded matrix and packages the results.

use attrition_core::{Outcome, Prediction};
use thiserror::Error;

use crate::encoder::{EncodeError, FeatureMatrix};
use crate::model::BinaryClassifier;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(
        "invalid input: missing columns [{}], unexpected columns [{}]",
        missing.join(", "),
        extra.join(", ")
    )]
    InvalidInput {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("model inference failed: {0:#}")]
    Model(anyhow::Error),

    #[error("model output: {0}")]
    Output(String),

    #[error("decision threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),
}

/// How a row's label is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DecisionPolicy {
    /// Use the model's own `predict` output.
    #[default]
    ModelLabel,
    /// Resign when the positive-class probability is at least the threshold.
    Threshold(f64),
}

impl DecisionPolicy {
    pub fn threshold(value: f64) -> Result<Self, InferenceError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(InferenceError::InvalidThreshold(value));
        }
        Ok(Self::Threshold(value))
    }
}

/// Score every row of `matrix`, one prediction per row in input order.
///
/// The matrix must carry exactly the model's feature columns; they are
/// matched by name and reordered to the model's order. Any mismatch fails
/// before the model is called.
pub fn score(
    model: &mut dyn BinaryClassifier,
    matrix: &FeatureMatrix,
    policy: DecisionPolicy,
) -> Result<Vec<Prediction>, InferenceError> {
    let expected = model.feature_names().to_vec();

    let missing: Vec<String> = expected
        .iter()
        .filter(|name| matrix.column_index(name).is_none())
        .cloned()
        .collect();
    let extra: Vec<String> = matrix
        .columns()
        .iter()
        .filter(|name| !expected.contains(name))
        .cloned()
        .collect();
    if !missing.is_empty() || !extra.is_empty() {
        return Err(InferenceError::InvalidInput { missing, extra });
    }

    let ordered = matrix.select(&expected).ok_or_else(|| InferenceError::InvalidInput {
        missing: Vec::new(),
        extra: Vec::new(),
    })?;

    let labels = model.predict(&ordered).map_err(InferenceError::Model)?;
    let probabilities = model.predict_proba(&ordered).map_err(InferenceError::Model)?;

    let rows = ordered.num_rows();
    if labels.len() != rows || probabilities.len() != rows {
        return Err(InferenceError::Output(format!(
            "{} labels and {} probabilities for {rows} rows",
            labels.len(),
            probabilities.len()
        )));
    }

    labels
        .iter()
        .zip(&probabilities)
        .enumerate()
        .map(|(row, (&label, proba))| {
            let probability = proba[1];
            if !(0.0..=1.0).contains(&probability) {
                return Err(InferenceError::Output(format!(
                    "row {}: probability {probability} outside [0, 1]",
                    row + 1
                )));
            }
            let outcome = match policy {
                DecisionPolicy::ModelLabel => Outcome::from_label(label).ok_or_else(|| {
                    InferenceError::Output(format!("row {}: label {label} is not 0 or 1", row + 1))
                })?,
                DecisionPolicy::Threshold(t) if probability >= t => Outcome::Resign,
                DecisionPolicy::Threshold(_) => Outcome::Stay,
            };
            Ok(Prediction {
                outcome,
                probability,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns fixed outputs and records the column order it was given.
    struct FixedModel {
        features: Vec<String>,
        labels: Vec<i64>,
        proba: Vec<f64>,
        seen_columns: Vec<String>,
        calls: usize,
    }

    impl FixedModel {
        fn new(features: &[&str], labels: Vec<i64>, proba: Vec<f64>) -> Self {
            Self {
                features: features.iter().map(|s| s.to_string()).collect(),
                labels,
                proba,
                seen_columns: Vec::new(),
                calls: 0,
            }
        }
    }

    impl BinaryClassifier for FixedModel {
        fn feature_names(&self) -> &[String] {
            &self.features
        }

        fn predict(&mut self, matrix: &FeatureMatrix) -> anyhow::Result<Vec<i64>> {
            self.calls += 1;
            self.seen_columns = matrix.columns().to_vec();
            Ok(self.labels.clone())
        }

        fn predict_proba(&mut self, _matrix: &FeatureMatrix) -> anyhow::Result<Vec<[f64; 2]>> {
            self.calls += 1;
            Ok(self.proba.iter().map(|&p| [1.0 - p, p]).collect())
        }
    }

    fn matrix(columns: &[&str], data: Vec<f64>) -> FeatureMatrix {
        FeatureMatrix::new(columns.iter().map(|s| s.to_string()).collect(), data).unwrap()
    }

    #[test]
    fn packages_one_prediction_per_row() {
        let mut model = FixedModel::new(&["a", "b"], vec![1, 0], vec![0.9, 0.2]);
        let m = matrix(&["a", "b"], vec![1.0, 2.0, 3.0, 4.0]);

        let out = score(&mut model, &m, DecisionPolicy::ModelLabel).unwrap();
        assert_eq!(
            out,
            vec![
                Prediction {
                    outcome: Outcome::Resign,
                    probability: 0.9
                },
                Prediction {
                    outcome: Outcome::Stay,
                    probability: 0.2
                },
            ]
        );
    }

    #[test]
    fn columns_are_matched_by_name() {
        let mut model = FixedModel::new(&["a", "b"], vec![0], vec![0.1]);
        let m = matrix(&["b", "a"], vec![2.0, 1.0]);
        score(&mut model, &m, DecisionPolicy::ModelLabel).unwrap();
        assert_eq!(model.seen_columns, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn column_mismatch_fails_before_scoring() {
        let mut model = FixedModel::new(&["a", "b"], vec![0], vec![0.1]);
        let m = matrix(&["a", "c"], vec![1.0, 2.0]);

        let err = score(&mut model, &m, DecisionPolicy::ModelLabel).unwrap_err();
        match err {
            InferenceError::InvalidInput { missing, extra } => {
                assert_eq!(missing, vec!["b".to_string()]);
                assert_eq!(extra, vec!["c".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(model.calls, 0);
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let mut model = FixedModel::new(&["a"], vec![1], vec![1.5]);
        let m = matrix(&["a"], vec![1.0]);
        assert!(matches!(
            score(&mut model, &m, DecisionPolicy::ModelLabel),
            Err(InferenceError::Output(_))
        ));
    }

    #[test]
    fn non_binary_label_is_rejected() {
        let mut model = FixedModel::new(&["a"], vec![2], vec![0.5]);
        let m = matrix(&["a"], vec![1.0]);
        assert!(matches!(
            score(&mut model, &m, DecisionPolicy::ModelLabel),
            Err(InferenceError::Output(_))
        ));
    }

    #[test]
    fn output_length_is_checked() {
        let mut model = FixedModel::new(&["a"], vec![0, 1], vec![0.1, 0.9]);
        let m = matrix(&["a"], vec![1.0]);
        assert!(matches!(
            score(&mut model, &m, DecisionPolicy::ModelLabel),
            Err(InferenceError::Output(_))
        ));
    }

    #[test]
    fn threshold_overrides_model_label() {
        // Model says stay for both; threshold 0.3 flips the first row.
        let mut model = FixedModel::new(&["a"], vec![0, 0], vec![0.35, 0.25]);
        let m = matrix(&["a"], vec![1.0, 2.0]);
        let policy = DecisionPolicy::threshold(0.3).unwrap();

        let out = score(&mut model, &m, policy).unwrap();
        assert_eq!(out[0].outcome, Outcome::Resign);
        assert_eq!(out[1].outcome, Outcome::Stay);
    }

    #[test]
    fn threshold_must_be_a_probability() {
        assert!(DecisionPolicy::threshold(1.2).is_err());
        assert!(DecisionPolicy::threshold(f64::NAN).is_err());
        assert!(DecisionPolicy::threshold(0.0).is_ok());
    }

    #[test]
    fn rescoring_is_idempotent() {
        let mut model = FixedModel::new(&["a"], vec![1], vec![0.7]);
        let m = matrix(&["a"], vec![1.0]);
        let first = score(&mut model, &m, DecisionPolicy::ModelLabel).unwrap();
        let second = score(&mut model, &m, DecisionPolicy::ModelLabel).unwrap();
        assert_eq!(first, second);
    }
}
