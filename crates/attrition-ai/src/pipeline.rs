//! Scoring session: encoder + classifier + category table.

use std::collections::BTreeMap;

use attrition_core::{CategoryTable, Code, Prediction, Record};
use tracing::{debug, info, warn};

use crate::encoder::encode;
use crate::inference::{DecisionPolicy, InferenceError, score};
use crate::model::BinaryClassifier;

/// What happens to category mappings fitted while encoding a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryMode {
    /// The table stays as loaded; mappings fitted for absent features apply
    /// to the current request only.
    #[default]
    Frozen,
    /// Fitted mappings are kept for the rest of the session, so codes depend
    /// on which values were seen first.
    Learn,
}

/// Owns a loaded model and the category table used to encode its input.
pub struct Predictor {
    model: Box<dyn BinaryClassifier>,
    categories: CategoryTable,
    policy: DecisionPolicy,
    mode: CategoryMode,
}

impl Predictor {
    pub fn new(model: Box<dyn BinaryClassifier>, categories: CategoryTable) -> Self {
        Self {
            model,
            categories,
            policy: DecisionPolicy::default(),
            mode: CategoryMode::default(),
        }
    }

    pub fn with_policy(mut self, policy: DecisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_category_mode(mut self, mode: CategoryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn policy(&self) -> DecisionPolicy {
        self.policy
    }

    /// Encode and score records, one prediction per record in input order.
    pub fn predict(&mut self, records: &[Record]) -> Result<Vec<Prediction>, InferenceError> {
        let (matrix, extended) = encode(records, &self.categories)?;

        // One warning per distinct unseen value, not per cell.
        let mut unseen: BTreeMap<(&str, &str), (usize, usize)> = BTreeMap::new();
        for cell in matrix.unseen() {
            let entry = unseen
                .entry((cell.feature.as_str(), cell.value.as_str()))
                .or_insert((cell.row + 1, 0));
            entry.1 += 1;
        }
        for ((feature, value), (first_row, count)) in unseen {
            warn!(
                feature,
                value,
                first_row,
                count,
                code = Code::UNSEEN_SENTINEL,
                "unseen category"
            );
        }

        let predictions = score(self.model.as_mut(), &matrix, self.policy)?;

        // Fitted mappings are only kept once the request has scored.
        let fitted = extended.len().saturating_sub(self.categories.len());
        if fitted > 0 {
            match self.mode {
                CategoryMode::Learn => {
                    info!(fitted, "keeping category mappings fitted from this input");
                    self.categories = extended;
                }
                CategoryMode::Frozen => {
                    warn!(fitted, "category mappings fitted from this input only");
                }
            }
        }

        debug!(rows = predictions.len(), "scored records");
        Ok(predictions)
    }

    /// Score a single record.
    pub fn predict_one(&mut self, record: &Record) -> Result<Prediction, InferenceError> {
        let mut predictions = self.predict(std::slice::from_ref(record))?;
        predictions
            .pop()
            .ok_or_else(|| InferenceError::Output("no prediction returned".into()))
    }
}
