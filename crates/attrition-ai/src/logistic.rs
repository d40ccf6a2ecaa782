//! Logistic-regression backend loaded from a JSON export.
//!
//! ```json
//! {
//!   "features": ["Age", "OverTime"],
//!   "weights": [-0.04, 1.3],
//!   "intercept": -1.1,
//!   "scaler": { "mean": [36.9, 0.3], "scale": [9.1, 0.45] }
//! }
//! ```
//!
//! `scaler` is optional; when present each input is standardised as
//! `(x - mean) / scale` before the linear term.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::encoder::FeatureMatrix;
use crate::model::BinaryClassifier;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub features: Vec<String>,
    pub weights: Vec<f64>,
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<Scaler>,
}

impl LogisticModel {
    pub fn new(features: Vec<String>, weights: Vec<f64>, intercept: f64) -> anyhow::Result<Self> {
        let model = Self {
            features,
            weights,
            intercept,
            scaler: None,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn with_scaler(mut self, scaler: Scaler) -> anyhow::Result<Self> {
        self.scaler = Some(scaler);
        self.validate()?;
        Ok(self)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading model {}", path.display()))?;
        let model = Self::from_json(&text).with_context(|| format!("parsing model {}", path.display()))?;
        info!(
            path = %path.display(),
            features = model.features.len(),
            standardised = model.scaler.is_some(),
            "loaded logistic model"
        );
        Ok(model)
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let model: Self = serde_json::from_str(text)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.features.is_empty(), "model lists no features");
        anyhow::ensure!(
            self.weights.len() == self.features.len(),
            "{} weights for {} features",
            self.weights.len(),
            self.features.len()
        );
        if let Some(scaler) = &self.scaler {
            anyhow::ensure!(
                scaler.mean.len() == self.features.len() && scaler.scale.len() == self.features.len(),
                "scaler has {} means and {} scales for {} features",
                scaler.mean.len(),
                scaler.scale.len(),
                self.features.len()
            );
            if let Some(i) = scaler.scale.iter().position(|&s| s == 0.0) {
                anyhow::bail!("scaler scale for {} is zero", self.features[i]);
            }
        }
        Ok(())
    }

    /// Positive-class probability for one row in model feature order.
    pub fn probability(&self, row: &[f64]) -> f64 {
        let z = match &self.scaler {
            Some(scaler) => row
                .iter()
                .zip(&self.weights)
                .zip(scaler.mean.iter().zip(&scaler.scale))
                .map(|((x, w), (m, s))| w * (x - m) / s)
                .sum::<f64>(),
            None => row.iter().zip(&self.weights).map(|(x, w)| w * x).sum::<f64>(),
        };
        sigmoid(self.intercept + z)
    }

    fn check_columns(&self, matrix: &FeatureMatrix) -> anyhow::Result<()> {
        anyhow::ensure!(
            matrix.columns() == self.features.as_slice(),
            "matrix columns {:?} do not match model features",
            matrix.columns()
        );
        Ok(())
    }
}

impl BinaryClassifier for LogisticModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict(&mut self, matrix: &FeatureMatrix) -> anyhow::Result<Vec<i64>> {
        self.check_columns(matrix)?;
        Ok(matrix
            .rows()
            .map(|row| i64::from(self.probability(row) >= 0.5))
            .collect())
    }

    fn predict_proba(&mut self, matrix: &FeatureMatrix) -> anyhow::Result<Vec<[f64; 2]>> {
        self.check_columns(matrix)?;
        Ok(matrix
            .rows()
            .map(|row| {
                let p = self.probability(row);
                [1.0 - p, p]
            })
            .collect())
    }
}

/// Numerically stable logistic function.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
