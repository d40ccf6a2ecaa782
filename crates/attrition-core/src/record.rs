//! Raw employee records as supplied by the caller, before encoding.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::features::{self, FEATURES, FieldKind};

/// Largest magnitude below which every whole `f64` is an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single raw cell: numeric or categorical text.
///
/// Deserializes from plain JSON scalars, so `{"Age": 30, "OverTime": "No"}`
/// is a valid record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Category(String),
}

impl Value {
    /// Numeric reading of the value. Text is parsed after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Category(s) => s.trim().parse().ok(),
        }
    }

    /// Text form used for category lookup. Whole numbers print without a
    /// fractional part so `1.0` matches the category `"1"`. Numbers beyond
    /// the exactly representable integer range keep their float form.
    pub fn as_text(&self) -> String {
        match self {
            Self::Category(s) => s.clone(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER => {
                format!("{}", *n as i64)
            }
            Self::Number(n) => n.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Category(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Category(s)
    }
}

/// Feature name → raw value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every catalogue feature set to its manual-entry default.
    pub fn manual_defaults() -> Self {
        FEATURES
            .iter()
            .map(|f| (f.name.to_string(), f.default_value()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Apply a `Name=Value` assignment from the command line.
    pub fn assign(&mut self, assignment: &str) -> Result<(), RecordError> {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| RecordError::MalformedAssignment(assignment.to_string()))?;
        self.set_field(name.trim(), raw.trim())
    }

    /// Set a catalogue feature from its text form, typed by the catalogue.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), RecordError> {
        let spec = features::field(name).ok_or_else(|| RecordError::UnknownFeature(name.to_string()))?;
        let value = match spec.kind {
            FieldKind::Integer { .. } => {
                let n: f64 = raw.parse().map_err(|_| RecordError::NotNumeric {
                    feature: name.to_string(),
                    value: raw.to_string(),
                })?;
                Value::Number(n)
            }
            FieldKind::Category { .. } => Value::Category(raw.to_string()),
        };
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    /// Overlay every field of `other`, rejecting names outside the catalogue.
    pub fn merge(&mut self, other: Record) -> Result<(), RecordError> {
        for (name, value) in other.fields {
            if features::field(&name).is_none() {
                return Err(RecordError::UnknownFeature(name));
            }
            self.fields.insert(name, value);
        }
        Ok(())
    }

    /// Catalogue features this record has no value for.
    pub fn missing_features(&self) -> Vec<&'static str> {
        features::feature_names()
            .filter(|name| !self.fields.contains_key(*name))
            .collect()
    }

    /// Manual-entry checks: known names, whole numbers within range.
    ///
    /// Categorical values are not checked against the offered options; an
    /// unlisted value is scored as an unseen category.
    pub fn validate(&self) -> Result<(), RecordError> {
        for (name, value) in &self.fields {
            let spec =
                features::field(name).ok_or_else(|| RecordError::UnknownFeature(name.clone()))?;
            let FieldKind::Integer { min, max, .. } = spec.kind else {
                continue;
            };
            let n = value.as_number().ok_or_else(|| RecordError::NotNumeric {
                feature: name.clone(),
                value: value.to_string(),
            })?;
            if n.fract() != 0.0 {
                return Err(RecordError::NotWhole {
                    feature: name.clone(),
                    value: n,
                });
            }
            if n < min as f64 || n > max as f64 {
                return Err(RecordError::OutOfRange {
                    feature: name.clone(),
                    value: n,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
