//! Category tables: the category → integer code mapping used for label
//! encoding.
//!
//! A table is an immutable, versioned value. It is either loaded from a
//! vocabulary file shipped next to the model or built from the catalogue
//! options. Fitting a missing feature produces a new table; nothing here is
//! mutated behind the caller's back.
//!
//! File format:
//!
//! ```json
//! { "version": 1, "features": { "OverTime": ["No", "Yes"] } }
//! ```
//!
//! The position of a value in its list is its code.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::VocabularyError;
use crate::features::{self, FEATURES, FieldKind};
use crate::record::Value;

/// Vocabulary file version this build reads and writes.
pub const VOCABULARY_VERSION: u32 = 1;

/// Result of looking a value up in a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    Known(i64),
    /// The value was not present when the mapping was established.
    Unseen,
}

impl Code {
    /// Encoded value fed to the model for unseen categories.
    pub const UNSEEN_SENTINEL: i64 = -1;

    pub fn value(self) -> i64 {
        match self {
            Self::Known(code) => code,
            Self::Unseen => Self::UNSEEN_SENTINEL,
        }
    }
}

/// Mapping for one categorical feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMapping {
    values: Vec<String>,
    index: HashMap<String, i64>,
}

impl CategoryMapping {
    /// Fit a mapping from observed values: distinct values sorted
    /// lexicographically, coded `0..k`.
    pub fn fit<'a>(observed: impl IntoIterator<Item = &'a str>) -> Self {
        let distinct: BTreeSet<&str> = observed.into_iter().collect();
        let values: Vec<String> = distinct.into_iter().map(str::to_string).collect();
        Self::from_unique(values)
    }

    /// Build a mapping whose codes follow the given order.
    ///
    /// Returns the first repeated value on failure.
    pub fn from_ordered(values: Vec<String>) -> Result<Self, String> {
        let mut seen = BTreeSet::new();
        for value in &values {
            if !seen.insert(value.as_str()) {
                return Err(value.clone());
            }
        }
        Ok(Self::from_unique(values))
    }

    fn from_unique(values: Vec<String>) -> Self {
        let index = values
            .iter()
            .enumerate()
            .map(|(code, v)| (v.clone(), code as i64))
            .collect();
        Self { values, index }
    }

    pub fn code(&self, value: &str) -> Code {
        match self.index.get(value) {
            Some(&code) => Code::Known(code),
            None => Code::Unseen,
        }
    }

    /// Look up a raw cell. Text matches exactly. A number matches its
    /// whole-number text form first, then any entry with the same numeric
    /// value, so `1.1` finds an entry written `"1.10"`.
    pub fn lookup(&self, value: &Value) -> Code {
        let code = self.code(&value.as_text());
        match (code, value) {
            (Code::Unseen, Value::Number(n)) => self
                .values
                .iter()
                .position(|v| v.trim().parse::<f64>().is_ok_and(|parsed| parsed == *n))
                .map_or(Code::Unseen, |i| Code::Known(i as i64)),
            _ => code,
        }
    }

    /// Values in code order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct VocabularyFile {
    version: u32,
    features: BTreeMap<String, Vec<String>>,
}

/// Categorical feature name → mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    version: u32,
    features: BTreeMap<String, CategoryMapping>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl CategoryTable {
    /// A table with no mappings; every categorical feature is fitted from
    /// the first input it sees.
    pub fn empty() -> Self {
        Self {
            version: VOCABULARY_VERSION,
            features: BTreeMap::new(),
        }
    }

    /// Table built from the catalogue options, each feature's options sorted
    /// lexicographically.
    pub fn builtin() -> Self {
        let features = FEATURES
            .iter()
            .filter_map(|spec| match spec.kind {
                FieldKind::Category { options } => {
                    Some((spec.name.to_string(), CategoryMapping::fit(options.iter().copied())))
                }
                FieldKind::Integer { .. } => None,
            })
            .collect();
        Self {
            version: VOCABULARY_VERSION,
            features,
        }
    }

    /// Load a vocabulary file.
    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let text = std::fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            features = table.len(),
            version = table.version,
            "loaded category vocabulary"
        );
        Ok(table)
    }

    pub fn from_json(text: &str) -> Result<Self, VocabularyError> {
        let file: VocabularyFile = serde_json::from_str(text)?;
        if file.version != VOCABULARY_VERSION {
            return Err(VocabularyError::UnsupportedVersion {
                found: file.version,
                expected: VOCABULARY_VERSION,
            });
        }

        let mut features = BTreeMap::new();
        for (feature, values) in file.features {
            if !features::is_categorical(&feature) {
                return Err(VocabularyError::NotCategorical(feature));
            }
            let mapping = CategoryMapping::from_ordered(values)
                .map_err(|value| VocabularyError::DuplicateValue {
                    feature: feature.clone(),
                    value,
                })?;
            features.insert(feature, mapping);
        }

        Ok(Self {
            version: file.version,
            features,
        })
    }

    pub fn to_json(&self) -> Result<String, VocabularyError> {
        let file = VocabularyFile {
            version: self.version,
            features: self
                .features
                .iter()
                .map(|(name, mapping)| (name.clone(), mapping.values.clone()))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), VocabularyError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| VocabularyError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn get(&self, feature: &str) -> Option<&CategoryMapping> {
        self.features.get(feature)
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.features.contains_key(feature)
    }

    /// Add a mapping for a feature that has none. An established mapping is
    /// never replaced; returns `false` in that case.
    pub fn establish(&mut self, feature: &str, mapping: CategoryMapping) -> bool {
        if self.features.contains_key(feature) {
            return false;
        }
        self.features.insert(feature.to_string(), mapping);
        true
    }

    pub fn features(&self) -> impl Iterator<Item = (&str, &CategoryMapping)> {
        self.features.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_sorts_distinct_values() {
        let mapping = CategoryMapping::fit(["Yes", "No", "Yes"]);
        assert_eq!(mapping.values(), &["No".to_string(), "Yes".to_string()]);
        assert_eq!(mapping.code("No"), Code::Known(0));
        assert_eq!(mapping.code("Yes"), Code::Known(1));
        assert_eq!(mapping.code("Maybe"), Code::Unseen);
        assert_eq!(mapping.code("Maybe").value(), -1);
    }

    #[test]
    fn numbers_match_entries_by_value() {
        let mapping = CategoryMapping::from_ordered(vec!["1.10".into(), "2".into(), "3.0".into()])
            .unwrap();
        assert_eq!(mapping.lookup(&Value::Number(1.1)), Code::Known(0));
        assert_eq!(mapping.lookup(&Value::Number(2.0)), Code::Known(1));
        assert_eq!(mapping.lookup(&Value::Number(3.0)), Code::Known(2));
        assert_eq!(mapping.lookup(&Value::Number(4.0)), Code::Unseen);
        // Text is matched as written.
        assert_eq!(mapping.lookup(&Value::from("1.1")), Code::Unseen);
    }

    #[test]
    fn builtin_covers_categoricals() {
        let table = CategoryTable::builtin();
        assert_eq!(table.len(), features::CATEGORICAL_FEATURES.len());

        let department = table.get("Department").unwrap();
        assert_eq!(department.code("Human Resources"), Code::Known(0));
        assert_eq!(department.code("Research & Development"), Code::Known(1));
        assert_eq!(department.code("Sales"), Code::Known(2));
        assert_eq!(department.code("R&D"), Code::Unseen);

        let travel = table.get("BusinessTravel").unwrap();
        assert_eq!(
            travel.values(),
            &["Non-Travel", "Travel_Frequently", "Travel_Rarely"]
        );
    }

    #[test]
    fn establish_never_replaces() {
        let mut table = CategoryTable::empty();
        assert!(table.establish("OverTime", CategoryMapping::fit(["No"])));
        assert!(!table.establish("OverTime", CategoryMapping::fit(["No", "Yes"])));
        assert_eq!(table.get("OverTime").unwrap().len(), 1);
    }

    #[test]
    fn json_keeps_code_order() {
        let table = CategoryTable::from_json(
            r#"{"version": 1, "features": {"OverTime": ["Yes", "No"]}}"#,
        )
        .unwrap();
        let overtime = table.get("OverTime").unwrap();
        assert_eq!(overtime.code("Yes"), Code::Known(0));
        assert_eq!(overtime.code("No"), Code::Known(1));
    }

    #[test]
    fn json_rejects_bad_files() {
        assert!(matches!(
            CategoryTable::from_json(r#"{"version": 2, "features": {}}"#),
            Err(VocabularyError::UnsupportedVersion { found: 2, .. })
        ));
        assert!(matches!(
            CategoryTable::from_json(r#"{"version": 1, "features": {"Age": ["30"]}}"#),
            Err(VocabularyError::NotCategorical(name)) if name == "Age"
        ));
        assert!(matches!(
            CategoryTable::from_json(r#"{"version": 1, "features": {"Gender": ["Male", "Male"]}}"#),
            Err(VocabularyError::DuplicateValue { .. })
        ));
        assert!(matches!(
            CategoryTable::from_json("not json"),
            Err(VocabularyError::Json(_))
        ));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocabulary.json");

        let table = CategoryTable::builtin();
        table.save(&path).unwrap();
        let loaded = CategoryTable::load(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = CategoryTable::load(Path::new("/nonexistent/vocabulary.json")).unwrap_err();
        assert!(err.to_string().contains("vocabulary.json"));
    }
}
