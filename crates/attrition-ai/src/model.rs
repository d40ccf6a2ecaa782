//! Classifier boundary: the trained artifact seen as `predict` and
//! `predict_proba` over an encoded matrix.

use std::path::Path;

use crate::encoder::FeatureMatrix;
use crate::logistic::LogisticModel;

/// A trained binary classifier. Implementations are opaque to the rest of
/// the crate beyond these operations.
pub trait BinaryClassifier {
    /// Column names the model was trained on, in input order.
    fn feature_names(&self) -> &[String];

    /// Class label (0 or 1) per row.
    fn predict(&mut self, matrix: &FeatureMatrix) -> anyhow::Result<Vec<i64>>;

    /// `[P(class 0), P(class 1)]` per row.
    fn predict_proba(&mut self, matrix: &FeatureMatrix) -> anyhow::Result<Vec<[f64; 2]>>;
}

/// Load a model artifact, choosing the backend from the file extension:
/// `.json` for a logistic-regression export, `.onnx` for ONNX Runtime.
pub fn load_model(path: &Path) -> anyhow::Result<Box<dyn BinaryClassifier>> {
    anyhow::ensure!(path.exists(), "model file not found: {}", path.display());

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Box::new(LogisticModel::load(path)?)),
        Some("onnx") => load_onnx(path),
        other => anyhow::bail!(
            "unsupported model format {other:?} for {}: expected .json or .onnx",
            path.display()
        ),
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> anyhow::Result<Box<dyn BinaryClassifier>> {
    Ok(Box::new(crate::onnx::OnnxModel::load(path)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> anyhow::Result<Box<dyn BinaryClassifier>> {
    anyhow::bail!(
        "{} is an ONNX model but this build lacks the `onnx` feature",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        let err = load_model(Path::new("/nonexistent/model.json"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        std::fs::write(&path, b"\x80\x04").unwrap();
        let err = load_model(&path).err().unwrap();
        assert!(err.to_string().contains("unsupported model format"));
    }

    #[test]
    fn json_selects_logistic_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"features": ["Age"], "weights": [0.5], "intercept": -1.0}"#,
        )
        .unwrap();
        let model = load_model(&path).unwrap();
        assert_eq!(model.feature_names(), &["Age"]);
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn onnx_without_feature_is_explained() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"onnx").unwrap();
        let err = load_model(&path).err().unwrap();
        assert!(err.to_string().contains("`onnx` feature"));
    }
}
