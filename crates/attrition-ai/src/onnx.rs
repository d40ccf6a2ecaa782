//! ONNX Runtime backend for classifiers exported with skl2onnx.
//!
//! The model must take one float input of shape `[N, features]` in catalogue
//! order and produce `label` (int64 `[N]`) followed by `probabilities`
//! (float `[N, 2]`). Export with `zipmap=False` so probabilities come out as a
//! tensor rather than a sequence of maps.

use std::path::Path;

use attrition_core::features;
use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::encoder::FeatureMatrix;
use crate::model::BinaryClassifier;

/// Binary classifier served by ONNX Runtime.
pub struct OnnxModel {
    session: Session,
    input_name: String,
    features: Vec<String>,
}

impl OnnxModel {
    /// Load a classifier from a `.onnx` file.
    pub fn load(model_path: &Path) -> anyhow::Result<Self> {
        anyhow::ensure!(model_path.exists(), "model not found: {model_path:?}");

        let session = Session::builder()?.commit_from_file(model_path)?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| anyhow::anyhow!("model declares no inputs"))?;
        anyhow::ensure!(
            session.outputs().len() >= 2,
            "expected label and probability outputs, model declares {}",
            session.outputs().len()
        );

        let features: Vec<String> = features::feature_names().map(str::to_string).collect();

        // Check the input width when the model states it.
        if let Some(width) = infer_width(session.inputs()[0].dtype()) {
            anyhow::ensure!(
                width == features.len(),
                "model expects {width} input columns, catalogue has {}",
                features.len()
            );
        }

        info!(input = %input_name, model = %model_path.display(), "loaded ONNX classifier");
        Ok(Self {
            session,
            input_name,
            features,
        })
    }

    /// Run the session once, returning labels and class probabilities.
    fn run(&mut self, matrix: &FeatureMatrix) -> anyhow::Result<(Vec<i64>, Vec<[f64; 2]>)> {
        anyhow::ensure!(
            matrix.columns() == self.features.as_slice(),
            "matrix columns do not match model features"
        );

        let rows = matrix.num_rows();
        let shape = [rows as i64, matrix.num_columns() as i64];
        let input = Tensor::from_array((shape, matrix.to_f32().into_boxed_slice()))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input])?;

        let (_, labels) = outputs[0].try_extract_tensor::<i64>()?;
        anyhow::ensure!(
            labels.len() == rows,
            "label output has {} values for {rows} rows",
            labels.len()
        );

        let (prob_shape, probs) = outputs[1].try_extract_tensor::<f32>()?;
        let dims: &[i64] = prob_shape;
        anyhow::ensure!(
            dims.len() == 2 && dims[0] as usize == rows && dims[1] == 2,
            "unexpected probability shape: {dims:?}, expected [{rows}, 2]"
        );

        let probabilities = probs
            .chunks_exact(2)
            .map(|pair| [f64::from(pair[0]), f64::from(pair[1])])
            .collect();

        Ok((labels.to_vec(), probabilities))
    }
}

impl BinaryClassifier for OnnxModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict(&mut self, matrix: &FeatureMatrix) -> anyhow::Result<Vec<i64>> {
        Ok(self.run(matrix)?.0)
    }

    fn predict_proba(&mut self, matrix: &FeatureMatrix) -> anyhow::Result<Vec<[f64; 2]>> {
        Ok(self.run(matrix)?.1)
    }
}

/// Input column count from the declared input type, if fixed.
fn infer_width(input_type: &ort::value::ValueType) -> Option<usize> {
    match input_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
