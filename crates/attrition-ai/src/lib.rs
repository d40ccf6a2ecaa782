//! Inference layer: feature encoding, classifier backends (logistic JSON,
//! ONNX Runtime), and the scoring session.

pub mod encoder;
pub mod inference;
pub mod logistic;
pub mod model;
#[cfg(feature = "onnx")]
mod onnx;
pub mod pipeline;

pub use encoder::{EncodeError, FeatureMatrix, UnseenCell, encode};
pub use inference::{DecisionPolicy, InferenceError, score};
pub use logistic::{LogisticModel, Scaler};
pub use model::{BinaryClassifier, load_model};
#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;
pub use pipeline::{CategoryMode, Predictor};
