mod builder;
#[allow(clippy::module_inception)]
mod classifier;
mod error;
mod utils;

pub use builder::ClassifierBuilder;
pub use classifier::{ImageClassifier, OnnxClassifier};
pub use error::ClassifierError;

/// Information about a loaded classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Name of the image input tensor
    pub input_name: String,
    /// Number of class scores the model produces
    pub num_classes: usize,
}
