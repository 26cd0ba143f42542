use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use ndarray::Array4;
use ort::session::Session;

use super::classifier::{run_session, OnnxClassifier};
use super::error::ClassifierError;
use crate::labels::NUM_CLASSES;
use crate::model_file;
use crate::preprocess::{ImageTensor, CHANNELS, INPUT_SIZE};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// A builder for constructing an OnnxClassifier with a fluent interface.
#[derive(Debug)]
pub struct ClassifierBuilder {
    model_path: Option<String>,
    expected_sha256: Option<String>,
    runtime_config: RuntimeConfig,
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierBuilder {
    /// Creates a new ClassifierBuilder with the default runtime configuration
    ///
    /// # Example
    /// ```
    /// use wastesort::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            model_path: None,
            expected_sha256: None,
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Sets the runtime configuration for ONNX model execution
    ///
    /// # Example
    /// ```
    /// use wastesort::{ClassifierBuilder, RuntimeConfig};
    ///
    /// let config = RuntimeConfig { intra_threads: 2, ..RuntimeConfig::default() };
    /// let builder = ClassifierBuilder::new()
    ///     .with_runtime_config(config);
    /// ```
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Requires the model file to hash to the given SHA-256 hex digest before
    /// it is loaded
    pub fn with_expected_sha256(mut self, digest: impl Into<String>) -> Self {
        self.expected_sha256 = Some(digest.into());
        self
    }

    /// Sets the path of the ONNX model file
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The path is empty
    ///   - The path is already set
    ///   - The file doesn't exist
    pub fn with_model_path(mut self, model_path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let model_path = model_path.as_ref();
        if model_path.as_os_str().is_empty() {
            return Err(ClassifierError::BuildError("Model path cannot be empty".to_string()));
        }
        if self.model_path.is_some() {
            return Err(ClassifierError::BuildError("Model path already set".to_string()));
        }
        if !model_path.exists() {
            return Err(ClassifierError::BuildError(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        self.model_path = Some(model_path.to_string_lossy().to_string());
        Ok(self)
    }

    /// Verifies, loads and warms up the model, returning the final classifier
    ///
    /// # Returns
    /// * `Result<OnnxClassifier, ClassifierError>` - The classifier if successful, or an error if:
    ///   - No model path is set
    ///   - The file does not match the expected SHA-256 digest
    ///   - The ONNX session cannot be created
    ///   - The model has no inputs or outputs
    ///   - The warm-up inference does not yield one score per class
    pub fn build(self) -> Result<OnnxClassifier, ClassifierError> {
        let model_path = self
            .model_path
            .ok_or_else(|| ClassifierError::BuildError("Model path must be set".to_string()))?;

        if let Some(expected) = &self.expected_sha256 {
            model_file::ensure_verified(&model_path, expected).map_err(|e| {
                error!("Model verification failed: {}", e);
                ClassifierError::BuildError(e.to_string())
            })?;
            info!("Model checksum verified");
        }

        // Create session using the singleton environment
        let session = create_session_builder(&self.runtime_config)?.commit_from_file(&model_path)?;

        let input_name = Self::validate_model(&session)?;
        info!("Model structure validated successfully (input '{}')", input_name);

        let num_classes = Self::infer_num_classes(&session, &input_name)?;
        if num_classes != NUM_CLASSES {
            return Err(ClassifierError::BuildError(format!(
                "Model produces {} class scores, expected {}",
                num_classes, NUM_CLASSES
            )));
        }
        info!("Warm-up inference returned {} class scores", num_classes);

        Ok(OnnxClassifier {
            model_path,
            input_name,
            session: Arc::new(session),
            num_classes,
        })
    }

    /// Validates that the model has at least one input and one output and
    /// returns the name of the first input
    fn validate_model(session: &Session) -> Result<String, ClassifierError> {
        let input = session.inputs.first().ok_or_else(|| {
            ClassifierError::ModelError("Model must have at least 1 input for the image".to_string())
        })?;

        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for class scores".to_string(),
            ));
        }

        Ok(input.name.clone())
    }

    /// Runs a blank image through the model to learn how many scores it emits
    fn infer_num_classes(session: &Session, input_name: &str) -> Result<usize, ClassifierError> {
        let size = INPUT_SIZE as usize;
        let blank: ImageTensor = Array4::zeros((1, size, size, CHANNELS));
        let scores = run_session(session, input_name, &blank)
            .map_err(|e| ClassifierError::BuildError(format!("Warm-up inference failed: {}", e)))?;
        Ok(scores.len())
    }
}
