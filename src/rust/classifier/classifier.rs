use std::collections::HashMap;
use std::sync::Arc;

use ort::session::Session;
use ort::value::Tensor;

use super::error::ClassifierError;
use super::utils::argmax;
use crate::preprocess::{ImageTensor, CHANNELS, INPUT_SIZE};

/// Maps a preprocessed image to class scores.
///
/// This is the seam the HTTP layer depends on, so anything that can score an
/// image (the ONNX model in production, a stub in tests) can be injected.
pub trait ImageClassifier: Send + Sync {
    /// Returns one score per class for the single image in the batch.
    fn scores(&self, image: &ImageTensor) -> Result<Vec<f32>, ClassifierError>;

    /// Returns the index of the highest-scoring class.
    ///
    /// # Errors
    /// - Forwards all errors from `scores()`
    /// - `PredictionError` if no score is comparable (empty or all NaN)
    fn classify(&self, image: &ImageTensor) -> Result<usize, ClassifierError> {
        let scores = self.scores(image)?;
        argmax(&scores).ok_or_else(|| {
            ClassifierError::PredictionError("Model returned no comparable class scores".into())
        })
    }
}

/// A thread-safe image classifier backed by an ONNX Runtime session.
///
/// The session is loaded once and only read afterwards, so a single instance
/// can be shared across HTTP workers behind an `Arc`.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use wastesort::{ImageClassifier, OnnxClassifier};
///
/// let classifier = OnnxClassifier::builder()
///     .with_model_path("model.onnx")?
///     .build()?;
///
/// let bytes = std::fs::read("bottle.jpg")?;
/// let tensor = wastesort::preprocess(&bytes)?;
/// let index = classifier.classify(&tensor)?;
/// println!("Predicted class index: {}", index);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OnnxClassifier {
    pub model_path: String,
    pub input_name: String,
    pub session: Arc<Session>,
    pub num_classes: usize,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<OnnxClassifier>();
    }
};

impl OnnxClassifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the loaded model
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            model_path: self.model_path.clone(),
            input_name: self.input_name.clone(),
            num_classes: self.num_classes,
        }
    }
}

impl ImageClassifier for OnnxClassifier {
    fn scores(&self, image: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        validate_input_shape(image)?;
        let scores = run_session(&self.session, &self.input_name, image)?;
        if scores.len() != self.num_classes {
            return Err(ClassifierError::PredictionError(format!(
                "Model returned {} scores, expected {}",
                scores.len(),
                self.num_classes
            )));
        }
        Ok(scores)
    }
}

fn validate_input_shape(image: &ImageTensor) -> Result<(), ClassifierError> {
    let size = INPUT_SIZE as usize;
    let expected = [1, size, size, CHANNELS];
    if image.shape() != expected {
        return Err(ClassifierError::ValidationError(format!(
            "Input tensor has shape {:?}, expected {:?}",
            image.shape(),
            expected
        )));
    }
    Ok(())
}

/// Runs one forward pass and flattens the first output into a score vector.
///
/// # Model Input Format
/// - `[batch_size=1, 224, 224, 3]` f32, RGB, values in `[0, 1]`
///
/// # Model Output Format
/// - First output, f32, one score per class for the single batch item
pub(crate) fn run_session(
    session: &Session,
    input_name: &str,
    image: &ImageTensor,
) -> Result<Vec<f32>, ClassifierError> {
    let input_dyn = image.view().into_dyn();
    let input = input_dyn.as_standard_layout();

    let mut input_tensors = HashMap::new();
    input_tensors.insert(
        input_name,
        Tensor::from_array(&input).map_err(|e| {
            ClassifierError::ModelError(format!("Failed to create input tensor: {}", e))
        })?,
    );

    let outputs = session
        .run(input_tensors)
        .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
    let output_tensor = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
        ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e))
    })?;

    Ok(output_tensor.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    struct FixedScores(Vec<f32>);

    impl ImageClassifier for FixedScores {
        fn scores(&self, _image: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    fn blank() -> ImageTensor {
        Array4::zeros((1, 224, 224, 3))
    }

    #[test]
    fn test_classify_uses_argmax() {
        let classifier = FixedScores(vec![0.0, 0.1, 0.05, 0.6, 0.25]);
        assert_eq!(classifier.classify(&blank()).unwrap(), 3);
    }

    #[test]
    fn test_classify_rejects_empty_scores() {
        let classifier = FixedScores(vec![]);
        assert!(matches!(
            classifier.classify(&blank()),
            Err(ClassifierError::PredictionError(_))
        ));
    }

    #[test]
    fn test_score_count_checked_per_request() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/waste_9_classes.onnx");
        let session = crate::runtime::create_session_builder(&Default::default())
            .unwrap()
            .commit_from_file(path)
            .unwrap();
        let classifier = OnnxClassifier {
            model_path: path.to_string(),
            input_name: "image".to_string(),
            session: Arc::new(session),
            num_classes: 4,
        };
        match classifier.scores(&blank()) {
            Err(ClassifierError::PredictionError(msg)) => {
                assert_eq!(msg, "Model returned 9 scores, expected 4")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_input_shape_validation() {
        assert!(validate_input_shape(&blank()).is_ok());
        let wrong = Array4::<f32>::zeros((1, 3, 224, 224));
        assert!(matches!(
            validate_input_shape(&wrong),
            Err(ClassifierError::ValidationError(_))
        ));
    }
}
