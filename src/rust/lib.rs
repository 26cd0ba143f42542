//! An HTTP inference service that classifies photos of waste with an ONNX image
//! classifier and answers with a label, an organic/inorganic category and
//! handling instructions.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use wastesort::{label_of, ImageClassifier, Locale, OnnxClassifier};
//!
//! let classifier = OnnxClassifier::builder()
//!     .with_model_path("model.onnx")?
//!     .build()?;
//!
//! let tensor = wastesort::preprocess(&std::fs::read("can.png")?)?;
//! let label = label_of(classifier.classify(&tensor)?)?;
//! println!("{} ({})", label.name(Locale::En), label.category());
//! println!("{}", label.instructions(Locale::En));
//! # Ok(())
//! # }
//! ```
//!
//! # Serving
//!
//! The classifier is loaded once and shared read-only across HTTP workers:
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use wastesort::{server, OnnxClassifier};
//!
//! let classifier = Arc::new(OnnxClassifier::builder().with_model_path("model.onnx")?.build()?);
//! server::startup(server::ServerConfig::default(), classifier).await?;
//! # Ok(())
//! # }
//! ```

pub mod api_error;
pub mod classifier;
pub mod labels;
pub mod model_file;
pub mod preprocess;
mod runtime;
pub mod server;

pub use api_error::{ApiError, ErrorBody};
pub use classifier::{ClassifierBuilder, ClassifierError, ClassifierInfo, ImageClassifier, OnnxClassifier};
pub use labels::{category_of, instructions_of, label_of, Category, Locale, LookupError, WasteLabel, NUM_CLASSES};
pub use model_file::ModelError;
pub use preprocess::{preprocess, ImageTensor, PreprocessError};
pub use runtime::{create_session_builder, RuntimeConfig};
pub use server::{PredictionResponse, ServerConfig, StatusResponse};

/// Initialises `env_logger` with an `info` default, overridable through `RUST_LOG`
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
