use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{get, post, web, App, HttpResponse, HttpServer};
use futures_util::TryStreamExt;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::api_error::ApiError;
use crate::classifier::ImageClassifier;
use crate::labels::{category_of, instructions_of, label_of, Locale};
use crate::preprocess::preprocess;

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// HTTP worker threads, `None` lets actix pick one per core
    pub workers: Option<usize>,
    pub locale: Locale,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            workers: None,
            locale: Locale::En,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// State shared by every worker. The classifier is only read after startup.
pub struct AppState {
    pub classifier: Arc<dyn ImageClassifier>,
    pub locale: Locale,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(classifier: Arc<dyn ImageClassifier>, config: &ServerConfig) -> Self {
        Self {
            classifier,
            locale: config.locale,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictionResponse {
    pub label: String,
    pub category: String,
    pub handling_instructions: String,
}

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse {
        status: "SUCCESS".to_string(),
        message: "Service is running".to_string(),
    })
}

#[post("/predict")]
pub async fn predict(
    mut payload: Multipart,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let upload = read_file_part(&mut payload, app_state.max_upload_bytes).await?;
    debug!("Received upload of {} bytes", upload.len());

    let classifier = Arc::clone(&app_state.classifier);
    let locale = app_state.locale;
    // decoding and inference are CPU-bound
    let response = web::block(move || run_prediction(classifier.as_ref(), &upload, locale))
        .await
        .map_err(|e| ApiError::Internal(format!("Prediction task failed: {}", e)))??;

    debug!("Predicted '{}' ({})", response.label, response.category);
    Ok(HttpResponse::Ok().json(response))
}

/// Preprocesses an upload, classifies it and resolves the class index into the
/// response payload.
pub fn run_prediction(
    classifier: &dyn ImageClassifier,
    bytes: &[u8],
    locale: Locale,
) -> Result<PredictionResponse, ApiError> {
    let tensor = preprocess(bytes)?;
    let class_index = classifier.classify(&tensor)?;
    let label = label_of(class_index)?;

    Ok(PredictionResponse {
        label: label.name(locale).to_string(),
        category: category_of(label).name(locale).to_string(),
        handling_instructions: instructions_of(label, locale).to_string(),
    })
}

/// Reads the first `file` part that carries a filename (`filename` or
/// `filename*`). Parts without one are ordinary form fields and are skipped.
async fn read_file_part(payload: &mut Multipart, limit: usize) -> Result<Vec<u8>, ApiError> {
    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::NoFilePart),
            Err(e) => {
                debug!("Multipart parsing stopped: {}", e);
                return Err(ApiError::NoFilePart);
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // `filename` wins over the RFC 5987 `filename*` form when both are sent
        let filename_empty = field.content_disposition().and_then(|cd| {
            cd.get_filename()
                .map(str::is_empty)
                .or_else(|| cd.get_filename_ext().map(|ext| ext.value.is_empty()))
        });
        match filename_empty {
            None => continue,
            Some(true) => return Err(ApiError::NoSelectedFile),
            Some(false) => {}
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| ApiError::Upload(format!("Failed to read upload: {}", e)))?
        {
            if bytes.len() + chunk.len() > limit {
                return Err(ApiError::PayloadTooLarge { limit });
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok(bytes);
    }
}

/// Registers the service routes; shared by `startup` and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(predict);
}

pub async fn startup(config: ServerConfig, classifier: Arc<dyn ImageClassifier>) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(classifier, &config));

    info!(
        "Starting server at {}:{} (locale {:?}, upload limit {} bytes)",
        config.host, config.port, config.locale, config.max_upload_bytes
    );

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.bind((config.host.as_str(), config.port))?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierError;
    use crate::preprocess::ImageTensor;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    struct Fixed(usize);

    impl ImageClassifier for Fixed {
        fn scores(&self, _image: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
            let mut scores = vec![0.0; self.0 + 1];
            scores[self.0] = 1.0;
            Ok(scores)
        }
    }

    fn png() -> Vec<u8> {
        let img = RgbImage::from_pixel(10, 10, Rgb([0, 128, 0]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_run_prediction_resolves_tables() {
        let response = run_prediction(&Fixed(1), &png(), Locale::En).unwrap();
        assert_eq!(response.label, "biological");
        assert_eq!(response.category, "organic");
        assert!(response.handling_instructions.contains("compost"));
    }

    #[test]
    fn test_run_prediction_indonesian() {
        let response = run_prediction(&Fixed(7), &png(), Locale::Id).unwrap();
        assert_eq!(response.label, "plastik");
        assert_eq!(response.category, "anorganik");
    }

    #[test]
    fn test_out_of_range_index_is_internal_error() {
        let err = run_prediction(&Fixed(9), &png(), Locale::En).unwrap_err();
        assert!(matches!(err, ApiError::Lookup(_)));
    }

    #[test]
    fn test_bad_image_is_preprocess_error() {
        let err = run_prediction(&Fixed(0), b"GIF89a-broken", Locale::En).unwrap_err();
        assert!(matches!(err, ApiError::Preprocess(_)));
    }
}
