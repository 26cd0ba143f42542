use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;
use wastesort::model_file::{default_model_path, MODEL_PATH_ENV};
use wastesort::server::{self, ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use wastesort::{Locale, OnnxClassifier, RuntimeConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the ONNX classifier (falls back to $WASTESORT_MODEL, then model.onnx)
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Expected SHA-256 hex digest of the model file
    #[arg(long)]
    model_sha256: Option<String>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to serve on
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// HTTP worker threads (defaults to one per core)
    #[arg(long)]
    workers: Option<usize>,

    /// ONNX Runtime intra-op threads, 0 lets the runtime decide
    #[arg(long, default_value_t = 0)]
    intra_threads: usize,

    /// ONNX Runtime inter-op threads, 0 lets the runtime decide
    #[arg(long, default_value_t = 0)]
    inter_threads: usize,

    /// Language of labels and instructions in responses
    #[arg(long, value_enum, default_value_t = Locale::En)]
    locale: Locale,

    /// Largest accepted upload in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,
}

fn load_classifier(args: &Args) -> anyhow::Result<OnnxClassifier> {
    let model_path = args.model_path.clone().unwrap_or_else(default_model_path);
    info!("Loading model from {:?} (override with --model-path or {})", model_path, MODEL_PATH_ENV);

    let runtime_config = RuntimeConfig {
        inter_threads: args.inter_threads,
        intra_threads: args.intra_threads,
        ..RuntimeConfig::default()
    };

    let mut builder = OnnxClassifier::builder().with_runtime_config(runtime_config);
    if let Some(digest) = &args.model_sha256 {
        builder = builder.with_expected_sha256(digest.clone());
    }

    let classifier = builder
        .with_model_path(&model_path)?
        .build()
        .with_context(|| format!("Failed to load model {:?}", model_path))?;
    Ok(classifier)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    wastesort::init_logger();
    let args = Args::parse();

    let start_time = Instant::now();
    let classifier = load_classifier(&args)?;
    let info = classifier.info();
    info!(
        "Model loaded in {:.2?}: {} classes, input '{}'",
        start_time.elapsed(),
        info.num_classes,
        info.input_name
    );

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        workers: args.workers,
        locale: args.locale,
        max_upload_bytes: args.max_upload_bytes,
    };

    server::startup(config, Arc::new(classifier))
        .await
        .context("HTTP server failed")?;
    Ok(())
}
