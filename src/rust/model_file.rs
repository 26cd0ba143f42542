//! Locating and verifying the model artifact on disk.

use std::env;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Environment variable that overrides the default model location.
pub const MODEL_PATH_ENV: &str = "WASTESORT_MODEL";
/// Model location relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "model.onnx";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model file not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Hash mismatch for {path}: expected {expected}, got {actual}")]
    HashMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

/// Returns the model path used when none is given on the command line
pub fn default_model_path() -> PathBuf {
    match env::var(MODEL_PATH_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_MODEL_PATH),
    }
}

/// Computes the lowercase hex SHA-256 digest of a file
pub fn sha256_hex(path: impl AsRef<Path>) -> Result<String, ModelError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ModelError::NotFound(path.display().to_string()));
    }
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let bytes = io::copy(&mut file, &mut hasher)?;
    log::debug!("Hashed {} bytes of {:?}", bytes, path);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fails with `HashMismatch` unless the file hashes to `expected_hash`
pub fn ensure_verified(path: impl AsRef<Path>, expected_hash: &str) -> Result<(), ModelError> {
    let path = path.as_ref();
    let actual = sha256_hex(path)?;
    if !actual.eq_ignore_ascii_case(expected_hash.trim()) {
        return Err(ModelError::HashMismatch {
            path: path.display().to_string(),
            expected: expected_hash.trim().to_lowercase(),
            actual,
        });
    }
    Ok(())
}
