//! Structured error types for the event merger.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Category;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("io: {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("csv: {0}")]
  Csv(#[from] csv::Error),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("field type mismatch: {key}: cannot add {right} to {left}")]
  FieldTypeMismatch {
    key: String,
    left: &'static str,
    right: &'static str,
  },

  #[error("missing vocabulary file for {0}")]
  MissingVocabulary(Category),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}
