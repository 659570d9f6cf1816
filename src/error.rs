//! Crate-wide error types.

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TernError>;

/// Failure reported by the native engine, carried as plain data so it can
/// travel inside status notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
  pub code: i32,
  pub message: String,
}

impl EngineError {
  pub fn new(code: i32, message: impl Into<String>) -> Self {
    Self {
      code,
      message: message.into(),
    }
  }
}

impl fmt::Display for EngineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "engine error {}: {}", self.code, self.message)
  }
}

#[derive(Debug, Error)]
pub enum TernError {
  /// Revision id absent from the document's tree. Navigator reads map this
  /// to an empty result instead of propagating it.
  #[error("revision not found")]
  NotFound,

  /// Any other non-zero native status.
  #[error("{0}")]
  Engine(EngineError),

  /// The native replication session could not be started.
  #[error("replication session could not be started: {0}")]
  SessionCreation(String),

  /// Revision body could not be encoded or decoded.
  #[error("body serialization failed: {0}")]
  Serialization(String),
}

impl TernError {
  pub fn engine(code: i32, message: impl Into<String>) -> Self {
    TernError::Engine(EngineError::new(code, message))
  }
}
