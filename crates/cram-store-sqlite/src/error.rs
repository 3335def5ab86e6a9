//! Errors raised while reading or writing the SQLite store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A stored value failed a domain check on the way out, e.g. an unknown
  /// `source_type`.
  #[error("invalid stored value: {0}")]
  Core(#[from] cram_core::Error),

  #[error("sqlite: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// The `options` column of a question is not a JSON string array.
  #[error("malformed question options: {0}")]
  Json(#[from] serde_json::Error),

  #[error("malformed id column: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("malformed timestamp: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
