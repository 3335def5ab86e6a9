//! Error type for `cram-ai`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
  /// The model provider rejected the call for quota reasons.
  #[error("model rate limit exceeded")]
  RateLimited,

  /// The model provider is temporarily unavailable.
  #[error("model service overloaded")]
  ServiceOverloaded,

  /// Any other upstream failure; carries the provider's message.
  #[error("{0}")]
  Failed(String),

  /// The model answered, but not in the shape the task asked for.
  #[error("malformed model response ({context}): {details}")]
  Malformed { context: &'static str, details: String },

  #[error("model client initialization failed: {0}")]
  ClientInit(String),
}

impl GenerationError {
  pub(crate) fn malformed(context: &'static str, details: impl Into<String>) -> Self {
    Self::Malformed { context, details: details.into() }
  }
}

pub type Result<T, E = GenerationError> = std::result::Result<T, E>;
