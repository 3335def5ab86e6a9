//! The seam between the generator and a concrete model provider.

use std::future::Future;

use crate::GenerationError;

/// A generative text model: one prompt in, one completion out.
///
/// Implementations map provider failures onto [`GenerationError`] and must
/// not retry.
pub trait TextModel: Send + Sync {
  fn generate(
    &self,
    prompt: String,
  ) -> impl Future<Output = Result<String, GenerationError>> + Send + '_;
}
