//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is `{"error": ..., "details": ...}`; `details` is
//! omitted when there is nothing to add.

use axum::{
  Json,
  extract::{
    multipart::{MultipartError, MultipartRejection},
    rejection::{JsonRejection, PathRejection},
  },
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cram_ai::GenerationError;
use cram_core::content::MAX_UPLOAD_BYTES;
use serde::Serialize;
use thiserror::Error;

const RATE_LIMITED: (&str, &str) = (
  "Rate limit exceeded. Please try again later.",
  "Too many requests. Please wait a moment before trying again.",
);

const OVERLOADED: (&str, &str) = (
  "AI service is temporarily overloaded. Please try again in a moment.",
  "The AI model is experiencing high traffic. Please wait a few seconds and try again.",
);

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  NotFound(String),

  /// An extractor rejected the request before a handler ran. `status` is
  /// the one axum chose, e.g. 422 for a body missing a required field.
  #[error("invalid request: {details}")]
  InvalidRequest { status: StatusCode, details: String },

  #[error("upload exceeds {MAX_UPLOAD_BYTES} bytes")]
  PayloadTooLarge,

  #[error("unsupported content type: {0}")]
  UnsupportedMediaType(String),

  /// `context` is the user-facing summary, e.g. "Failed to create quiz".
  #[error("{context}: {source}")]
  Generation {
    context: &'static str,
    #[source]
    source:  GenerationError,
  },

  #[error("{context}: {source}")]
  Store {
    context: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// `map_err` adapter for store failures.
  pub fn store<E>(context: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| Self::Store { context, source: Box::new(e) }
  }

  /// `map_err` adapter for generation failures.
  pub fn generation(context: &'static str) -> impl FnOnce(GenerationError) -> Self {
    move |source| Self::Generation { context, source }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::InvalidRequest { status, .. } => *status,
      Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
      Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
      Self::Generation { source, .. } => match source {
        GenerationError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        GenerationError::ServiceOverloaded => StatusCode::SERVICE_UNAVAILABLE,
        GenerationError::Malformed { .. } => StatusCode::BAD_GATEWAY,
        GenerationError::Failed(_) | GenerationError::ClientInit(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
      Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<cram_core::Error> for ApiError {
  fn from(e: cram_core::Error) -> Self {
    match e {
      cram_core::Error::UnsupportedContentType(ct) => Self::UnsupportedMediaType(ct),
      other => Self::BadRequest(other.to_string()),
    }
  }
}

impl From<MultipartError> for ApiError {
  fn from(e: MultipartError) -> Self {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
      Self::PayloadTooLarge
    } else {
      Self::BadRequest(e.body_text())
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self {
    Self::InvalidRequest { status: r.status(), details: r.body_text() }
  }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self {
    Self::InvalidRequest { status: r.status(), details: r.body_text() }
  }
}

impl From<MultipartRejection> for ApiError {
  fn from(r: MultipartRejection) -> Self {
    Self::InvalidRequest { status: r.status(), details: r.body_text() }
  }
}

#[derive(Serialize)]
struct ErrorBody {
  error:   String,
  #[serde(skip_serializing_if = "Option::is_none")]
  details: Option<String>,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let (error, details) = match &self {
      Self::BadRequest(m) | Self::NotFound(m) => (m.clone(), None),
      Self::InvalidRequest { details, .. } => ("Invalid request".to_owned(), Some(details.clone())),
      Self::PayloadTooLarge => (
        "File is too large".to_owned(),
        Some(format!("Uploads are limited to {} MiB", MAX_UPLOAD_BYTES / (1024 * 1024))),
      ),
      Self::UnsupportedMediaType(ct) => (
        "Unsupported file type".to_owned(),
        Some(format!("Only text/plain files are supported, got {ct}")),
      ),
      Self::Generation { context, source } => match source {
        GenerationError::RateLimited => {
          (RATE_LIMITED.0.to_owned(), Some(RATE_LIMITED.1.to_owned()))
        }
        GenerationError::ServiceOverloaded => {
          (OVERLOADED.0.to_owned(), Some(OVERLOADED.1.to_owned()))
        }
        other => ((*context).to_owned(), Some(other.to_string())),
      },
      Self::Store { context, source } => ((*context).to_owned(), Some(source.to_string())),
    };

    if status.is_server_error() {
      tracing::error!(status = status.as_u16(), error = %self, "request failed");
    }

    (status, Json(ErrorBody { error, details })).into_response()
  }
}
