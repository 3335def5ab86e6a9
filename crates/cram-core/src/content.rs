//! Content extraction: turning a submitted source into plain text for the
//! generator.
//!
//! Only plain text is understood. There is no OCR and no document parsing;
//! anything that is not `text/plain` is rejected.

use crate::{Error, Result, study::SourceType};

/// Upper bound on an uploaded source. Enforced by the upload layer, which
/// knows the request framing; this module only exports the number.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const TEXT_PLAIN: &str = "text/plain";

/// A submitted source, tagged by how it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
  Text(String),
  File {
    /// Original filename as sent by the client.
    filename:     String,
    content_type: String,
    data:         Vec<u8>,
  },
}

impl ContentSource {
  pub fn source_type(&self) -> SourceType {
    match self {
      Self::Text(_) => SourceType::Text,
      Self::File { .. } => SourceType::File,
    }
  }

  /// The value persisted as `sourceData`: the raw text, or the filename.
  pub fn source_data(&self) -> &str {
    match self {
      Self::Text(text) => text,
      Self::File { filename, .. } => filename,
    }
  }

  /// Produce the plain-text payload to feed the generator.
  ///
  /// Text is passed through unchanged. Files must be `text/plain`; their
  /// bytes are decoded as UTF-8 with invalid sequences replaced.
  pub fn extract_text(&self) -> Result<String> {
    match self {
      Self::Text(text) => {
        if text.trim().is_empty() {
          return Err(Error::Validation(
            "Text is required when sourceType is text".into(),
          ));
        }
        Ok(text.clone())
      }
      Self::File { content_type, data, .. } => {
        if !is_plain_text(content_type) {
          return Err(Error::UnsupportedContentType(content_type.clone()));
        }
        if data.is_empty() {
          return Err(Error::Validation("Uploaded file is empty".into()));
        }
        Ok(String::from_utf8_lossy(data).into_owned())
      }
    }
  }
}

/// `true` for `text/plain` with or without parameters (e.g. `charset`).
pub fn is_plain_text(content_type: &str) -> bool {
  content_type
    .split(';')
    .next()
    .map(str::trim)
    .is_some_and(|essence| essence.eq_ignore_ascii_case(TEXT_PLAIN))
}
