//! Multipart form handling for the study creation endpoints.
//!
//! | Field | Notes |
//! |-------|-------|
//! | `userId` | required UUID |
//! | `sourceType` | `file` or `text`, default `text` |
//! | `title` | optional; empty means absent |
//! | `text` | for text sources |
//! | `file` | for file sources; original filename becomes `sourceData` |
//! | count field | `questionCount` / `cardCount`, integer in `1..=50` |

use axum::extract::Multipart;
use cram_ai::generator::MAX_ITEM_COUNT;
use cram_core::{
  content::{ContentSource, MAX_UPLOAD_BYTES},
  study::SourceType,
};
use uuid::Uuid;

use crate::error::ApiError;

/// Headroom above [`MAX_UPLOAD_BYTES`] for multipart framing and the other
/// form fields.
pub const MULTIPART_OVERHEAD: usize = 256 * 1024;

const DEFAULT_FILE_TYPE: &str = "application/octet-stream";

/// A validated study creation request.
#[derive(Debug)]
pub struct StudyForm {
  pub user_id: Uuid,
  pub title:   Option<String>,
  pub source:  ContentSource,
  /// The requested item count, when the endpoint takes one.
  pub count:   Option<usize>,
}

#[derive(Default)]
struct RawForm {
  user_id:     Option<String>,
  source_type: Option<String>,
  title:       Option<String>,
  text:        Option<String>,
  file:        Option<(String, String, Vec<u8>)>,
  count:       Option<String>,
}

/// Read every field of `multipart`. `count_field` names the item count
/// field for this endpoint, if it has one.
pub async fn read_study_form(
  mut multipart: Multipart,
  count_field: Option<&'static str>,
) -> Result<StudyForm, ApiError> {
  let mut raw = RawForm::default();

  while let Some(field) = multipart.next_field().await? {
    let Some(name) = field.name().map(str::to_owned) else {
      continue;
    };
    match name.as_str() {
      "userId" => raw.user_id = Some(field.text().await?),
      "sourceType" => raw.source_type = Some(field.text().await?),
      "title" => raw.title = Some(field.text().await?),
      "text" => raw.text = Some(field.text().await?),
      "file" => {
        let filename = field.file_name().unwrap_or("upload.txt").to_owned();
        let content_type = field.content_type().unwrap_or(DEFAULT_FILE_TYPE).to_owned();
        let data = field.bytes().await?;
        if data.len() > MAX_UPLOAD_BYTES {
          return Err(ApiError::PayloadTooLarge);
        }
        raw.file = Some((filename, content_type, data.to_vec()));
      }
      other if Some(other) == count_field => raw.count = Some(field.text().await?),
      other => tracing::debug!(field = other, "ignoring unknown form field"),
    }
  }

  raw.validate(count_field)
}

impl RawForm {
  fn validate(self, count_field: Option<&'static str>) -> Result<StudyForm, ApiError> {
    let user_id = match non_empty(self.user_id) {
      Some(id) => Uuid::parse_str(id.trim())
        .map_err(|_| ApiError::BadRequest("User ID must be a valid UUID".into()))?,
      None => return Err(ApiError::BadRequest("User ID is required".into())),
    };

    let source_type = match non_empty(self.source_type) {
      Some(s) => SourceType::parse(s.trim())?,
      None => SourceType::default(),
    };

    let source = match source_type {
      SourceType::File => {
        let (filename, content_type, data) = self.file.ok_or_else(|| {
          ApiError::BadRequest("File is required when sourceType is file".into())
        })?;
        ContentSource::File { filename, content_type, data }
      }
      SourceType::Text => {
        let text = non_empty(self.text).ok_or_else(|| {
          ApiError::BadRequest("Text is required when sourceType is text".into())
        })?;
        ContentSource::Text(text)
      }
    };

    let count = match (count_field, non_empty(self.count)) {
      (Some(field), Some(raw)) => Some(parse_count(field, &raw)?),
      _ => None,
    };

    Ok(StudyForm { user_id, title: non_empty(self.title), source, count })
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

fn parse_count(field: &str, raw: &str) -> Result<usize, ApiError> {
  raw
    .trim()
    .parse::<usize>()
    .ok()
    .filter(|n| (1..=MAX_ITEM_COUNT).contains(n))
    .ok_or_else(|| {
      ApiError::BadRequest(format!("{field} must be an integer between 1 and {MAX_ITEM_COUNT}"))
    })
}
