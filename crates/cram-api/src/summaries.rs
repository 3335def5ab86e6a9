//! Handlers for `/api/study/summaries` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/summaries` | multipart, see [`crate::upload`] |
//! | `GET`    | `/summaries/user/{userId}` | newest first |
//! | `GET`    | `/summaries/{id}` | 404 if not found |
//! | `DELETE` | `/summaries/{id}` | succeeds whether or not it existed |

use axum::{
  Json,
  extract::{Multipart, State, multipart::MultipartRejection},
  http::StatusCode,
  response::IntoResponse,
};
use cram_ai::TextModel;
use cram_core::{
  store::{AuthStore, StudyStore},
  study::{NewSummary, Summary},
};

use crate::{
  AppState, Message,
  error::ApiError,
  extract::{ApiPath, record_id},
  require_user,
  upload::read_study_form,
};

/// `POST /summaries`
pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  const FAILED: &str = "Failed to create summary";

  let form = read_study_form(multipart?, None).await?;
  let text = form.source.extract_text()?;
  require_user(&*state.store, form.user_id, FAILED).await?;

  let generated = state
    .generator
    .summarize(&text, form.title)
    .await
    .map_err(ApiError::generation(FAILED))?;

  let summary = state
    .store
    .create_summary(NewSummary {
      user_id:     form.user_id,
      title:       generated.title,
      content:     generated.content,
      source_type: form.source.source_type(),
      source_data: form.source.source_data().to_owned(),
    })
    .await
    .map_err(ApiError::store(FAILED))?;

  tracing::info!(id = %summary.id, user_id = %summary.user_id, "created summary");
  Ok((StatusCode::CREATED, Json(summary)))
}

/// `GET /summaries/user/{userId}`
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(user_id): ApiPath<String>,
) -> Result<Json<Vec<Summary>>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let Some(user_id) = record_id(&user_id) else { return Ok(Json(Vec::new())) };
  let summaries = state
    .store
    .list_summaries(user_id)
    .await
    .map_err(ApiError::store("Failed to fetch summaries"))?;
  Ok(Json(summaries))
}

/// `GET /summaries/{id}`
pub async fn get_one<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(id): ApiPath<String>,
) -> Result<Json<Summary>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let not_found = || ApiError::NotFound("Summary not found".into());
  let id = record_id(&id).ok_or_else(not_found)?;
  let summary = state
    .store
    .get_summary(id)
    .await
    .map_err(ApiError::store("Failed to fetch summary"))?
    .ok_or_else(not_found)?;
  Ok(Json(summary))
}

/// `DELETE /summaries/{id}`
pub async fn delete<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(id): ApiPath<String>,
) -> Result<Json<Message>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let existed = match record_id(&id) {
    Some(uuid) => state
      .store
      .delete_summary(uuid)
      .await
      .map_err(ApiError::store("Failed to delete summary"))?,
    None => false,
  };
  if !existed {
    tracing::debug!(%id, "delete of absent summary");
  }
  Ok(Json(Message::new("Summary deleted successfully")))
}
