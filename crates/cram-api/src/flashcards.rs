//! Handlers for `/api/study/flashcards` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/flashcards` | multipart, plus optional `cardCount` (default 10) |
//! | `GET`    | `/flashcards/user/{userId}` | newest first |
//! | `GET`    | `/flashcards/{id}` | 404 if not found |
//! | `DELETE` | `/flashcards/{id}` | succeeds whether or not it existed |

use axum::{
  Json,
  extract::{Multipart, State, multipart::MultipartRejection},
  http::StatusCode,
  response::IntoResponse,
};
use cram_ai::TextModel;
use cram_core::{
  store::{AuthStore, StudyStore},
  study::{FlashcardSet, NewFlashcardSet},
};

use crate::{
  AppState, Message,
  error::ApiError,
  extract::{ApiPath, record_id},
  require_user,
  upload::read_study_form,
};

/// `POST /flashcards`
pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  const FAILED: &str = "Failed to create flashcards";

  let form = read_study_form(multipart?, Some("cardCount")).await?;
  let text = form.source.extract_text()?;
  require_user(&*state.store, form.user_id, FAILED).await?;

  let generated = state
    .generator
    .generate_flashcards(&text, form.title, form.count)
    .await
    .map_err(ApiError::generation(FAILED))?;

  let set = state
    .store
    .create_flashcard_set(NewFlashcardSet {
      user_id:     form.user_id,
      title:       generated.title,
      source_type: form.source.source_type(),
      source_data: form.source.source_data().to_owned(),
      flashcards:  generated.flashcards,
    })
    .await
    .map_err(ApiError::store(FAILED))?;

  tracing::info!(id = %set.id, cards = set.flashcards.len(), "created flashcard set");
  Ok((StatusCode::CREATED, Json(set)))
}

/// `GET /flashcards/user/{userId}`
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(user_id): ApiPath<String>,
) -> Result<Json<Vec<FlashcardSet>>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let Some(user_id) = record_id(&user_id) else { return Ok(Json(Vec::new())) };
  let sets = state
    .store
    .list_flashcard_sets(user_id)
    .await
    .map_err(ApiError::store("Failed to fetch flashcard sets"))?;
  Ok(Json(sets))
}

/// `GET /flashcards/{id}`
pub async fn get_one<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(id): ApiPath<String>,
) -> Result<Json<FlashcardSet>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let not_found = || ApiError::NotFound("Flashcard set not found".into());
  let id = record_id(&id).ok_or_else(not_found)?;
  let set = state
    .store
    .get_flashcard_set(id)
    .await
    .map_err(ApiError::store("Failed to fetch flashcard set"))?
    .ok_or_else(not_found)?;
  Ok(Json(set))
}

/// `DELETE /flashcards/{id}`
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
      .delete_flashcard_set(uuid)
      .await
      .map_err(ApiError::store("Failed to delete flashcard set"))?,
    None => false,
  };
  if !existed {
    tracing::debug!(%id, "delete of absent flashcard set");
  }
  Ok(Json(Message::new("Flashcard set deleted successfully")))
}
