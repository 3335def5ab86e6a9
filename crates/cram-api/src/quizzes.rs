//! Handlers for `/api/study/quizzes` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/quizzes` | multipart, plus optional `questionCount` (default 5) |
//! | `GET`    | `/quizzes/user/{userId}` | newest first |
//! | `GET`    | `/quizzes/{id}` | 404 if not found |
//! | `DELETE` | `/quizzes/{id}` | succeeds whether or not it existed |

use axum::{
  Json,
  extract::{Multipart, State, multipart::MultipartRejection},
  http::StatusCode,
  response::IntoResponse,
};
use cram_ai::TextModel;
use cram_core::{
  store::{AuthStore, StudyStore},
  study::{NewQuiz, Quiz},
};

use crate::{
  AppState, Message,
  error::ApiError,
  extract::{ApiPath, record_id},
  require_user,
  upload::read_study_form,
};

/// `POST /quizzes`
pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  const FAILED: &str = "Failed to create quiz";

  let form = read_study_form(multipart?, Some("questionCount")).await?;
  let text = form.source.extract_text()?;
  require_user(&*state.store, form.user_id, FAILED).await?;

  let generated = state
    .generator
    .generate_quiz(&text, form.title, form.count)
    .await
    .map_err(ApiError::generation(FAILED))?;

  let quiz = state
    .store
    .create_quiz(NewQuiz {
      user_id:     form.user_id,
      title:       generated.title,
      source_type: form.source.source_type(),
      source_data: form.source.source_data().to_owned(),
      questions:   generated.questions,
    })
    .await
    .map_err(ApiError::store(FAILED))?;

  tracing::info!(
    id = %quiz.id,
    user_id = %quiz.user_id,
    questions = quiz.questions.len(),
    "created quiz"
  );
  Ok((StatusCode::CREATED, Json(quiz)))
}

/// `GET /quizzes/user/{userId}`
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(user_id): ApiPath<String>,
) -> Result<Json<Vec<Quiz>>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let Some(user_id) = record_id(&user_id) else { return Ok(Json(Vec::new())) };
  let quizzes = state
    .store
    .list_quizzes(user_id)
    .await
    .map_err(ApiError::store("Failed to fetch quizzes"))?;
  Ok(Json(quizzes))
}

/// `GET /quizzes/{id}`
pub async fn get_one<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(id): ApiPath<String>,
) -> Result<Json<Quiz>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let not_found = || ApiError::NotFound("Quiz not found".into());
  let id = record_id(&id).ok_or_else(not_found)?;
  let quiz = state
    .store
    .get_quiz(id)
    .await
    .map_err(ApiError::store("Failed to fetch quiz"))?
    .ok_or_else(not_found)?;
  Ok(Json(quiz))
}

/// `DELETE /quizzes/{id}`
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
      .delete_quiz(uuid)
      .await
      .map_err(ApiError::store("Failed to delete quiz"))?,
    None => false,
  };
  if !existed {
    tracing::debug!(%id, "delete of absent quiz");
  }
  Ok(Json(Message::new("Quiz deleted successfully")))
}
