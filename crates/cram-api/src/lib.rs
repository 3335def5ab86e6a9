//! JSON REST API for Cram.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`StudyStore`] and [`AuthStore`], and any [`TextModel`]. CORS, tracing
//! and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = cram_api::router(AppState::new(store, Generator::new(model)));
//! ```

pub mod auth;
pub mod error;
pub mod extract;
pub mod flashcards;
pub mod quizzes;
pub mod summaries;
pub mod upload;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::DefaultBodyLimit,
  routing::{get, post, put},
};
use cram_ai::{Generator, TextModel};
use cram_core::{
  content::MAX_UPLOAD_BYTES,
  store::{AuthStore, StudyStore},
};
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, M> {
  pub store:     Arc<S>,
  pub generator: Arc<Generator<M>>,
}

impl<S, M> AppState<S, M> {
  pub fn new(store: S, generator: Generator<M>) -> Self {
    Self { store: Arc::new(store), generator: Arc::new(generator) }
  }
}

impl<S, M> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      generator: Arc::clone(&self.generator),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: StudyStore + AuthStore + 'static,
  M: TextModel + 'static,
{
  let study = Router::new()
    .route("/summaries", post(summaries::create::<S, M>))
    .route("/summaries/user/{user_id}", get(summaries::list::<S, M>))
    .route(
      "/summaries/{id}",
      get(summaries::get_one::<S, M>).delete(summaries::delete::<S, M>),
    )
    .route("/quizzes", post(quizzes::create::<S, M>))
    .route("/quizzes/user/{user_id}", get(quizzes::list::<S, M>))
    .route(
      "/quizzes/{id}",
      get(quizzes::get_one::<S, M>).delete(quizzes::delete::<S, M>),
    )
    .route("/flashcards", post(flashcards::create::<S, M>))
    .route("/flashcards/user/{user_id}", get(flashcards::list::<S, M>))
    .route(
      "/flashcards/{id}",
      get(flashcards::get_one::<S, M>).delete(flashcards::delete::<S, M>),
    )
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + upload::MULTIPART_OVERHEAD));

  let auth = Router::new()
    .route("/user", post(auth::create_user::<S, M>))
    .route("/user/id/{id}", get(auth::get_user::<S, M>))
    .route("/user/email/{email}", get(auth::get_user_by_email::<S, M>))
    .route(
      "/user/{id}",
      put(auth::update_user::<S, M>).delete(auth::delete_user::<S, M>),
    )
    .route("/session", post(auth::create_session::<S, M>))
    .route(
      "/session/{token}",
      get(auth::get_session::<S, M>)
        .put(auth::update_session::<S, M>)
        .delete(auth::delete_session::<S, M>),
    )
    .route("/account", post(auth::link_account::<S, M>))
    .route(
      "/account/{provider}/{provider_account_id}",
      get(auth::get_account::<S, M>),
    );

  Router::new()
    .route("/health", get(health))
    .nest("/api/study", study)
    .nest("/api/auth", auth)
    .with_state(state)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "ok": true })) }

// ─── Shared helpers ──────────────────────────────────────────────────────────

/// Body of a successful study delete.
#[derive(Debug, Serialize)]
pub struct Message {
  pub message: &'static str,
}

impl Message {
  pub fn new(message: &'static str) -> Self { Self { message } }
}

/// Fail with 404 unless `user_id` names an existing user. Checked before
/// generation so an unknown user never costs a model call.
pub(crate) async fn require_user<S: AuthStore>(
  store: &S,
  user_id: Uuid,
  context: &'static str,
) -> Result<(), ApiError> {
  store
    .get_user(user_id)
    .await
    .map_err(ApiError::store(context))?
    .map(|_| ())
    .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

#[cfg(test)]
mod tests;
