//! The store traits.
//!
//! Implemented by storage backends (e.g. `cram-store-sqlite`). Higher layers
//! (`cram-api`, `cram-server`) depend on these abstractions, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  auth::{Account, NewAccount, NewSession, NewUser, Session, User, UserUpdate},
  study::{
    FlashcardSet, NewFlashcardSet, NewQuiz, NewSummary, Quiz, Summary,
  },
};

// ─── Study material ──────────────────────────────────────────────────────────

/// Persistence for generated study material.
///
/// There is no update operation: generated content is immutable. Lists are
/// scoped to one user and ordered newest first. Child rows are written in the
/// same transaction as their parent and returned ordered by `order`.
///
/// Deletes return whether a row existed; callers decide whether that matters.
pub trait StudyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Summaries ─────────────────────────────────────────────────────────

  fn create_summary(
    &self,
    input: NewSummary,
  ) -> impl Future<Output = Result<Summary, Self::Error>> + Send + '_;

  fn get_summary(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Summary>, Self::Error>> + Send + '_;

  fn list_summaries(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Summary>, Self::Error>> + Send + '_;

  fn delete_summary(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Quizzes ───────────────────────────────────────────────────────────

  /// Persist a quiz and its questions atomically. Question `order` is the
  /// position in `input.questions`.
  fn create_quiz(
    &self,
    input: NewQuiz,
  ) -> impl Future<Output = Result<Quiz, Self::Error>> + Send + '_;

  fn get_quiz(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Quiz>, Self::Error>> + Send + '_;

  fn list_quizzes(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Quiz>, Self::Error>> + Send + '_;

  /// Delete a quiz together with all of its questions.
  fn delete_quiz(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Flashcard sets ────────────────────────────────────────────────────

  fn create_flashcard_set(
    &self,
    input: NewFlashcardSet,
  ) -> impl Future<Output = Result<FlashcardSet, Self::Error>> + Send + '_;

  fn get_flashcard_set(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<FlashcardSet>, Self::Error>> + Send + '_;

  fn list_flashcard_sets(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FlashcardSet>, Self::Error>> + Send + '_;

  fn delete_flashcard_set(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Auth bookkeeping ────────────────────────────────────────────────────────

/// The capability interface the auth collaborator relies on: create, read,
/// update and delete for users, sessions and linked accounts.
///
/// Deleting a user cascades to everything the user owns, including study
/// material.
pub trait AuthStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Apply `update` and return the new state, or `None` if the user does
  /// not exist.
  fn update_user(
    &self,
    id: Uuid,
    update: UserUpdate,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn create_session(
    &self,
    input: NewSession,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Look up a session by token. Expired sessions are still returned.
  fn get_session(
    &self,
    session_token: String,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  fn update_session_expiry(
    &self,
    session_token: String,
    expires: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  fn delete_session(
    &self,
    session_token: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_sessions(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send + '_;

  // ── Accounts ──────────────────────────────────────────────────────────

  fn link_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  fn get_account(
    &self,
    provider: String,
    provider_account_id: String,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn list_accounts(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;
}
