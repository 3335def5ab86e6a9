//! Handlers for `/api/auth` endpoints: the persistence side of the external
//! OAuth collaborator.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/user` | body: [`NewUser`] |
//! | `GET`    | `/user/id/{id}` | user with `accounts` and `sessions` |
//! | `GET`    | `/user/email/{email}` | same, by email |
//! | `PUT`    | `/user/{id}` | body: [`UserUpdate`] |
//! | `DELETE` | `/user/{id}` | cascades to everything the user owns |
//! | `POST`   | `/session` | body: [`NewSession`] |
//! | `GET`    | `/session/{sessionToken}` | session with `user` |
//! | `PUT`    | `/session/{sessionToken}` | body: `{"expires": ...}` |
//! | `DELETE` | `/session/{sessionToken}` | |
//! | `POST`   | `/account` | body: [`NewAccount`] |
//! | `GET`    | `/account/{provider}/{providerAccountId}` | account with `user` |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use cram_ai::TextModel;
use cram_core::{
  auth::{Account, NewAccount, NewSession, NewUser, Session, User, UserUpdate},
  store::{AuthStore, StudyStore},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiPath, record_id},
};

// ─── Response shapes ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UserProfile {
  #[serde(flatten)]
  pub user:     User,
  pub accounts: Vec<Account>,
  pub sessions: Vec<Session>,
}

#[derive(Debug, Serialize)]
pub struct SessionWithUser {
  #[serde(flatten)]
  pub session: Session,
  pub user:    User,
}

#[derive(Debug, Serialize)]
pub struct AccountWithUser {
  #[serde(flatten)]
  pub account: Account,
  pub user:    User,
}

#[derive(Debug, Serialize)]
pub struct Success {
  pub success: bool,
}

const SUCCESS: Json<Success> = Json(Success { success: true });

async fn load_profile<S: AuthStore>(store: &S, user: User) -> Result<UserProfile, ApiError> {
  let accounts = store
    .list_accounts(user.id)
    .await
    .map_err(ApiError::store("Failed to fetch user"))?;
  let sessions = store
    .list_sessions(user.id)
    .await
    .map_err(ApiError::store("Failed to fetch user"))?;
  Ok(UserProfile { user, accounts, sessions })
}

async fn load_user<S: AuthStore>(store: &S, id: Uuid) -> Result<User, ApiError> {
  store
    .get_user(id)
    .await
    .map_err(ApiError::store("Failed to fetch user"))?
    .ok_or_else(user_not_found)
}

fn user_not_found() -> ApiError { ApiError::NotFound("User not found".into()) }

// ─── Users ───────────────────────────────────────────────────────────────────

/// `POST /user`
pub async fn create_user<S, M>(
  State(state): State<AppState<S, M>>,
  ApiJson(body): ApiJson<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let user = state
    .store
    .create_user(body)
    .await
    .map_err(ApiError::store("Failed to create user"))?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /user/id/{id}`
pub async fn get_user<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(id): ApiPath<String>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let id = record_id(&id).ok_or_else(user_not_found)?;
  let user = load_user(&*state.store, id).await?;
  Ok(Json(load_profile(&*state.store, user).await?))
}

/// `GET /user/email/{email}`
pub async fn get_user_by_email<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(email): ApiPath<String>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let user = state
    .store
    .get_user_by_email(email)
    .await
    .map_err(ApiError::store("Failed to fetch user"))?
    .ok_or_else(user_not_found)?;
  Ok(Json(load_profile(&*state.store, user).await?))
}

/// `PUT /user/{id}`
pub async fn update_user<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(id): ApiPath<String>,
  ApiJson(body): ApiJson<UserUpdate>,
) -> Result<Json<User>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let id = record_id(&id).ok_or_else(user_not_found)?;
  let user = state
    .store
    .update_user(id, body)
    .await
    .map_err(ApiError::store("Failed to update user"))?
    .ok_or_else(user_not_found)?;
  Ok(Json(user))
}

/// `DELETE /user/{id}`
pub async fn delete_user<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(id): ApiPath<String>,
) -> Result<Json<Success>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  if let Some(id) = record_id(&id) {
    state
      .store
      .delete_user(id)
      .await
      .map_err(ApiError::store("Failed to delete user"))?;
  }
  Ok(SUCCESS)
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// `POST /session`
pub async fn create_session<S, M>(
  State(state): State<AppState<S, M>>,
  ApiJson(body): ApiJson<NewSession>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let session = state
    .store
    .create_session(body)
    .await
    .map_err(ApiError::store("Failed to create session"))?;
  Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /session/{sessionToken}`
pub async fn get_session<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(token): ApiPath<String>,
) -> Result<Json<SessionWithUser>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let session = state
    .store
    .get_session(token)
    .await
    .map_err(ApiError::store("Failed to fetch session"))?
    .ok_or_else(|| ApiError::NotFound("Session not found".into()))?;
  // Expiry is the auth collaborator's call; the row is returned either way.
  if session.is_expired_at(Utc::now()) {
    tracing::debug!(user_id = %session.user_id, expires = %session.expires, "returning expired session");
  }
  let user = load_user(&*state.store, session.user_id).await?;
  Ok(Json(SessionWithUser { session, user }))
}

#[derive(Debug, Deserialize)]
pub struct SessionUpdate {
  pub expires: DateTime<Utc>,
}

/// `PUT /session/{sessionToken}`
pub async fn update_session<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(token): ApiPath<String>,
  ApiJson(body): ApiJson<SessionUpdate>,
) -> Result<Json<Session>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let session = state
    .store
    .update_session_expiry(token, body.expires)
    .await
    .map_err(ApiError::store("Failed to update session"))?
    .ok_or_else(|| ApiError::NotFound("Session not found".into()))?;
  Ok(Json(session))
}

/// `DELETE /session/{sessionToken}`
pub async fn delete_session<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath(token): ApiPath<String>,
) -> Result<Json<Success>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  state
    .store
    .delete_session(token)
    .await
    .map_err(ApiError::store("Failed to delete session"))?;
  Ok(SUCCESS)
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// `POST /account`
pub async fn link_account<S, M>(
  State(state): State<AppState<S, M>>,
  ApiJson(body): ApiJson<NewAccount>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let account = state
    .store
    .link_account(body)
    .await
    .map_err(ApiError::store("Failed to link account"))?;
  Ok((StatusCode::CREATED, Json(account)))
}

/// `GET /account/{provider}/{providerAccountId}`
pub async fn get_account<S, M>(
  State(state): State<AppState<S, M>>,
  ApiPath((provider, provider_account_id)): ApiPath<(String, String)>,
) -> Result<Json<AccountWithUser>, ApiError>
where
  S: StudyStore + AuthStore,
  M: TextModel,
{
  let account = state
    .store
    .get_account(provider, provider_account_id)
    .await
    .map_err(ApiError::store("Failed to fetch account"))?
    .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;
  let user = load_user(&*state.store, account.user_id).await?;
  Ok(Json(AccountWithUser { account, user }))
}
