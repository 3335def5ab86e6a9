//! Auth bookkeeping records: users, linked OAuth accounts, and sessions.
//!
//! The OAuth flow itself lives in an external collaborator; this backend only
//! persists what that collaborator hands it. Field names on the wire follow
//! the collaborator's adapter contract, which is why the account token fields
//! keep their snake_case names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── User ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:             Uuid,
  pub email:          String,
  pub name:           Option<String>,
  pub image:          Option<String>,
  pub email_verified: Option<DateTime<Utc>>,
}

/// Input to [`crate::store::AuthStore::create_user`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
  pub email:          String,
  pub name:           Option<String>,
  pub image:          Option<String>,
  pub email_verified: Option<DateTime<Utc>>,
}

impl NewUser {
  pub fn new(email: impl Into<String>) -> Self {
    Self {
      email:          email.into(),
      name:           None,
      image:          None,
      email_verified: None,
    }
  }
}

/// Partial update for a user; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
  pub email:          Option<String>,
  pub name:           Option<String>,
  pub image:          Option<String>,
  pub email_verified: Option<DateTime<Utc>>,
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// Links a user to an identity at an OAuth provider. The pair
/// (`provider`, `provider_account_id`) is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
  pub id:                  Uuid,
  pub user_id:             Uuid,
  /// Account type as reported by the auth collaborator, e.g. `"oauth"`.
  #[serde(rename = "type")]
  pub kind:                String,
  pub provider:            String,
  pub provider_account_id: String,
  #[serde(rename = "refresh_token")]
  pub refresh_token:       Option<String>,
  #[serde(rename = "access_token")]
  pub access_token:        Option<String>,
  /// Seconds since the Unix epoch.
  #[serde(rename = "expires_at")]
  pub expires_at:          Option<i64>,
  #[serde(rename = "token_type")]
  pub token_type:          Option<String>,
  pub scope:               Option<String>,
  #[serde(rename = "id_token")]
  pub id_token:            Option<String>,
  #[serde(rename = "session_state")]
  pub session_state:       Option<String>,
}

/// Input to [`crate::store::AuthStore::link_account`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
  pub user_id:             Uuid,
  #[serde(rename = "type")]
  pub kind:                String,
  pub provider:            String,
  pub provider_account_id: String,
  #[serde(rename = "refresh_token", default)]
  pub refresh_token:       Option<String>,
  #[serde(rename = "access_token", default)]
  pub access_token:        Option<String>,
  #[serde(rename = "expires_at", default)]
  pub expires_at:          Option<i64>,
  #[serde(rename = "token_type", default)]
  pub token_type:          Option<String>,
  #[serde(default)]
  pub scope:               Option<String>,
  #[serde(rename = "id_token", default)]
  pub id_token:            Option<String>,
  #[serde(rename = "session_state", default)]
  pub session_state:       Option<String>,
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// A browser session. `expires` is advisory: nothing sweeps expired rows,
/// the auth collaborator decides what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub id:            Uuid,
  pub session_token: String,
  pub user_id:       Uuid,
  pub expires:       DateTime<Utc>,
}

impl Session {
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { self.expires <= now }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
  pub session_token: String,
  pub user_id:       Uuid,
  pub expires:       DateTime<Utc>,
}
