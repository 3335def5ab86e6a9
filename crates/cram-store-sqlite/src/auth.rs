//! [`AuthStore`] for [`SqliteStore`].

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cram_core::{
  auth::{Account, NewAccount, NewSession, NewUser, Session, User, UserUpdate},
  store::AuthStore,
};

use crate::{
  Result,
  encode::{
    RawAccount, RawSession, RawUser, encode_dt, encode_uuid, truncate_dt,
  },
  store::SqliteStore,
};

const USER_COLUMNS: &str = "id, email, name, image, email_verified";

const SESSION_COLUMNS: &str = "id, session_token, user_id, expires";

const ACCOUNT_COLUMNS: &str = "id, user_id, type, provider, provider_account_id,
  refresh_token, access_token, expires_at, token_type, scope, id_token,
  session_state";

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    id:             row.get(0)?,
    email:          row.get(1)?,
    name:           row.get(2)?,
    image:          row.get(3)?,
    email_verified: row.get(4)?,
  })
}

fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSession> {
  Ok(RawSession {
    id:            row.get(0)?,
    session_token: row.get(1)?,
    user_id:       row.get(2)?,
    expires:       row.get(3)?,
  })
}

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAccount> {
  Ok(RawAccount {
    id:                  row.get(0)?,
    user_id:             row.get(1)?,
    kind:                row.get(2)?,
    provider:            row.get(3)?,
    provider_account_id: row.get(4)?,
    refresh_token:       row.get(5)?,
    access_token:        row.get(6)?,
    expires_at:          row.get(7)?,
    token_type:          row.get(8)?,
    scope:               row.get(9)?,
    id_token:            row.get(10)?,
    session_state:       row.get(11)?,
  })
}

fn query_user(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawUser>> {
  conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
      rusqlite::params![id],
      user_from_row,
    )
    .optional()
}

fn query_session(
  conn: &rusqlite::Connection,
  token: &str,
) -> rusqlite::Result<Option<RawSession>> {
  conn
    .query_row(
      &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_token = ?1"),
      rusqlite::params![token],
      session_from_row,
    )
    .optional()
}

impl AuthStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      id:             Uuid::new_v4(),
      email:          input.email,
      name:           input.name,
      image:          input.image,
      email_verified: input.email_verified.map(truncate_dt),
    };

    let id_str   = encode_uuid(user.id);
    let email    = user.email.clone();
    let name     = user.name.clone();
    let image    = user.image.clone();
    let verified = user.email_verified.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (id, email, name, image, email_verified)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email, name, image, verified],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(query_user(conn, &id_str)?))
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user_by_email(&self, email: String) -> Result<Option<User>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
              rusqlite::params![email],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>> {
    let id_str   = encode_uuid(id);
    let verified = update.email_verified.map(|dt| encode_dt(truncate_dt(dt)));

    let raw = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE users SET
             email          = COALESCE(?2, email),
             name           = COALESCE(?3, name),
             image          = COALESCE(?4, image),
             email_verified = COALESCE(?5, email_verified)
           WHERE id = ?1",
          rusqlite::params![id_str, update.email, update.name, update.image, verified],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(query_user(conn, &id_str)?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    // Accounts, sessions and study material cascade.
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM users WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    if n > 0 {
      tracing::info!(user_id = %id, "deleted user");
    }
    Ok(n > 0)
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, input: NewSession) -> Result<Session> {
    let session = Session {
      id:            Uuid::new_v4(),
      session_token: input.session_token,
      user_id:       input.user_id,
      expires:       truncate_dt(input.expires),
    };

    let id_str   = encode_uuid(session.id);
    let token    = session.session_token.clone();
    let user_str = encode_uuid(session.user_id);
    let expires  = encode_dt(session.expires);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (id, session_token, user_id, expires)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, token, user_str, expires],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn get_session(&self, session_token: String) -> Result<Option<Session>> {
    let raw = self
      .conn
      .call(move |conn| Ok(query_session(conn, &session_token)?))
      .await?;
    raw.map(RawSession::into_session).transpose()
  }

  async fn update_session_expiry(
    &self,
    session_token: String,
    expires: DateTime<Utc>,
  ) -> Result<Option<Session>> {
    let expires = encode_dt(truncate_dt(expires));

    let raw = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE sessions SET expires = ?2 WHERE session_token = ?1",
          rusqlite::params![session_token, expires],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(query_session(conn, &session_token)?)
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn delete_session(&self, session_token: String) -> Result<bool> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE session_token = ?1",
          rusqlite::params![session_token],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<Session>> {
    let user_str = encode_uuid(user_id);
    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SESSION_COLUMNS} FROM sessions
           WHERE user_id = ?1
           ORDER BY expires ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], session_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawSession::into_session).collect()
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn link_account(&self, input: NewAccount) -> Result<Account> {
    let account = Account {
      id:                  Uuid::new_v4(),
      user_id:             input.user_id,
      kind:                input.kind,
      provider:            input.provider,
      provider_account_id: input.provider_account_id,
      refresh_token:       input.refresh_token,
      access_token:        input.access_token,
      expires_at:          input.expires_at,
      token_type:          input.token_type,
      scope:               input.scope,
      id_token:            input.id_token,
      session_state:       input.session_state,
    };

    let a = account.clone();
    let id_str   = encode_uuid(a.id);
    let user_str = encode_uuid(a.user_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO accounts ({ACCOUNT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
          ),
          rusqlite::params![
            id_str,
            user_str,
            a.kind,
            a.provider,
            a.provider_account_id,
            a.refresh_token,
            a.access_token,
            a.expires_at,
            a.token_type,
            a.scope,
            a.id_token,
            a.session_state,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(account)
  }

  async fn get_account(
    &self,
    provider: String,
    provider_account_id: String,
  ) -> Result<Option<Account>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts
                 WHERE provider = ?1 AND provider_account_id = ?2"
              ),
              rusqlite::params![provider, provider_account_id],
              account_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawAccount::into_account).transpose()
  }

  async fn list_accounts(&self, user_id: Uuid) -> Result<Vec<Account>> {
    let user_str = encode_uuid(user_id);
    let raws: Vec<RawAccount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ACCOUNT_COLUMNS} FROM accounts
           WHERE user_id = ?1
           ORDER BY rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], account_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAccount::into_account).collect()
  }
}
