//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings with microsecond
//! precision and a `Z` suffix, so lexical order equals chronological order.
//! Question options are stored as a compact JSON array. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use cram_core::{
  auth::{Account, Session, User},
  study::{Flashcard, FlashcardSet, Question, Quiz, SourceType, Summary},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps, so a freshly created
/// record compares equal to the same record read back.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn truncate_dt(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── SourceType ──────────────────────────────────────────────────────────────

pub fn encode_source_type(t: SourceType) -> &'static str {
  match t {
    SourceType::File => "file",
    SourceType::Text => "text",
  }
}

pub fn decode_source_type(s: &str) -> Result<SourceType> {
  Ok(SourceType::parse(s)?)
}

// ─── Options ─────────────────────────────────────────────────────────────────

pub fn encode_options(options: &[String]) -> Result<String> {
  Ok(serde_json::to_string(options)?)
}

pub fn decode_options(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Columns shared by `summaries`, `quizzes` and `flashcard_sets`, minus the
/// summary's `content`.
pub struct RawHeader {
  pub id:          String,
  pub user_id:     String,
  pub title:       String,
  pub source_type: String,
  pub source_data: String,
  pub created_at:  String,
}

pub struct DecodedHeader {
  pub id:          Uuid,
  pub user_id:     Uuid,
  pub title:       String,
  pub source_type: SourceType,
  pub source_data: String,
  pub created_at:  DateTime<Utc>,
}

impl RawHeader {
  pub fn decode(self) -> Result<DecodedHeader> {
    Ok(DecodedHeader {
      id:          decode_uuid(&self.id)?,
      user_id:     decode_uuid(&self.user_id)?,
      title:       self.title,
      source_type: decode_source_type(&self.source_type)?,
      source_data: self.source_data,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawSummary {
  pub header:  RawHeader,
  pub content: String,
}

impl RawSummary {
  pub fn into_summary(self) -> Result<Summary> {
    let h = self.header.decode()?;
    Ok(Summary {
      id:          h.id,
      user_id:     h.user_id,
      title:       h.title,
      content:     self.content,
      source_type: h.source_type,
      source_data: h.source_data,
      created_at:  h.created_at,
    })
  }
}

pub struct RawQuestion {
  pub id:             String,
  pub quiz_id:        String,
  pub question:       String,
  pub options_json:   String,
  pub correct_answer: String,
  pub explanation:    String,
  pub position:       u32,
}

impl RawQuestion {
  pub fn into_question(self) -> Result<Question> {
    Ok(Question {
      id:             decode_uuid(&self.id)?,
      quiz_id:        decode_uuid(&self.quiz_id)?,
      question:       self.question,
      options:        decode_options(&self.options_json)?,
      correct_answer: self.correct_answer,
      explanation:    self.explanation,
      order:          self.position,
    })
  }
}

pub struct RawQuiz {
  pub header:    RawHeader,
  pub questions: Vec<RawQuestion>,
}

impl RawQuiz {
  pub fn into_quiz(self) -> Result<Quiz> {
    let h = self.header.decode()?;
    Ok(Quiz {
      id:          h.id,
      user_id:     h.user_id,
      title:       h.title,
      source_type: h.source_type,
      source_data: h.source_data,
      created_at:  h.created_at,
      questions:   self
        .questions
        .into_iter()
        .map(RawQuestion::into_question)
        .collect::<Result<_>>()?,
    })
  }
}

pub struct RawFlashcard {
  pub id:       String,
  pub set_id:   String,
  pub front:    String,
  pub back:     String,
  pub position: u32,
}

impl RawFlashcard {
  pub fn into_flashcard(self) -> Result<Flashcard> {
    Ok(Flashcard {
      id:               decode_uuid(&self.id)?,
      flashcard_set_id: decode_uuid(&self.set_id)?,
      front:            self.front,
      back:             self.back,
      order:            self.position,
    })
  }
}

pub struct RawFlashcardSet {
  pub header:     RawHeader,
  pub flashcards: Vec<RawFlashcard>,
}

impl RawFlashcardSet {
  pub fn into_set(self) -> Result<FlashcardSet> {
    let h = self.header.decode()?;
    Ok(FlashcardSet {
      id:          h.id,
      user_id:     h.user_id,
      title:       h.title,
      source_type: h.source_type,
      source_data: h.source_data,
      created_at:  h.created_at,
      flashcards:  self
        .flashcards
        .into_iter()
        .map(RawFlashcard::into_flashcard)
        .collect::<Result<_>>()?,
    })
  }
}

pub struct RawUser {
  pub id:             String,
  pub email:          String,
  pub name:           Option<String>,
  pub image:          Option<String>,
  pub email_verified: Option<String>,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:             decode_uuid(&self.id)?,
      email:          self.email,
      name:           self.name,
      image:          self.image,
      email_verified: self.email_verified.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub struct RawSession {
  pub id:            String,
  pub session_token: String,
  pub user_id:       String,
  pub expires:       String,
}

impl RawSession {
  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      id:            decode_uuid(&self.id)?,
      session_token: self.session_token,
      user_id:       decode_uuid(&self.user_id)?,
      expires:       decode_dt(&self.expires)?,
    })
  }
}

pub struct RawAccount {
  pub id:                  String,
  pub user_id:             String,
  pub kind:                String,
  pub provider:            String,
  pub provider_account_id: String,
  pub refresh_token:       Option<String>,
  pub access_token:        Option<String>,
  pub expires_at:          Option<i64>,
  pub token_type:          Option<String>,
  pub scope:               Option<String>,
  pub id_token:            Option<String>,
  pub session_state:       Option<String>,
}

impl RawAccount {
  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      id:                  decode_uuid(&self.id)?,
      user_id:             decode_uuid(&self.user_id)?,
      kind:                self.kind,
      provider:            self.provider,
      provider_account_id: self.provider_account_id,
      refresh_token:       self.refresh_token,
      access_token:        self.access_token,
      expires_at:          self.expires_at,
      token_type:          self.token_type,
      scope:               self.scope,
      id_token:            self.id_token,
      session_state:       self.session_state,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone as _;

  #[test]
  fn timestamps_are_fixed_width() {
    let a = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(encode_dt(a), "2024-01-02T03:04:05.000000Z");
  }

  #[test]
  fn timestamps_sort_lexically() {
    let earlier = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let later = earlier + chrono::Duration::microseconds(1);
    assert!(encode_dt(earlier) < encode_dt(later));
  }

  #[test]
  fn timestamp_roundtrip_at_store_precision() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }

  #[test]
  fn bad_timestamp_is_a_date_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn unknown_source_type_is_a_core_error() {
    assert!(matches!(
      decode_source_type("pdf"),
      Err(Error::Core(cram_core::Error::UnknownSourceType(_)))
    ));
  }
}
