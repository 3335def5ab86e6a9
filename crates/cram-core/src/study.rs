//! Study material: the records produced by the generation pipeline.
//!
//! Every record is created in one shot from a generation result and is never
//! updated afterwards; regenerating means creating a new record. Child rows
//! (questions, flashcards) carry a 0-based `order` that is contiguous within
//! their parent.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Source ──────────────────────────────────────────────────────────────────

/// Where the material was generated from.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceType {
  /// An uploaded plain-text file; `source_data` holds its original filename.
  File,
  /// Text pasted by the user; `source_data` holds the text itself.
  #[default]
  Text,
}

impl SourceType {
  /// Parse the wire form (`"file"` or `"text"`).
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownSourceType(s.to_owned()))
  }
}

/// Trimmed exact-string comparison between a chosen option and the stored
/// correct answer. This is the only notion of correctness in the system.
pub fn answer_matches(selected: &str, correct: &str) -> bool {
  selected.trim() == correct.trim()
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
  pub id:          Uuid,
  pub user_id:     Uuid,
  pub title:       String,
  pub content:     String,
  pub source_type: SourceType,
  pub source_data: String,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::StudyStore::create_summary`].
#[derive(Debug, Clone)]
pub struct NewSummary {
  pub user_id:     Uuid,
  pub title:       String,
  pub content:     String,
  pub source_type: SourceType,
  pub source_data: String,
}

// ─── Quiz ────────────────────────────────────────────────────────────────────

/// A multiple-choice question belonging to a [`Quiz`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id:             Uuid,
  pub quiz_id:        Uuid,
  pub question:       String,
  /// Ordered answer options; generated quizzes always have four.
  pub options:        Vec<String>,
  /// Full text of the correct option (not a letter or index).
  pub correct_answer: String,
  pub explanation:    String,
  pub order:          u32,
}

impl Question {
  /// Index of the option matching `correct_answer`, if any.
  ///
  /// `None` means the model produced an answer that is not among the
  /// options; such questions are stored as-is and can never be answered
  /// correctly.
  pub fn answer_index(&self) -> Option<usize> {
    self
      .options
      .iter()
      .position(|o| answer_matches(o, &self.correct_answer))
  }

  pub fn is_correct(&self, selected: &str) -> bool {
    answer_matches(selected, &self.correct_answer)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
  pub id:          Uuid,
  pub user_id:     Uuid,
  pub title:       String,
  pub source_type: SourceType,
  pub source_data: String,
  pub created_at:  DateTime<Utc>,
  /// Ordered by `order` ascending.
  pub questions:   Vec<Question>,
}

/// A question as produced by the generator, before it has an id or position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
  pub question:       String,
  pub options:        Vec<String>,
  pub correct_answer: String,
  pub explanation:    String,
}

impl NewQuestion {
  pub fn answer_index(&self) -> Option<usize> {
    self
      .options
      .iter()
      .position(|o| answer_matches(o, &self.correct_answer))
  }
}

/// Input to [`crate::store::StudyStore::create_quiz`]. Questions receive
/// their `order` from their position in `questions`.
#[derive(Debug, Clone)]
pub struct NewQuiz {
  pub user_id:     Uuid,
  pub title:       String,
  pub source_type: SourceType,
  pub source_data: String,
  pub questions:   Vec<NewQuestion>,
}

// ─── Flashcards ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
  pub id:               Uuid,
  pub flashcard_set_id: Uuid,
  /// A question or term.
  pub front:            String,
  /// The answer or definition.
  pub back:             String,
  pub order:            u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSet {
  pub id:          Uuid,
  pub user_id:     Uuid,
  pub title:       String,
  pub source_type: SourceType,
  pub source_data: String,
  pub created_at:  DateTime<Utc>,
  /// Ordered by `order` ascending.
  pub flashcards:  Vec<Flashcard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlashcard {
  pub front: String,
  pub back:  String,
}

/// Input to [`crate::store::StudyStore::create_flashcard_set`].
#[derive(Debug, Clone)]
pub struct NewFlashcardSet {
  pub user_id:     Uuid,
  pub title:       String,
  pub source_type: SourceType,
  pub source_data: String,
  pub flashcards:  Vec<NewFlashcard>,
}
