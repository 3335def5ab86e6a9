//! [`SqliteStore`], the SQLite implementation of [`StudyStore`].
//!
//! The [`AuthStore`](cram_core::store::AuthStore) half lives in `auth.rs`.

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cram_core::{
  store::StudyStore,
  study::{
    Flashcard, FlashcardSet, NewFlashcardSet, NewQuiz, NewSummary, Question,
    Quiz, Summary,
  },
};

use crate::{
  Result,
  encode::{
    RawFlashcard, RawFlashcardSet, RawHeader, RawQuestion, RawQuiz, RawSummary,
    encode_dt, encode_options, encode_source_type, encode_uuid, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cram store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of question rows belonging to `quiz_id`, regardless of whether
  /// the quiz itself still exists.
  pub async fn count_questions(&self, quiz_id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(quiz_id);
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM questions WHERE quiz_id = ?1",
          rusqlite::params![id_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  /// Number of flashcard rows belonging to `set_id`.
  pub async fn count_flashcards(&self, set_id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(set_id);
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM flashcards WHERE set_id = ?1",
          rusqlite::params![id_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n as u64)
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

const SUMMARY_COLUMNS: &str =
  "id, user_id, title, source_type, source_data, created_at, content";

const HEADER_COLUMNS: &str =
  "id, user_id, title, source_type, source_data, created_at";

fn header_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawHeader> {
  Ok(RawHeader {
    id:          row.get(0)?,
    user_id:     row.get(1)?,
    title:       row.get(2)?,
    source_type: row.get(3)?,
    source_data: row.get(4)?,
    created_at:  row.get(5)?,
  })
}

fn summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSummary> {
  Ok(RawSummary { header: header_from_row(row)?, content: row.get(6)? })
}

fn load_questions(
  conn: &rusqlite::Connection,
  quiz_id: &str,
) -> rusqlite::Result<Vec<RawQuestion>> {
  let mut stmt = conn.prepare_cached(
    "SELECT id, quiz_id, question, options_json, correct_answer, explanation, position
     FROM questions
     WHERE quiz_id = ?1
     ORDER BY position ASC",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![quiz_id], |row| {
      Ok(RawQuestion {
        id:             row.get(0)?,
        quiz_id:        row.get(1)?,
        question:       row.get(2)?,
        options_json:   row.get(3)?,
        correct_answer: row.get(4)?,
        explanation:    row.get(5)?,
        position:       row.get(6)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn load_flashcards(
  conn: &rusqlite::Connection,
  set_id: &str,
) -> rusqlite::Result<Vec<RawFlashcard>> {
  let mut stmt = conn.prepare_cached(
    "SELECT id, set_id, front, back, position
     FROM flashcards
     WHERE set_id = ?1
     ORDER BY position ASC",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![set_id], |row| {
      Ok(RawFlashcard {
        id:       row.get(0)?,
        set_id:   row.get(1)?,
        front:    row.get(2)?,
        back:     row.get(3)?,
        position: row.get(4)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Headers of `table` owned by `user_id`, newest first; insertion order
/// breaks timestamp ties.
fn list_headers(
  conn: &rusqlite::Connection,
  table: &str,
  user_id: &str,
) -> rusqlite::Result<Vec<RawHeader>> {
  let sql = format!(
    "SELECT {HEADER_COLUMNS} FROM {table}
     WHERE user_id = ?1
     ORDER BY created_at DESC, rowid DESC"
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(rusqlite::params![user_id], header_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn get_header(
  conn: &rusqlite::Connection,
  table: &str,
  id: &str,
) -> rusqlite::Result<Option<RawHeader>> {
  let sql = format!("SELECT {HEADER_COLUMNS} FROM {table} WHERE id = ?1");
  conn
    .query_row(&sql, rusqlite::params![id], header_from_row)
    .optional()
}

// ─── StudyStore impl ─────────────────────────────────────────────────────────

impl StudyStore for SqliteStore {
  type Error = crate::Error;

  // ── Summaries ─────────────────────────────────────────────────────────────

  async fn create_summary(&self, input: NewSummary) -> Result<Summary> {
    let summary = Summary {
      id:          Uuid::new_v4(),
      user_id:     input.user_id,
      title:       input.title,
      content:     input.content,
      source_type: input.source_type,
      source_data: input.source_data,
      created_at:  now(),
    };

    let id_str      = encode_uuid(summary.id);
    let user_str    = encode_uuid(summary.user_id);
    let title       = summary.title.clone();
    let content     = summary.content.clone();
    let source_type = encode_source_type(summary.source_type);
    let source_data = summary.source_data.clone();
    let at_str      = encode_dt(summary.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO summaries (
             id, user_id, title, content, source_type, source_data, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            user_str,
            title,
            content,
            source_type,
            source_data,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(summary)
  }

  async fn get_summary(&self, id: Uuid) -> Result<Option<Summary>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSummary> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUMMARY_COLUMNS} FROM summaries WHERE id = ?1"),
              rusqlite::params![id_str],
              summary_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSummary::into_summary).transpose()
  }

  async fn list_summaries(&self, user_id: Uuid) -> Result<Vec<Summary>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUMMARY_COLUMNS} FROM summaries
           WHERE user_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], summary_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  async fn delete_summary(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM summaries WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  // ── Quizzes ───────────────────────────────────────────────────────────────

  async fn create_quiz(&self, input: NewQuiz) -> Result<Quiz> {
    let quiz_id = Uuid::new_v4();
    let questions: Vec<Question> = input
      .questions
      .into_iter()
      .enumerate()
      .map(|(i, q)| Question {
        id:             Uuid::new_v4(),
        quiz_id,
        question:       q.question,
        options:        q.options,
        correct_answer: q.correct_answer,
        explanation:    q.explanation,
        order:          i as u32,
      })
      .collect();

    let quiz = Quiz {
      id: quiz_id,
      user_id: input.user_id,
      title: input.title,
      source_type: input.source_type,
      source_data: input.source_data,
      created_at: now(),
      questions,
    };

    let header = (
      encode_uuid(quiz.id),
      encode_uuid(quiz.user_id),
      quiz.title.clone(),
      encode_source_type(quiz.source_type),
      quiz.source_data.clone(),
      encode_dt(quiz.created_at),
    );
    let rows = quiz
      .questions
      .iter()
      .map(|q| -> Result<_> {
        Ok((
          encode_uuid(q.id),
          q.question.clone(),
          encode_options(&q.options)?,
          q.correct_answer.clone(),
          q.explanation.clone(),
          q.order,
        ))
      })
      .collect::<Result<Vec<_>>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let (id, user_id, title, source_type, source_data, created_at) = header;
        tx.execute(
          "INSERT INTO quizzes (id, user_id, title, source_type, source_data, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id, user_id, title, source_type, source_data, created_at],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO questions (
               id, quiz_id, question, options_json, correct_answer, explanation, position
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for (qid, question, options, correct, explanation, position) in rows {
            stmt.execute(rusqlite::params![
              qid,
              id,
              question,
              options,
              correct,
              explanation,
              position,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(quiz)
  }

  async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawQuiz> = self
      .conn
      .call(move |conn| {
        let Some(header) = get_header(conn, "quizzes", &id_str)? else {
          return Ok(None);
        };
        let questions = load_questions(conn, &id_str)?;
        Ok(Some(RawQuiz { header, questions }))
      })
      .await?;

    raw.map(RawQuiz::into_quiz).transpose()
  }

  async fn list_quizzes(&self, user_id: Uuid) -> Result<Vec<Quiz>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawQuiz> = self
      .conn
      .call(move |conn| {
        let headers = list_headers(conn, "quizzes", &user_str)?;
        let mut quizzes = Vec::with_capacity(headers.len());
        for header in headers {
          let questions = load_questions(conn, &header.id)?;
          quizzes.push(RawQuiz { header, questions });
        }
        Ok(quizzes)
      })
      .await?;

    raws.into_iter().map(RawQuiz::into_quiz).collect()
  }

  async fn delete_quiz(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    // Questions go with it via ON DELETE CASCADE.
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM quizzes WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  // ── Flashcard sets ────────────────────────────────────────────────────────

  async fn create_flashcard_set(&self, input: NewFlashcardSet) -> Result<FlashcardSet> {
    let set_id = Uuid::new_v4();
    let flashcards: Vec<Flashcard> = input
      .flashcards
      .into_iter()
      .enumerate()
      .map(|(i, c)| Flashcard {
        id:               Uuid::new_v4(),
        flashcard_set_id: set_id,
        front:            c.front,
        back:             c.back,
        order:            i as u32,
      })
      .collect();

    let set = FlashcardSet {
      id: set_id,
      user_id: input.user_id,
      title: input.title,
      source_type: input.source_type,
      source_data: input.source_data,
      created_at: now(),
      flashcards,
    };

    let header = (
      encode_uuid(set.id),
      encode_uuid(set.user_id),
      set.title.clone(),
      encode_source_type(set.source_type),
      set.source_data.clone(),
      encode_dt(set.created_at),
    );
    let rows: Vec<_> = set
      .flashcards
      .iter()
      .map(|c| (encode_uuid(c.id), c.front.clone(), c.back.clone(), c.order))
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let (id, user_id, title, source_type, source_data, created_at) = header;
        tx.execute(
          "INSERT INTO flashcard_sets (id, user_id, title, source_type, source_data, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id, user_id, title, source_type, source_data, created_at],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO flashcards (id, set_id, front, back, position)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (cid, front, back, position) in rows {
            stmt.execute(rusqlite::params![cid, id, front, back, position])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(set)
  }

  async fn get_flashcard_set(&self, id: Uuid) -> Result<Option<FlashcardSet>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawFlashcardSet> = self
      .conn
      .call(move |conn| {
        let Some(header) = get_header(conn, "flashcard_sets", &id_str)? else {
          return Ok(None);
        };
        let flashcards = load_flashcards(conn, &id_str)?;
        Ok(Some(RawFlashcardSet { header, flashcards }))
      })
      .await?;

    raw.map(RawFlashcardSet::into_set).transpose()
  }

  async fn list_flashcard_sets(&self, user_id: Uuid) -> Result<Vec<FlashcardSet>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawFlashcardSet> = self
      .conn
      .call(move |conn| {
        let headers = list_headers(conn, "flashcard_sets", &user_str)?;
        let mut sets = Vec::with_capacity(headers.len());
        for header in headers {
          let flashcards = load_flashcards(conn, &header.id)?;
          sets.push(RawFlashcardSet { header, flashcards });
        }
        Ok(sets)
      })
      .await?;

    raws.into_iter().map(RawFlashcardSet::into_set).collect()
  }

  async fn delete_flashcard_set(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM flashcard_sets WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }
}
