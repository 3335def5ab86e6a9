//! The three generation tasks: summarize, quiz, flashcards.

use cram_core::study::{NewFlashcard, NewQuestion};

use crate::{GenerationError, Result, TextModel, parse, prompt};

pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const DEFAULT_CARD_COUNT: usize = 10;
/// Largest item count a caller may request for a quiz or flashcard set.
pub const MAX_ITEM_COUNT: usize = 50;

const DEFAULT_SUMMARY_TITLE: &str = "Summary";
const DEFAULT_QUIZ_TITLE: &str = "Quiz";
const DEFAULT_FLASHCARDS_TITLE: &str = "Flashcards";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSummary {
  pub title:   String,
  pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuiz {
  pub title:     String,
  pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFlashcards {
  pub title:      String,
  pub flashcards: Vec<NewFlashcard>,
}

fn title_or(title: Option<String>, default: &str) -> String {
  title
    .filter(|t| !t.trim().is_empty())
    .unwrap_or_else(|| default.to_owned())
}

/// Prompt building and response interpretation around an injected model.
#[derive(Debug)]
pub struct Generator<M> {
  model: M,
}

impl<M: TextModel> Generator<M> {
  pub fn new(model: M) -> Self { Self { model } }

  /// The model's answer is the summary; only an empty answer is rejected.
  pub async fn summarize(
    &self,
    text: &str,
    title: Option<String>,
  ) -> Result<GeneratedSummary> {
    tracing::debug!(task = "summary", source_len = text.len(), "requesting generation");
    let content = self.model.generate(prompt::summary(text)).await?;
    if content.trim().is_empty() {
      return Err(GenerationError::malformed("summary", "empty summary"));
    }
    Ok(GeneratedSummary { title: title_or(title, DEFAULT_SUMMARY_TITLE), content })
  }

  pub async fn generate_quiz(
    &self,
    text: &str,
    title: Option<String>,
    question_count: Option<usize>,
  ) -> Result<GeneratedQuiz> {
    let count = question_count.unwrap_or(DEFAULT_QUESTION_COUNT);
    tracing::debug!(task = "quiz", count, source_len = text.len(), "requesting generation");
    let raw = self.model.generate(prompt::quiz(text, count)).await?;
    let questions = parse::parse_questions(&raw, count)?;
    Ok(GeneratedQuiz { title: title_or(title, DEFAULT_QUIZ_TITLE), questions })
  }

  pub async fn generate_flashcards(
    &self,
    text: &str,
    title: Option<String>,
    card_count: Option<usize>,
  ) -> Result<GeneratedFlashcards> {
    let count = card_count.unwrap_or(DEFAULT_CARD_COUNT);
    tracing::debug!(task = "flashcards", count, source_len = text.len(), "requesting generation");
    let raw = self.model.generate(prompt::flashcards(text, count)).await?;
    let flashcards = parse::parse_flashcards(&raw, count)?;
    Ok(GeneratedFlashcards {
      title: title_or(title, DEFAULT_FLASHCARDS_TITLE),
      flashcards,
    })
  }
}
