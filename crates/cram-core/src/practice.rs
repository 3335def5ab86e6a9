//! Local practice state: taking a quiz and paging through a flashcard deck.
//!
//! Nothing here is persisted. A [`QuizAttempt`] is a small state machine:
//!
//! ```text
//! Answering(i) --submit--> ShowingResult(i, ok) --advance--> Answering(i + 1)
//!                                               \-advance--> Completed (last question)
//! Completed --restart--> Answering(0)
//! ```

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  study::{Flashcard, Question},
};

// ─── Quiz attempt ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AttemptState {
  Answering { index: usize },
  ShowingResult { index: usize, is_correct: bool },
  Completed,
}

impl AttemptState {
  fn name(&self) -> &'static str {
    match self {
      Self::Answering { .. } => "answering",
      Self::ShowingResult { .. } => "showing a result",
      Self::Completed => "completed",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAnswer {
  pub question_id: Uuid,
  pub selected:    String,
  pub is_correct:  bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
  pub correct: usize,
  pub total:   usize,
  /// `correct / total` as a rounded percentage; 0 for an empty quiz.
  pub percent: u32,
}

/// One pass through a quiz.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
  questions: Vec<Question>,
  state:     AttemptState,
  selected:  Option<usize>,
  answers:   Vec<RecordedAnswer>,
}

impl QuizAttempt {
  /// Start an attempt. Questions are put in `order`; an empty quiz starts
  /// out completed.
  pub fn new(mut questions: Vec<Question>) -> Self {
    questions.sort_by_key(|q| q.order);
    let state = Self::initial_state(&questions);
    Self { questions, state, selected: None, answers: Vec::new() }
  }

  fn initial_state(questions: &[Question]) -> AttemptState {
    if questions.is_empty() {
      AttemptState::Completed
    } else {
      AttemptState::Answering { index: 0 }
    }
  }

  pub fn state(&self) -> AttemptState { self.state }

  pub fn questions(&self) -> &[Question] { &self.questions }

  pub fn answers(&self) -> &[RecordedAnswer] { &self.answers }

  /// The question being answered or reviewed; `None` once completed.
  pub fn current_question(&self) -> Option<&Question> {
    match self.state {
      AttemptState::Answering { index }
      | AttemptState::ShowingResult { index, .. } => self.questions.get(index),
      AttemptState::Completed => None,
    }
  }

  /// The currently selected option text, if any.
  pub fn selected(&self) -> Option<&str> {
    let q = self.current_question()?;
    self.selected.and_then(|i| q.options.get(i)).map(String::as_str)
  }

  /// Choose an option by index. Changing the choice is allowed until the
  /// answer is submitted.
  pub fn select(&mut self, option: usize) -> Result<()> {
    let AttemptState::Answering { index } = self.state else {
      return Err(self.invalid("select an option"));
    };
    let len = self.questions[index].options.len();
    if option >= len {
      return Err(Error::OptionOutOfRange { index: option, len });
    }
    self.selected = Some(option);
    Ok(())
  }

  /// Submit the selected option and return whether it was correct.
  pub fn submit(&mut self) -> Result<bool> {
    let AttemptState::Answering { index } = self.state else {
      return Err(self.invalid("submit an answer"));
    };
    let option = self.selected.ok_or(Error::NoOptionSelected)?;
    let question = &self.questions[index];
    let selected = question.options[option].clone();
    let is_correct = question.is_correct(&selected);

    self.answers.push(RecordedAnswer {
      question_id: question.id,
      selected,
      is_correct,
    });
    self.state = AttemptState::ShowingResult { index, is_correct };
    Ok(is_correct)
  }

  /// Leave the result view: move to the next question, or complete the
  /// attempt after the last one.
  pub fn advance(&mut self) -> Result<AttemptState> {
    let AttemptState::ShowingResult { index, .. } = self.state else {
      return Err(self.invalid("advance"));
    };
    self.selected = None;
    self.state = if index + 1 < self.questions.len() {
      AttemptState::Answering { index: index + 1 }
    } else {
      AttemptState::Completed
    };
    Ok(self.state)
  }

  /// Discard every recorded answer and start over from the first question.
  pub fn restart(&mut self) {
    self.answers.clear();
    self.selected = None;
    self.state = Self::initial_state(&self.questions);
  }

  pub fn score(&self) -> Score {
    let total = self.questions.len();
    let correct = self.answers.iter().filter(|a| a.is_correct).count();
    let percent = if total == 0 {
      0
    } else {
      ((correct as f64 / total as f64) * 100.0).round() as u32
    };
    Score { correct, total, percent }
  }

  /// Each question paired with the answer recorded for it, if any.
  pub fn review(&self) -> impl Iterator<Item = (&Question, Option<&RecordedAnswer>)> {
    self.questions.iter().map(|q| {
      let answer = self.answers.iter().find(|a| a.question_id == q.id);
      (q, answer)
    })
  }

  fn invalid(&self, action: &'static str) -> Error {
    Error::InvalidTransition { action, state: self.state.name() }
  }
}

// ─── Flashcard deck ──────────────────────────────────────────────────────────

/// Paging state over a flashcard set. Moving to another card always shows
/// its front.
#[derive(Debug, Clone)]
pub struct FlashcardDeck {
  cards:   Vec<Flashcard>,
  index:   usize,
  flipped: bool,
}

impl FlashcardDeck {
  pub fn new(mut cards: Vec<Flashcard>) -> Self {
    cards.sort_by_key(|c| c.order);
    Self { cards, index: 0, flipped: false }
  }

  pub fn len(&self) -> usize { self.cards.len() }

  pub fn is_empty(&self) -> bool { self.cards.is_empty() }

  /// Zero-based index of the current card.
  pub fn index(&self) -> usize { self.index }

  pub fn is_flipped(&self) -> bool { self.flipped }

  pub fn current(&self) -> Option<&Flashcard> { self.cards.get(self.index) }

  /// The side of the current card that is facing up.
  pub fn visible_text(&self) -> Option<&str> {
    self.current().map(|c| {
      if self.flipped { c.back.as_str() } else { c.front.as_str() }
    })
  }

  pub fn flip(&mut self) { self.flipped = !self.flipped; }

  /// Move forward one card. Returns `false` at the end of the deck.
  pub fn next(&mut self) -> bool {
    if self.index + 1 >= self.cards.len() {
      return false;
    }
    self.index += 1;
    self.flipped = false;
    true
  }

  /// Move back one card. Returns `false` at the start of the deck.
  pub fn previous(&mut self) -> bool {
    if self.index == 0 {
      return false;
    }
    self.index -= 1;
    self.flipped = false;
    true
  }
}
