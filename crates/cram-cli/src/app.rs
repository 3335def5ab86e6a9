//! Practice session state and key dispatch.

use cram_core::{
  practice::{AttemptState, FlashcardDeck, QuizAttempt},
  study::{FlashcardSet, Quiz},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// ─── Mode ─────────────────────────────────────────────────────────────────────

pub enum Mode {
  /// Taking a quiz. `cursor` is the highlighted option.
  Quiz { attempt: QuizAttempt, cursor: usize },
  /// Paging through a flashcard deck.
  Deck { deck: FlashcardDeck },
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Title of the quiz or flashcard set being practised.
  pub title: String,

  pub mode: Mode,

  /// Whether the completed quiz shows the per-question review.
  pub show_review: bool,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl App {
  pub fn quiz(quiz: Quiz) -> Self {
    Self {
      title:       quiz.title,
      mode:        Mode::Quiz { attempt: QuizAttempt::new(quiz.questions), cursor: 0 },
      show_review: false,
      status_msg:  String::new(),
    }
  }

  pub fn deck(set: FlashcardSet) -> Self {
    Self {
      title:       set.title,
      mode:        Mode::Deck { deck: FlashcardDeck::new(set.flashcards) },
      show_review: false,
      status_msg:  String::new(),
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
      return false;
    }

    self.status_msg.clear();
    match &mut self.mode {
      Mode::Quiz { attempt, cursor } => {
        let msg = handle_quiz_key(attempt, cursor, &mut self.show_review, key.code);
        if let Some(msg) = msg {
          self.status_msg = msg;
        }
      }
      Mode::Deck { deck } => handle_deck_key(deck, key.code),
    }
    true
  }
}

fn handle_quiz_key(
  attempt: &mut QuizAttempt,
  cursor: &mut usize,
  show_review: &mut bool,
  code: KeyCode,
) -> Option<String> {
  match attempt.state() {
    AttemptState::Answering { .. } => {
      let options = attempt.current_question().map_or(0, |q| q.options.len());
      match code {
        KeyCode::Down | KeyCode::Char('j') => {
          if *cursor + 1 < options {
            *cursor += 1;
          }
        }
        KeyCode::Up | KeyCode::Char('k') => {
          *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Char(c @ '1'..='9') => {
          let index = c as usize - '1' as usize;
          if index < options {
            *cursor = index;
          }
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
          if let Err(e) = attempt.select(*cursor).and_then(|()| attempt.submit()) {
            return Some(e.to_string());
          }
        }
        _ => {}
      }
    }
    AttemptState::ShowingResult { .. } => {
      if matches!(code, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right) {
        *cursor = 0;
        if let Err(e) = attempt.advance() {
          return Some(e.to_string());
        }
      }
    }
    AttemptState::Completed => match code {
      KeyCode::Char('r') => {
        attempt.restart();
        *cursor = 0;
        *show_review = false;
      }
      KeyCode::Char('v') => *show_review = !*show_review,
      _ => {}
    },
  }
  None
}

fn handle_deck_key(deck: &mut FlashcardDeck, code: KeyCode) {
  match code {
    KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Up | KeyCode::Down => deck.flip(),
    KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => {
      deck.next();
    }
    KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
      deck.previous();
    }
    _ => {}
  }
}
