//! TUI rendering for practice sessions.

pub mod deck;
pub mod quiz;

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Mode};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  match &app.mode {
    Mode::Quiz { attempt, cursor } => quiz::draw(f, rows[1], attempt, *cursor, app.show_review),
    Mode::Deck { deck } => deck::draw(f, rows[1], deck),
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let progress = match &app.mode {
    Mode::Quiz { attempt, .. } => {
      let score = attempt.score();
      format!("{}/{} correct ", score.correct, score.total)
    }
    Mode::Deck { deck } if deck.is_empty() => String::new(),
    Mode::Deck { deck } => format!("card {}/{} ", deck.index() + 1, deck.len()),
  };

  let left = Span::styled(
    format!(" cram  {}", app.title),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(progress, Style::default().fg(Color::Gray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);
  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match &app.mode {
    Mode::Quiz { attempt, .. } => quiz::status(attempt),
    Mode::Deck { .. } => ("DECK", "Space flip  ←/→ prev/next  q quit"),
  };

  let status = if app.status_msg.is_empty() { hints } else { app.status_msg.as_str() };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

#[cfg(test)]
mod tests {
  use crossterm::event::{KeyCode, KeyEvent};
  use ratatui::{Terminal, backend::TestBackend};

  use super::*;
  use crate::app::tests::{sample_quiz, sample_set};

  fn render(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
    terminal.draw(|f| draw(f, app)).unwrap();
    let buffer = terminal.backend().buffer();
    buffer
      .content()
      .chunks(buffer.area.width as usize)
      .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
      .collect::<Vec<_>>()
      .join("\n")
  }

  #[test]
  fn quiz_screen_shows_question_and_options() {
    let app = App::quiz(sample_quiz());
    let screen = render(&app);
    assert!(screen.contains("Cells"), "{screen}");
    assert!(screen.contains("Question 0"), "{screen}");
    assert!(screen.contains("D"), "{screen}");
    assert!(screen.contains("ANSWER"), "{screen}");
  }

  #[test]
  fn result_screen_reveals_the_answer() {
    let mut app = App::quiz(sample_quiz());
    app.handle_key(KeyEvent::from(KeyCode::Enter));
    let screen = render(&app);
    assert!(screen.contains("Incorrect"), "{screen}");
    assert!(screen.contains("Correct answer: B"), "{screen}");
  }

  #[test]
  fn deck_screen_shows_the_facing_side() {
    let mut app = App::deck(sample_set());
    assert!(render(&app).contains("front 0"));
    app.handle_key(KeyEvent::from(KeyCode::Char(' ')));
    let screen = render(&app);
    assert!(screen.contains("back 0"), "{screen}");
    assert!(screen.contains("card 1/2"), "{screen}");
  }
}
