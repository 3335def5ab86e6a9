//! Flashcard pane.

use cram_core::practice::FlashcardDeck;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, Paragraph, Wrap},
};

/// Render the current card, centred, into `area`.
pub fn draw(f: &mut Frame, area: Rect, deck: &FlashcardDeck) {
  let Some(text) = deck.visible_text() else {
    let empty = Paragraph::new("This set has no flashcards.")
      .style(Style::default().fg(Color::DarkGray));
    f.render_widget(empty, area);
    return;
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Percentage(20),
      Constraint::Percentage(60),
      Constraint::Percentage(20),
    ])
    .split(area);

  let (side, border) = if deck.is_flipped() {
    (" Back ", Color::Green)
  } else {
    (" Front ", Color::Cyan)
  };
  let card = Paragraph::new(text.to_owned())
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .style(Style::default().add_modifier(Modifier::BOLD))
    .block(
      Block::default()
        .title(side)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border)),
    );
  f.render_widget(card, rows[1]);
}
