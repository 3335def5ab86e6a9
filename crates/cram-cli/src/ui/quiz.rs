//! Quiz pane: question, options, per-answer feedback and the final score.

use cram_core::practice::{AttemptState, QuizAttempt};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

/// Mode label and key hints for the status bar.
pub fn status(attempt: &QuizAttempt) -> (&'static str, &'static str) {
  match attempt.state() {
    AttemptState::Answering { .. } => ("ANSWER", "↑↓/jk or 1-4 choose  Enter submit  q quit"),
    AttemptState::ShowingResult { .. } => ("RESULT", "Enter next  q quit"),
    AttemptState::Completed => ("DONE", "r restart  v review  q quit"),
  }
}

/// Render the quiz into `area`.
pub fn draw(f: &mut Frame, area: Rect, attempt: &QuizAttempt, cursor: usize, show_review: bool) {
  let title = match attempt.state() {
    AttemptState::Answering { index } | AttemptState::ShowingResult { index, .. } => {
      format!(" Question {} of {} ", index + 1, attempt.questions().len())
    }
    AttemptState::Completed => " Results ".to_owned(),
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let lines = match attempt.state() {
    AttemptState::Answering { .. } => question_lines(attempt, Some(cursor)),
    AttemptState::ShowingResult { is_correct, .. } => {
      let mut lines = question_lines(attempt, None);
      lines.extend(result_lines(attempt, is_correct));
      lines
    }
    AttemptState::Completed => completed_lines(attempt, show_review),
  };

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn question_lines(attempt: &QuizAttempt, cursor: Option<usize>) -> Vec<Line<'static>> {
  let Some(q) = attempt.current_question() else { return Vec::new() };
  let mut lines = vec![
    Line::from(Span::styled(
      q.question.clone(),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
  ];

  let selected = attempt.selected();
  for (i, option) in q.options.iter().enumerate() {
    let highlighted = cursor == Some(i) || (cursor.is_none() && selected == Some(option.as_str()));
    let marker = if highlighted { "▶" } else { " " };
    let style = if highlighted {
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default()
    };
    lines.push(Line::from(Span::styled(format!("{marker} {}. {option}", i + 1), style)));
  }
  lines
}

fn result_lines(attempt: &QuizAttempt, is_correct: bool) -> Vec<Line<'static>> {
  let Some(q) = attempt.current_question() else { return Vec::new() };
  let mut lines = vec![Line::from("")];

  if is_correct {
    lines.push(Line::from(Span::styled(
      "Correct!",
      Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));
  } else {
    lines.push(Line::from(Span::styled(
      "Incorrect",
      Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("Correct answer: {}", q.correct_answer)));
  }

  if !q.explanation.is_empty() {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      q.explanation.clone(),
      Style::default().fg(Color::Gray),
    )));
  }
  lines
}

fn completed_lines(attempt: &QuizAttempt, show_review: bool) -> Vec<Line<'static>> {
  let score = attempt.score();
  let mut lines = vec![Line::from(Span::styled(
    format!("You scored {}/{} ({}%)", score.correct, score.total, score.percent),
    Style::default().add_modifier(Modifier::BOLD),
  ))];

  if !show_review {
    return lines;
  }

  lines.push(Line::from(""));
  for (i, (q, answer)) in attempt.review().enumerate() {
    let (mark, color) = match answer {
      Some(a) if a.is_correct => ("✓", Color::Green),
      _ => ("✗", Color::Red),
    };
    lines.push(Line::from(vec![
      Span::styled(format!("{mark} "), Style::default().fg(color)),
      Span::raw(format!("{}. {}", i + 1, q.question)),
    ]));
    let chosen = answer.map_or("(unanswered)", |a| a.selected.as_str());
    lines.push(Line::from(Span::styled(
      format!("    you: {chosen}   answer: {}", q.correct_answer),
      Style::default().fg(Color::DarkGray),
    )));
  }
  lines
}
