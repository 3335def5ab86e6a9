//! Plain-text rendering for the non-interactive commands.

use std::fmt::Write as _;

use chrono::Local;
use cram_core::study::{FlashcardSet, Quiz, Summary};

use crate::client::Material;

/// One line per record: id, date, title and a size hint.
pub fn list_line(item: &Material) -> String {
  let (id, created, title, extra) = match item {
    Material::Summary(s) => (s.id, s.created_at, &s.title, excerpt(&s.content, 40)),
    Material::Quiz(q) => (q.id, q.created_at, &q.title, format!("{} questions", q.questions.len())),
    Material::Flashcards(f) => {
      (f.id, f.created_at, &f.title, format!("{} cards", f.flashcards.len()))
    }
  };
  let created = created.with_timezone(&Local).format("%Y-%m-%d %H:%M");
  format!("{id}  {created}  {title:<24}  {extra}")
}

/// Full multi-line view of one record.
pub fn detail(item: &Material) -> String {
  match item {
    Material::Summary(s) => summary(s),
    Material::Quiz(q) => quiz(q),
    Material::Flashcards(f) => flashcards(f),
  }
}

fn header(out: &mut String, title: &str, source: String) {
  let _ = writeln!(out, "{title}");
  let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
  let _ = writeln!(out, "source: {source}\n");
}

fn summary(s: &Summary) -> String {
  let mut out = String::new();
  header(&mut out, &s.title, format!("{} ({})", s.source_type, excerpt(&s.source_data, 40)));
  out.push_str(&s.content);
  out.push('\n');
  out
}

fn quiz(q: &Quiz) -> String {
  let mut out = String::new();
  header(&mut out, &q.title, format!("{} ({})", q.source_type, excerpt(&q.source_data, 40)));
  for (i, question) in q.questions.iter().enumerate() {
    let _ = writeln!(out, "{}. {}", i + 1, question.question);
    for (j, option) in question.options.iter().enumerate() {
      let mark = if question.is_correct(option) { '*' } else { ' ' };
      let _ = writeln!(out, "  {mark} {}) {option}", (b'a' + j as u8) as char);
    }
    if !question.explanation.is_empty() {
      let _ = writeln!(out, "    {}", question.explanation);
    }
    out.push('\n');
  }
  out
}

fn flashcards(f: &FlashcardSet) -> String {
  let mut out = String::new();
  header(&mut out, &f.title, format!("{} ({})", f.source_type, excerpt(&f.source_data, 40)));
  for (i, card) in f.flashcards.iter().enumerate() {
    let _ = writeln!(out, "{}. {}\n   → {}", i + 1, card.front, card.back);
  }
  out
}

/// First line of `text`, cut to `max` characters.
fn excerpt(text: &str, max: usize) -> String {
  let line = text.lines().next().unwrap_or_default();
  if line.chars().count() <= max && line.len() == text.len() {
    return line.to_owned();
  }
  let cut: String = line.chars().take(max).collect();
  format!("{cut}…")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::app::tests::sample_quiz;

  #[test]
  fn quiz_detail_marks_the_correct_option() {
    let text = detail(&Material::Quiz(sample_quiz()));
    assert!(text.starts_with("Cells\n=====\n"), "{text}");
    assert!(text.contains("  * b) B"), "{text}");
    assert!(text.contains("    a) A"), "{text}");
  }

  #[test]
  fn excerpt_cuts_long_and_multiline_text() {
    assert_eq!(excerpt("short", 10), "short");
    assert_eq!(excerpt("first\nsecond", 10), "first…");
    assert_eq!(excerpt("abcdefghij", 4), "abcd…");
  }
}
