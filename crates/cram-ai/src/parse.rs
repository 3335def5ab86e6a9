//! Turning raw model text into typed study records.
//!
//! Models like to wrap JSON in Markdown fences, so every structured response
//! goes through [`strip_code_fences`] before decoding. Decoding is strict
//! about shape (fields, types, four options, non-empty text) and lenient
//! about content (an answer outside the options, or the wrong number of
//! items, is only logged).

use cram_core::study::{NewFlashcard, NewQuestion, answer_matches};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{GenerationError, Result};

/// Number of options every generated question must carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Remove every ```` ```json ```` and ```` ``` ```` marker (each with an
/// optional trailing newline) and trim the result.
pub fn strip_code_fences(raw: &str) -> String {
  raw
    .replace("```json\n", "")
    .replace("```json", "")
    .replace("```\n", "")
    .replace("```", "")
    .trim()
    .to_owned()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionJson {
  question:       String,
  options:        Vec<String>,
  correct_answer: String,
  explanation:    String,
}

#[derive(Deserialize)]
struct FlashcardJson {
  front: String,
  back:  String,
}

fn decode_array<T: DeserializeOwned>(
  raw: &str,
  context: &'static str,
) -> Result<Vec<T>> {
  let cleaned = strip_code_fences(raw);
  let items: Vec<T> = serde_json::from_str(&cleaned)
    .map_err(|e| GenerationError::malformed(context, e.to_string()))?;
  if items.is_empty() {
    return Err(GenerationError::malformed(context, "empty array"));
  }
  Ok(items)
}

fn require_text(value: &str, context: &'static str, what: &str, i: usize) -> Result<()> {
  if value.trim().is_empty() {
    return Err(GenerationError::malformed(context, format!("item {i}: empty {what}")));
  }
  Ok(())
}

/// Decode a quiz response. `expected` is the requested question count.
pub fn parse_questions(raw: &str, expected: usize) -> Result<Vec<NewQuestion>> {
  const CONTEXT: &str = "quiz questions";
  let items: Vec<QuestionJson> = decode_array(raw, CONTEXT)?;

  let mut questions = Vec::with_capacity(items.len());
  for (i, item) in items.into_iter().enumerate() {
    require_text(&item.question, CONTEXT, "question", i)?;
    require_text(&item.correct_answer, CONTEXT, "correctAnswer", i)?;
    require_text(&item.explanation, CONTEXT, "explanation", i)?;
    if item.options.len() != OPTIONS_PER_QUESTION {
      return Err(GenerationError::malformed(
        CONTEXT,
        format!(
          "item {i}: expected {OPTIONS_PER_QUESTION} options, got {}",
          item.options.len()
        ),
      ));
    }
    for option in &item.options {
      require_text(option, CONTEXT, "option", i)?;
    }

    if !item.options.iter().any(|o| answer_matches(o, &item.correct_answer)) {
      tracing::warn!(
        index = i,
        correct_answer = %item.correct_answer,
        "generated correct answer matches none of the options"
      );
    }

    questions.push(NewQuestion {
      question:       item.question,
      options:        item.options,
      correct_answer: item.correct_answer,
      explanation:    item.explanation,
    });
  }

  if questions.len() != expected {
    tracing::warn!(expected, got = questions.len(), "model returned a different number of questions");
  }
  Ok(questions)
}

/// Decode a flashcard response. `expected` is the requested card count.
pub fn parse_flashcards(raw: &str, expected: usize) -> Result<Vec<NewFlashcard>> {
  const CONTEXT: &str = "flashcards";
  let items: Vec<FlashcardJson> = decode_array(raw, CONTEXT)?;

  let mut cards = Vec::with_capacity(items.len());
  for (i, item) in items.into_iter().enumerate() {
    require_text(&item.front, CONTEXT, "front", i)?;
    require_text(&item.back, CONTEXT, "back", i)?;
    cards.push(NewFlashcard { front: item.front, back: item.back });
  }

  if cards.len() != expected {
    tracing::warn!(expected, got = cards.len(), "model returned a different number of flashcards");
  }
  Ok(cards)
}

#[cfg(test)]
mod tests {
  use super::*;

  const QUIZ_JSON: &str = r#"[
    {
      "question": "What do plants release during photosynthesis?",
      "options": ["Oxygen", "Nitrogen", "Helium", "Argon"],
      "correctAnswer": "Oxygen",
      "explanation": "Oxygen is a by-product of splitting water."
    }
  ]"#;

  #[test]
  fn fences_are_removed() {
    assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
    assert_eq!(strip_code_fences("```\n[1]\n```\n"), "[1]");
    assert_eq!(strip_code_fences("  [1]  "), "[1]");
  }

  #[test]
  fn fenced_and_bare_json_parse_identically() {
    let fenced = format!("```json\n{QUIZ_JSON}\n```");
    assert_eq!(
      parse_questions(&fenced, 1).unwrap(),
      parse_questions(QUIZ_JSON, 1).unwrap()
    );
  }

  #[test]
  fn question_fields_are_decoded() {
    let qs = parse_questions(QUIZ_JSON, 1).unwrap();
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].correct_answer, "Oxygen");
    assert_eq!(qs[0].answer_index(), Some(0));
  }

  #[test]
  fn three_options_is_malformed() {
    let raw = r#"[{"question":"Q?","options":["a","b","c"],"correctAnswer":"a","explanation":"e"}]"#;
    assert!(matches!(parse_questions(raw, 1), Err(GenerationError::Malformed { .. })));
  }

  #[test]
  fn missing_field_is_malformed() {
    let raw = r#"[{"question":"Q?","options":["a","b","c","d"],"correctAnswer":"a"}]"#;
    assert!(matches!(parse_questions(raw, 1), Err(GenerationError::Malformed { .. })));
  }

  #[test]
  fn empty_string_is_malformed() {
    let raw = r#"[{"question":"  ","options":["a","b","c","d"],"correctAnswer":"a","explanation":"e"}]"#;
    assert!(matches!(parse_questions(raw, 1), Err(GenerationError::Malformed { .. })));
  }

  #[test]
  fn non_json_is_malformed() {
    let err = parse_flashcards("Sure! Here are your flashcards:", 10).unwrap_err();
    assert!(matches!(err, GenerationError::Malformed { context: "flashcards", .. }));
  }

  #[test]
  fn empty_array_is_malformed() {
    assert!(parse_flashcards("[]", 10).is_err());
  }

  #[test]
  fn answer_outside_options_is_kept() {
    let raw = r#"[{"question":"Q?","options":["a","b","c","d"],"correctAnswer":"B","explanation":"e"}]"#;
    let qs = parse_questions(raw, 1).unwrap();
    assert_eq!(qs[0].correct_answer, "B");
    assert_eq!(qs[0].answer_index(), None);
  }

  #[test]
  fn count_mismatch_is_tolerated() {
    let raw = r#"```json
[{"front":"ATP","back":"Energy currency"},{"front":"DNA","back":"Genetic material"}]
```"#;
    let cards = parse_flashcards(raw, 10).unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[1], NewFlashcard { front: "DNA".into(), back: "Genetic material".into() });
  }
}
