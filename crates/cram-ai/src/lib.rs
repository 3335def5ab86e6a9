//! Study-material generation on top of a generative text model.
//!
//! [`Generator`] builds the task prompt, calls a [`TextModel`], and turns the
//! raw text into typed records. [`GeminiClient`] is the production model.

pub mod error;
pub mod gemini;
pub mod generator;
pub mod model;
pub mod parse;
pub mod prompt;

#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

pub use error::{GenerationError, Result};
pub use gemini::GeminiClient;
pub use generator::{
  GeneratedFlashcards, GeneratedQuiz, GeneratedSummary, Generator,
};
pub use model::TextModel;
