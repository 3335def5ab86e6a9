//! Error types for `cram-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required input is missing or malformed. The message is user-facing.
  #[error("{0}")]
  Validation(String),

  #[error("unsupported content type: {0}")]
  UnsupportedContentType(String),

  #[error("unknown source type: {0:?}")]
  UnknownSourceType(String),

  #[error("option {index} is out of range for a question with {len} options")]
  OptionOutOfRange { index: usize, len: usize },

  #[error("no option selected")]
  NoOptionSelected,

  #[error("cannot {action} while {state}")]
  InvalidTransition {
    action: &'static str,
    state:  &'static str,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
