//! A [`TextModel`] that replays queued replies and records every prompt.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{GenerationError, Result, TextModel};

#[derive(Default)]
struct Script {
  replies: VecDeque<Result<String>>,
  prompts: Vec<String>,
}

/// Clones share the same script, so a test can keep a handle after handing
/// the model to a [`Generator`](crate::Generator).
#[derive(Clone, Default)]
pub struct ScriptedModel {
  script: Arc<Mutex<Script>>,
}

impl ScriptedModel {
  fn lock(&self) -> MutexGuard<'_, Script> {
    self.script.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn push_ok(&self, reply: impl Into<String>) {
    self.lock().replies.push_back(Ok(reply.into()));
  }

  pub fn push_err(&self, err: GenerationError) {
    self.lock().replies.push_back(Err(err));
  }

  /// Every prompt received so far, oldest first.
  pub fn prompts(&self) -> Vec<String> { self.lock().prompts.clone() }
}

impl TextModel for ScriptedModel {
  async fn generate(&self, prompt: String) -> Result<String> {
    let mut script = self.lock();
    script.prompts.push(prompt);
    script
      .replies
      .pop_front()
      .unwrap_or_else(|| Err(GenerationError::Failed("no scripted reply left".into())))
  }
}
