//! Server configuration.
//!
//! Layered, lowest precedence first: built-in defaults, an optional TOML
//! file, then `CRAM_*` environment variables (`__` separates nested keys, so
//! `CRAM_GEMINI__API_KEY` sets `gemini.api_key`).

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use config::{Config, ConfigBuilder, Environment, builder::DefaultState};
use serde::Deserialize;

/// Read when `gemini.api_key` is not configured.
pub const API_KEY_FALLBACK_VAR: &str = "GOOGLE_AI_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub database_path: PathBuf,
  /// Browser origin allowed by CORS.
  pub frontend_url:  String,
  pub gemini:        GeminiConfig,
}

#[derive(Clone, Deserialize)]
pub struct GeminiConfig {
  pub api_key:      String,
  pub model:        String,
  pub base_url:     String,
  pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for GeminiConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GeminiConfig")
      .field("api_key", &"***")
      .field("model", &self.model)
      .field("base_url", &self.base_url)
      .field("timeout_secs", &self.timeout_secs)
      .finish()
  }
}

impl GeminiConfig {
  pub fn timeout(&self) -> Option<Duration> { self.timeout_secs.map(Duration::from_secs) }
}

impl ServerConfig {
  /// Load from `path` (optional) and the environment.
  pub fn load(path: PathBuf) -> anyhow::Result<Self> {
    let builder = defaults()?
      .add_source(config::File::from(path).required(false))
      .add_source(
        Environment::with_prefix("CRAM")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      );
    let mut cfg = Self::build(builder)?;

    if cfg.gemini.api_key.is_empty() {
      if let Ok(key) = std::env::var(API_KEY_FALLBACK_VAR) {
        cfg.gemini.api_key = key;
      }
    }
    Ok(cfg)
  }

  fn build(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
    builder
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
  Config::builder()
    .set_default("host", "0.0.0.0")?
    .set_default("port", 4000)?
    .set_default("database_path", "cram.db")?
    .set_default("frontend_url", "http://localhost:3000")?
    .set_default("gemini.api_key", "")?
    .set_default("gemini.model", cram_ai::gemini::DEFAULT_MODEL)?
    .set_default("gemini.base_url", cram_ai::gemini::DEFAULT_BASE_URL)
    .context("failed to set configuration defaults")
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    let builder = defaults()
      .unwrap()
      .add_source(config::File::from_str(toml, FileFormat::Toml));
    ServerConfig::build(builder).unwrap()
  }

  #[test]
  fn defaults_apply_without_a_file() {
    let cfg = from_toml("");
    assert_eq!(cfg.address(), "0.0.0.0:4000");
    assert_eq!(cfg.frontend_url, "http://localhost:3000");
    assert_eq!(cfg.gemini.model, "gemini-2.5-flash");
    assert_eq!(cfg.gemini.timeout(), None);
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = from_toml(
      r#"
      port = 8080
      database_path = "/var/lib/cram/cram.db"

      [gemini]
      api_key = "from-file"
      timeout_secs = 30
      "#,
    );
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.database_path, PathBuf::from("/var/lib/cram/cram.db"));
    assert_eq!(cfg.gemini.api_key, "from-file");
    assert_eq!(cfg.gemini.timeout(), Some(Duration::from_secs(30)));
  }

  #[test]
  fn debug_hides_api_key() {
    let cfg = from_toml("[gemini]\napi_key = \"hunter2\"");
    assert!(!format!("{cfg:?}").contains("hunter2"));
  }
}
