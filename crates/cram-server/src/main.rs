//! cram-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `CRAM_*`
//! environment overrides, opens the SQLite store, and serves the study API
//! over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use cram_ai::{GeminiClient, Generator};
use cram_api::AppState;
use cram_server::config::{API_KEY_FALLBACK_VAR, ServerConfig};
use cram_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cram study helper API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(cli.config)?;
  tracing::debug!(?cfg, "loaded configuration");

  if cfg.gemini.api_key.is_empty() {
    tracing::warn!(
      "no Gemini API key configured (gemini.api_key or {API_KEY_FALLBACK_VAR}); \
       generation requests will fail"
    );
  }

  let store = SqliteStore::open(&cfg.database_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.database_path))?;

  let model = GeminiClient::new(
    cfg.gemini.api_key.clone(),
    cfg.gemini.base_url.clone(),
    cfg.gemini.timeout(),
  )
  .context("failed to build Gemini client")?
  .with_model(cfg.gemini.model.clone());
  tracing::info!(model = model.model(), base_url = model.base_url(), "using Gemini model");

  let state = AppState::new(store, Generator::new(model));
  let app = cram_server::app(state, &cfg.frontend_url)?;

  let address = cfg.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app)
    .with_graceful_shutdown(cram_server::shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}
