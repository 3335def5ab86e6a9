//! Wiring for the `cram-server` binary: configuration and the outer layers
//! around [`cram_api::router`].

pub mod config;

use std::time::Duration;

use anyhow::Context as _;
use axum::{
  Router,
  http::{HeaderValue, Method, header::CONTENT_TYPE},
};
use cram_ai::TextModel;
use cram_api::AppState;
use cram_core::store::{AuthStore, StudyStore};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// CORS for the single browser origin at `frontend_url`. Credentials are
/// allowed so the auth collaborator's cookies reach the API.
pub fn cors_layer(frontend_url: &str) -> anyhow::Result<CorsLayer> {
  let origin = HeaderValue::from_str(frontend_url.trim_end_matches('/'))
    .with_context(|| format!("invalid frontend_url {frontend_url:?}"))?;
  Ok(
    CorsLayer::new()
      .allow_origin(origin)
      .allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
      ])
      .allow_headers([CONTENT_TYPE])
      .allow_credentials(true)
      .max_age(Duration::from_secs(60 * 60)),
  )
}

/// The API router with request tracing and CORS applied.
pub fn app<S, M>(state: AppState<S, M>, frontend_url: &str) -> anyhow::Result<Router>
where
  S: StudyStore + AuthStore + 'static,
  M: TextModel + 'static,
{
  Ok(
    cram_api::router(state)
      .layer(cors_layer(frontend_url)?)
      .layer(TraceLayer::new_for_http()),
  )
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!("failed to listen for Ctrl+C: {e}");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!("failed to install SIGTERM handler: {e}");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  tracing::info!("shutting down");
}
