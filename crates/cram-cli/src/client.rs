//! Async HTTP client wrapping the Cram JSON API.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use cram_core::study::{FlashcardSet, Quiz, Summary};
use reqwest::{
  Client, Response,
  multipart::{Form, Part},
};
use serde::{Deserialize, de::DeserializeOwned};
use uuid::Uuid;

/// Generation can take a while on long sources.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// The three kinds of study material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
  Summary,
  Quiz,
  Flashcards,
}

impl Kind {
  fn path(self) -> &'static str {
    match self {
      Self::Summary => "summaries",
      Self::Quiz => "quizzes",
      Self::Flashcards => "flashcards",
    }
  }

  fn count_field(self) -> Option<&'static str> {
    match self {
      Self::Summary => None,
      Self::Quiz => Some("questionCount"),
      Self::Flashcards => Some("cardCount"),
    }
  }
}

/// Where the material comes from.
#[derive(Debug, Clone)]
pub enum Source {
  Text(String),
  File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct CreateRequest {
  pub user_id: Uuid,
  pub title:   Option<String>,
  pub source:  Source,
  pub count:   Option<usize>,
}

/// Any record the API returns, tagged by kind.
#[derive(Debug, Clone)]
pub enum Material {
  Summary(Summary),
  Quiz(Quiz),
  Flashcards(FlashcardSet),
}

#[derive(Deserialize)]
struct ErrorBody {
  error:   String,
  details: Option<String>,
}

/// Async HTTP client for the Cram REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_owned() })
  }

  fn url(&self, path: &str) -> String { format!("{}/api/study{}", self.base_url, path) }

  /// Turn a non-success response into an error carrying the server's
  /// `{error, details}` message.
  async fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
      Ok(ErrorBody { error, details: Some(details) }) => format!("{error} ({details})"),
      Ok(ErrorBody { error, details: None }) => error,
      Err(_) if text.is_empty() => status.to_string(),
      Err(_) => text,
    };
    Err(anyhow!("{what} → {status}: {message}"))
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let what = format!("GET {path}");
    let resp = self
      .client
      .get(self.url(path))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    Self::check(resp, &what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {path}"))
  }

  // ── Create ────────────────────────────────────────────────────────────────

  async fn form(kind: Kind, req: &CreateRequest) -> Result<Form> {
    let mut form = Form::new().text("userId", req.user_id.to_string());
    if let Some(title) = &req.title {
      form = form.text("title", title.clone());
    }
    if let (Some(field), Some(count)) = (kind.count_field(), req.count) {
      form = form.text(field, count.to_string());
    }

    form = match &req.source {
      Source::Text(text) => form.text("sourceType", "text").text("text", text.clone()),
      Source::File(path) => {
        let data = tokio::fs::read(path)
          .await
          .with_context(|| format!("reading {}", path.display()))?;
        let filename = path
          .file_name()
          .map(|n| n.to_string_lossy().into_owned())
          .unwrap_or_else(|| "upload.txt".to_owned());
        let part = Part::bytes(data)
          .file_name(filename)
          .mime_str(mime_for(path))
          .context("building file part")?;
        form.text("sourceType", "file").part("file", part)
      }
    };
    Ok(form)
  }

  /// `POST /api/study/{kind}`
  pub async fn create(&self, kind: Kind, req: &CreateRequest) -> Result<Material> {
    let path = format!("/{}", kind.path());
    let what = format!("POST {path}");
    let resp = self
      .client
      .post(self.url(&path))
      .multipart(Self::form(kind, req).await?)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    let resp = Self::check(resp, &what).await?;

    Ok(match kind {
      Kind::Summary => Material::Summary(resp.json().await.context("deserialising summary")?),
      Kind::Quiz => Material::Quiz(resp.json().await.context("deserialising quiz")?),
      Kind::Flashcards => {
        Material::Flashcards(resp.json().await.context("deserialising flashcard set")?)
      }
    })
  }

  // ── Read ──────────────────────────────────────────────────────────────────

  /// `GET /api/study/{kind}/user/{userId}`
  pub async fn list(&self, kind: Kind, user_id: Uuid) -> Result<Vec<Material>> {
    let path = format!("/{}/user/{user_id}", kind.path());
    Ok(match kind {
      Kind::Summary => self
        .get_json::<Vec<Summary>>(&path)
        .await?
        .into_iter()
        .map(Material::Summary)
        .collect(),
      Kind::Quiz => self
        .get_json::<Vec<Quiz>>(&path)
        .await?
        .into_iter()
        .map(Material::Quiz)
        .collect(),
      Kind::Flashcards => self
        .get_json::<Vec<FlashcardSet>>(&path)
        .await?
        .into_iter()
        .map(Material::Flashcards)
        .collect(),
    })
  }

  /// `GET /api/study/{kind}/{id}`
  pub async fn get(&self, kind: Kind, id: Uuid) -> Result<Material> {
    let path = format!("/{}/{id}", kind.path());
    Ok(match kind {
      Kind::Summary => Material::Summary(self.get_json(&path).await?),
      Kind::Quiz => Material::Quiz(self.get_json(&path).await?),
      Kind::Flashcards => Material::Flashcards(self.get_json(&path).await?),
    })
  }

  pub async fn get_quiz(&self, id: Uuid) -> Result<Quiz> {
    self.get_json(&format!("/quizzes/{id}")).await
  }

  pub async fn get_flashcard_set(&self, id: Uuid) -> Result<FlashcardSet> {
    self.get_json(&format!("/flashcards/{id}")).await
  }

  // ── Delete ────────────────────────────────────────────────────────────────

  /// `DELETE /api/study/{kind}/{id}`
  pub async fn delete(&self, kind: Kind, id: Uuid) -> Result<()> {
    let path = format!("/{}/{id}", kind.path());
    let what = format!("DELETE {path}");
    let resp = self
      .client
      .delete(self.url(&path))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    Self::check(resp, &what).await?;
    Ok(())
  }
}

fn mime_for(path: &std::path::Path) -> &'static str {
  match path.extension().and_then(|e| e.to_str()) {
    Some(ext) if ext.eq_ignore_ascii_case("txt") => "text/plain",
    _ => "application/octet-stream",
  }
}
