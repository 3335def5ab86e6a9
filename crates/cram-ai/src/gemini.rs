//! HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{GenerationError, Result, TextModel};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Upper bound on how much of an unparseable error body ends up in messages.
const MAX_BODY_IN_ERROR: usize = 300;

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
  contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
  parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
  text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
  text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
  error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
  #[serde(default)]
  message: String,
  #[serde(default)]
  status:  String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Gemini model client. Cheap to share behind an `Arc`.
pub struct GeminiClient {
  client:   reqwest::Client,
  api_key:  String,
  base_url: String,
  model:    String,
}

impl std::fmt::Debug for GeminiClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GeminiClient")
      .field("api_key", &"***")
      .field("base_url", &self.base_url)
      .field("model", &self.model)
      .finish()
  }
}

impl GeminiClient {
  /// Build a client against `base_url` using the default model. `timeout`
  /// bounds each request; `None` waits as long as the provider does.
  pub fn new(
    api_key: impl Into<String>,
    base_url: impl Into<String>,
    timeout: Option<Duration>,
  ) -> Result<Self> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder
      .build()
      .map_err(|e| GenerationError::ClientInit(e.to_string()))?;

    Ok(Self {
      client,
      api_key: api_key.into(),
      base_url: base_url.into().trim_end_matches('/').to_owned(),
      model: DEFAULT_MODEL.to_owned(),
    })
  }

  #[must_use]
  pub fn with_model(mut self, model: impl Into<String>) -> Self {
    self.model = model.into();
    self
  }

  pub fn model(&self) -> &str { &self.model }

  pub fn base_url(&self) -> &str { &self.base_url }

  fn endpoint(&self) -> String {
    format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
  }
}

impl TextModel for GeminiClient {
  async fn generate(&self, prompt: String) -> Result<String> {
    let body = GenerateContentRequest {
      contents: [RequestContent { parts: [RequestPart { text: &prompt }] }],
    };

    let response = self
      .client
      .post(self.endpoint())
      .header("x-goog-api-key", &self.api_key)
      .json(&body)
      .send()
      .await
      .map_err(|e| GenerationError::Failed(e.to_string()))?;

    let status = response.status();
    let text = response
      .text()
      .await
      .map_err(|e| GenerationError::Failed(e.to_string()))?;

    if !status.is_success() {
      return Err(classify_failure(status.as_u16(), &text));
    }

    let parsed: GenerateContentResponse = serde_json::from_str(&text)
      .map_err(|e| GenerationError::malformed("generateContent response", e.to_string()))?;

    extract_text(parsed).ok_or_else(|| {
      GenerationError::malformed("generateContent response", "no candidate text")
    })
  }
}

/// Map a non-success response onto the error taxonomy. The provider's
/// canonical status string wins over the HTTP code when both are present.
fn classify_failure(code: u16, body: &str) -> GenerationError {
  let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
  let status = envelope.as_ref().map(|e| e.error.status.as_str()).unwrap_or("");

  match (code, status) {
    (_, "RESOURCE_EXHAUSTED") | (429, _) => GenerationError::RateLimited,
    (_, "UNAVAILABLE") | (503, _) => GenerationError::ServiceOverloaded,
    _ => {
      let message = match envelope {
        Some(e) if !e.error.message.is_empty() => e.error.message,
        _ => format!("HTTP {code}: {}", truncate(body, MAX_BODY_IN_ERROR)),
      };
      tracing::warn!(code, %message, "model call failed");
      GenerationError::Failed(message)
    }
  }
}

/// Concatenated text parts of the first candidate, or `None` if there is
/// nothing to read.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
  let content = response.candidates.into_iter().next()?.content?;
  let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
  if text.is_empty() { None } else { Some(text) }
}

fn truncate(s: &str, max_len: usize) -> &str {
  if s.len() <= max_len {
    return s;
  }
  let mut end = max_len;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  &s[..end]
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
  };

  use super::*;

  const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

  fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key", server.uri(), None).unwrap()
  }

  fn error_body(code: u16, status: &str, message: &str) -> serde_json::Value {
    json!({ "error": { "code": code, "message": message, "status": status } })
  }

  #[tokio::test]
  async fn sends_prompt_and_joins_text_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path(ENDPOINT))
      .and(header("x-goog-api-key", "test-key"))
      .and(body_json(json!({ "contents": [{ "parts": [{ "text": "hello" }] }] })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
          "content": { "role": "model", "parts": [{ "text": "Hi " }, { "text": "there" }] }
        }]
      })))
      .expect(1)
      .mount(&server)
      .await;

    let text = client(&server).generate("hello".into()).await.unwrap();
    assert_eq!(text, "Hi there");
  }

  #[tokio::test]
  async fn custom_model_changes_the_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
      })))
      .mount(&server)
      .await;

    let text = client(&server)
      .with_model("gemini-2.5-pro")
      .generate("x".into())
      .await
      .unwrap();
    assert_eq!(text, "ok");
  }

  #[tokio::test]
  async fn http_429_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path(ENDPOINT))
      .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
      .expect(1)
      .mount(&server)
      .await;

    let err = client(&server).generate("x".into()).await.unwrap_err();
    assert!(matches!(err, GenerationError::RateLimited));
  }

  #[tokio::test]
  async fn resource_exhausted_status_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path(ENDPOINT))
      .respond_with(
        ResponseTemplate::new(400)
          .set_body_json(error_body(400, "RESOURCE_EXHAUSTED", "Quota exceeded")),
      )
      .mount(&server)
      .await;

    let err = client(&server).generate("x".into()).await.unwrap_err();
    assert!(matches!(err, GenerationError::RateLimited));
  }

  #[tokio::test]
  async fn http_503_is_overloaded_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path(ENDPOINT))
      .respond_with(
        ResponseTemplate::new(503)
          .set_body_json(error_body(503, "UNAVAILABLE", "The model is overloaded.")),
      )
      .expect(1)
      .mount(&server)
      .await;

    let err = client(&server).generate("x".into()).await.unwrap_err();
    assert!(matches!(err, GenerationError::ServiceOverloaded));
  }

  #[tokio::test]
  async fn other_failures_carry_the_upstream_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path(ENDPOINT))
      .respond_with(
        ResponseTemplate::new(400)
          .set_body_json(error_body(400, "INVALID_ARGUMENT", "API key not valid.")),
      )
      .mount(&server)
      .await;

    let err = client(&server).generate("x".into()).await.unwrap_err();
    match err {
      GenerationError::Failed(message) => assert_eq!(message, "API key not valid."),
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[tokio::test]
  async fn unstructured_failure_body_is_reported_with_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path(ENDPOINT))
      .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
      .mount(&server)
      .await;

    let err = client(&server).generate("x".into()).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 500: boom");
  }

  #[tokio::test]
  async fn missing_candidates_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path(ENDPOINT))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
      .mount(&server)
      .await;

    let err = client(&server).generate("x".into()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Malformed { .. }));
  }

  #[test]
  fn debug_hides_api_key() {
    let c = GeminiClient::new("secret", DEFAULT_BASE_URL, None).unwrap();
    let shown = format!("{c:?}");
    assert!(!shown.contains("secret"));
    assert!(shown.contains("gemini-2.5-flash"));
  }

  #[test]
  fn truncate_respects_char_boundaries() {
    assert_eq!(truncate("héllo", 2), "h");
    assert_eq!(truncate("abc", 10), "abc");
  }
}
