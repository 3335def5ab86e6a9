//! Router tests against an in-memory store and a scripted model.

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use cram_ai::{GenerationError, Generator, scripted::ScriptedModel};
use cram_core::{
  auth::NewUser,
  content::MAX_UPLOAD_BYTES,
  store::{AuthStore, StudyStore},
};
use cram_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, router};

const BOUNDARY: &str = "cram-test-boundary";

const QUIZ_REPLY: &str = r#"```json
[
  {"question":"What do plants release?","options":["Oxygen","Nitrogen","Helium","Argon"],"correctAnswer":"Oxygen","explanation":"By-product of photosynthesis."},
  {"question":"Where does it happen?","options":["Chloroplast","Nucleus","Ribosome","Vacuole"],"correctAnswer":"Chloroplast","explanation":"Chlorophyll lives there."}
]
```"#;

const FLASHCARD_REPLY: &str =
  r#"[{"front":"Chlorophyll","back":"Green pigment"},{"front":"Stomata","back":"Leaf pores"}]"#;

struct Harness {
  state: AppState<SqliteStore, ScriptedModel>,
  model: ScriptedModel,
  user:  Uuid,
}

async fn harness() -> Harness {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let user = store.create_user(NewUser::new("ada@example.com")).await.unwrap().id;
  let model = ScriptedModel::default();
  let state = AppState::new(store, Generator::new(model.clone()));
  Harness { state, model, user }
}

// ─── Request helpers ─────────────────────────────────────────────────────────

enum Part<'a> {
  Text(&'a str, &'a str),
  File { filename: &'a str, content_type: &'a str, data: &'a [u8] },
}

fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
  let mut body = Vec::new();
  for part in parts {
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    match part {
      Part::Text(name, value) => {
        body.extend_from_slice(
          format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
            .as_bytes(),
        );
      }
      Part::File { filename, content_type, data } => {
        body.extend_from_slice(
          format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
          )
          .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
      }
    }
  }
  body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
  body
}

async fn send(h: &Harness, req: Request<Body>) -> Response {
  router(h.state.clone()).oneshot(req).await.unwrap()
}

async fn post_form(h: &Harness, uri: &str, parts: &[Part<'_>]) -> Response {
  let req = Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
    .body(Body::from(multipart(parts)))
    .unwrap();
  send(h, req).await
}

async fn post_json(h: &Harness, uri: &str, body: Value) -> Response {
  let req = Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap();
  send(h, req).await
}

async fn call(h: &Harness, method: &str, uri: &str) -> Response {
  let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
  send(h, req).await
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
  let h = harness().await;
  let resp = call(&h, "GET", "/health").await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await, json!({ "ok": true }));
}

// ─── Summaries ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn text_summary_is_generated_and_persisted() {
  let h = harness().await;
  h.model.push_ok("- Plants make sugar from light.");
  let user = h.user.to_string();

  let resp = post_form(&h, "/api/study/summaries", &[
    Part::Text("userId", &user),
    Part::Text("sourceType", "text"),
    Part::Text("text", "Photosynthesis converts light into chemical energy."),
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let body = json_body(resp).await;
  assert_eq!(body["title"], "Summary");
  assert_eq!(body["sourceType"], "text");
  assert_eq!(body["content"], "- Plants make sugar from light.");
  assert_eq!(body["sourceData"], "Photosynthesis converts light into chemical energy.");

  let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
  assert!(h.state.store.get_summary(id).await.unwrap().is_some());
}

#[tokio::test]
async fn txt_upload_keeps_filename_as_source_data() {
  let h = harness().await;
  h.model.push_ok("Summary of the notes.");
  let user = h.user.to_string();

  let resp = post_form(&h, "/api/study/summaries", &[
    Part::Text("userId", &user),
    Part::Text("sourceType", "file"),
    Part::Text("title", "Biology notes"),
    Part::File {
      filename:     "notes.txt",
      content_type: "text/plain; charset=utf-8",
      data:         b"Mitochondria produce ATP.",
    },
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let body = json_body(resp).await;
  assert_eq!(body["sourceType"], "file");
  assert_eq!(body["sourceData"], "notes.txt");
  assert_eq!(body["title"], "Biology notes");
  assert!(!body["content"].as_str().unwrap().is_empty());
  assert!(h.model.prompts()[0].ends_with("Mitochondria produce ATP."));
}

#[tokio::test]
async fn missing_user_id_is_a_400() {
  let h = harness().await;
  let resp = post_form(&h, "/api/study/summaries", &[Part::Text("text", "hello")]).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(resp).await, json!({ "error": "User ID is required" }));
  assert!(h.model.prompts().is_empty());
}

#[tokio::test]
async fn unknown_user_is_a_404_before_generation() {
  let h = harness().await;
  let stranger = Uuid::new_v4().to_string();
  let resp = post_form(&h, "/api/study/summaries", &[
    Part::Text("userId", &stranger),
    Part::Text("text", "hello"),
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert!(h.model.prompts().is_empty());
}

#[tokio::test]
async fn pdf_upload_is_unsupported_media_type() {
  let h = harness().await;
  let user = h.user.to_string();
  let resp = post_form(&h, "/api/study/summaries", &[
    Part::Text("userId", &user),
    Part::Text("sourceType", "file"),
    Part::File { filename: "notes.pdf", content_type: "application/pdf", data: b"%PDF-1.7" },
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
  assert!(h.model.prompts().is_empty());
}

#[tokio::test]
async fn oversized_upload_is_a_413() {
  let h = harness().await;
  let user = h.user.to_string();
  let data = vec![b'a'; MAX_UPLOAD_BYTES + 1];
  let resp = post_form(&h, "/api/study/summaries", &[
    Part::Text("userId", &user),
    Part::Text("sourceType", "file"),
    Part::File { filename: "big.txt", content_type: "text/plain", data: &data },
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn rate_limit_maps_to_429_with_fixed_message() {
  let h = harness().await;
  h.model.push_err(GenerationError::RateLimited);
  let user = h.user.to_string();

  let resp = post_form(&h, "/api/study/summaries", &[
    Part::Text("userId", &user),
    Part::Text("text", "hello"),
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
  let body = json_body(resp).await;
  assert_eq!(body["error"], "Rate limit exceeded. Please try again later.");
  assert!(h.state.store.list_summaries(h.user).await.unwrap().is_empty());
}

#[tokio::test]
async fn overload_maps_to_503() {
  let h = harness().await;
  h.model.push_err(GenerationError::ServiceOverloaded);
  let user = h.user.to_string();

  let resp = post_form(&h, "/api/study/flashcards", &[
    Part::Text("userId", &user),
    Part::Text("text", "hello"),
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  let body = json_body(resp).await;
  assert_eq!(body["error"], "AI service is temporarily overloaded. Please try again in a moment.");
}

#[tokio::test]
async fn other_generation_failure_is_a_500_with_details() {
  let h = harness().await;
  h.model.push_err(GenerationError::Failed("API key not valid.".into()));
  let user = h.user.to_string();

  let resp = post_form(&h, "/api/study/quizzes", &[
    Part::Text("userId", &user),
    Part::Text("text", "hello"),
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(
    json_body(resp).await,
    json!({ "error": "Failed to create quiz", "details": "API key not valid." })
  );
}

#[tokio::test]
async fn unparseable_quiz_is_a_502() {
  let h = harness().await;
  h.model.push_ok("Sorry, I cannot help with that.");
  let user = h.user.to_string();

  let resp = post_form(&h, "/api/study/quizzes", &[
    Part::Text("userId", &user),
    Part::Text("text", "hello"),
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
  assert!(h.state.store.list_quizzes(h.user).await.unwrap().is_empty());
}

#[tokio::test]
async fn summaries_list_newest_first() {
  let h = harness().await;
  let user = h.user.to_string();
  for title in ["first", "second", "third"] {
    h.model.push_ok(format!("content of {title}"));
    let resp = post_form(&h, "/api/study/summaries", &[
      Part::Text("userId", &user),
      Part::Text("title", title),
      Part::Text("text", "hello"),
    ])
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  let resp = call(&h, "GET", &format!("/api/study/summaries/user/{user}")).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  let titles: Vec<&str> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["title"].as_str().unwrap())
    .collect();
  assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn missing_summary_is_a_404() {
  let h = harness().await;
  let resp = call(&h, "GET", &format!("/api/study/summaries/{}", Uuid::new_v4())).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert_eq!(json_body(resp).await, json!({ "error": "Summary not found" }));
}

// ─── Quizzes ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn quiz_defaults_to_five_questions() {
  let h = harness().await;
  h.model.push_ok(QUIZ_REPLY);
  let user = h.user.to_string();

  let resp = post_form(&h, "/api/study/quizzes", &[
    Part::Text("userId", &user),
    Part::Text("text", "Photosynthesis happens in chloroplasts."),
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  assert!(h.model.prompts()[0].contains("Create a quiz with 5 multiple-choice questions"));

  let body = json_body(resp).await;
  assert_eq!(body["title"], "Quiz");
  let questions = body["questions"].as_array().unwrap();
  assert_eq!(questions.len(), 2);
  assert_eq!(questions[0]["correctAnswer"], "Oxygen");
  assert_eq!(questions[1]["order"], 1);
}

#[tokio::test]
async fn question_count_reaches_the_prompt_and_is_bounded() {
  let h = harness().await;
  h.model.push_ok(QUIZ_REPLY);
  let user = h.user.to_string();

  let resp = post_form(&h, "/api/study/quizzes", &[
    Part::Text("userId", &user),
    Part::Text("text", "hello"),
    Part::Text("questionCount", "2"),
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  assert!(h.model.prompts()[0].contains("with 2 multiple-choice"));

  let resp = post_form(&h, "/api/study/quizzes", &[
    Part::Text("userId", &user),
    Part::Text("text", "hello"),
    Part::Text("questionCount", "500"),
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_quiz_removes_its_questions() {
  let h = harness().await;
  h.model.push_ok(QUIZ_REPLY);
  let user = h.user.to_string();

  let resp = post_form(&h, "/api/study/quizzes", &[
    Part::Text("userId", &user),
    Part::Text("text", "hello"),
  ])
  .await;
  let id: Uuid = json_body(resp).await["id"].as_str().unwrap().parse().unwrap();
  assert_eq!(h.state.store.count_questions(id).await.unwrap(), 2);

  let resp = call(&h, "DELETE", &format!("/api/study/quizzes/{id}")).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await, json!({ "message": "Quiz deleted successfully" }));
  assert_eq!(h.state.store.count_questions(id).await.unwrap(), 0);

  let resp = call(&h, "GET", &format!("/api/study/quizzes/{id}")).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ─── Flashcards ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn flashcard_set_roundtrip_over_http() {
  let h = harness().await;
  h.model.push_ok(FLASHCARD_REPLY);
  let user = h.user.to_string();

  let resp = post_form(&h, "/api/study/flashcards", &[
    Part::Text("userId", &user),
    Part::Text("text", "Leaves"),
    Part::Text("cardCount", "2"),
  ])
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created = json_body(resp).await;
  let id = created["id"].as_str().unwrap();

  let resp = call(&h, "GET", &format!("/api/study/flashcards/{id}")).await;
  let fetched = json_body(resp).await;
  assert_eq!(fetched, created);
  assert_eq!(fetched["flashcards"][1]["front"], "Stomata");
}

#[tokio::test]
async fn deleting_a_missing_flashcard_set_succeeds() {
  let h = harness().await;
  let resp = call(&h, "DELETE", &format!("/api/study/flashcards/{}", Uuid::new_v4())).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await, json!({ "message": "Flashcard set deleted successfully" }));
}

// ─── Malformed requests ──────────────────────────────────────────────────────

fn is_json(resp: &Response) -> bool {
  resp
    .headers()
    .get(header::CONTENT_TYPE)
    .is_some_and(|v| v.as_bytes().starts_with(b"application/json"))
}

#[tokio::test]
async fn non_uuid_study_ids_name_no_record() {
  let h = harness().await;

  let resp = call(&h, "GET", "/api/study/summaries/not-a-uuid").await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert!(is_json(&resp));
  assert_eq!(json_body(resp).await, json!({ "error": "Summary not found" }));

  let resp = call(&h, "DELETE", "/api/study/flashcards/not-a-uuid").await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await, json!({ "message": "Flashcard set deleted successfully" }));

  let resp = call(&h, "GET", "/api/study/quizzes/user/not-a-uuid").await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await, json!([]));
}

#[tokio::test]
async fn non_uuid_user_id_is_a_404() {
  let h = harness().await;
  let resp = call(&h, "GET", "/api/auth/user/id/not-a-uuid").await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert_eq!(json_body(resp).await, json!({ "error": "User not found" }));
}

#[tokio::test]
async fn json_body_missing_email_is_a_json_error() {
  let h = harness().await;
  let resp = post_json(&h, "/api/auth/user", json!({ "name": "x" })).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  assert!(is_json(&resp));
  let body = json_body(resp).await;
  assert_eq!(body["error"], "Invalid request");
  assert!(body["details"].as_str().unwrap().contains("email"), "{body}");
}

#[tokio::test]
async fn json_sent_to_an_upload_endpoint_is_a_json_error() {
  let h = harness().await;
  let resp = post_json(&h, "/api/study/summaries", json!({ "text": "notes" })).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(is_json(&resp));
  assert_eq!(json_body(resp).await["error"], "Invalid request");
  assert!(h.model.prompts().is_empty());
}

// ─── Auth bookkeeping ────────────────────────────────────────────────────────

#[tokio::test]
async fn expired_session_is_still_returned() {
  let h = harness().await;
  let resp = post_json(&h, "/api/auth/session", json!({
    "sessionToken": "stale",
    "userId": h.user,
    "expires": "2000-01-01T00:00:00Z"
  }))
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = call(&h, "GET", "/api/auth/session/stale").await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn user_session_account_lifecycle() {
  let h = harness().await;

  let resp = post_json(&h, "/api/auth/user", json!({ "email": "bob@example.com", "name": "Bob" })).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let user = json_body(resp).await;
  let user_id = user["id"].as_str().unwrap().to_owned();

  let resp = post_json(&h, "/api/auth/session", json!({
    "sessionToken": "tok-1",
    "userId": user_id,
    "expires": "2030-01-01T00:00:00Z"
  }))
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = post_json(&h, "/api/auth/account", json!({
    "userId": user_id,
    "type": "oauth",
    "provider": "google",
    "providerAccountId": "g-42",
    "access_token": "ya29.token"
  }))
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = call(&h, "GET", "/api/auth/user/email/bob@example.com").await;
  assert_eq!(resp.status(), StatusCode::OK);
  let profile = json_body(resp).await;
  assert_eq!(profile["name"], "Bob");
  assert_eq!(profile["accounts"][0]["provider"], "google");
  assert_eq!(profile["sessions"][0]["sessionToken"], "tok-1");

  let resp = call(&h, "GET", "/api/auth/session/tok-1").await;
  let session = json_body(resp).await;
  assert_eq!(session["user"]["email"], "bob@example.com");

  let resp = call(&h, "GET", "/api/auth/account/google/g-42").await;
  let account = json_body(resp).await;
  assert_eq!(account["access_token"], "ya29.token");
  assert_eq!(account["user"]["id"], user_id.as_str());

  let resp = call(&h, "DELETE", "/api/auth/session/tok-1").await;
  assert_eq!(json_body(resp).await, json!({ "success": true }));
  let resp = call(&h, "GET", "/api/auth/session/tok-1").await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_user_changes_only_given_fields() {
  let h = harness().await;
  let req = Request::builder()
    .method("PUT")
    .uri(format!("/api/auth/user/{}", h.user))
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(json!({ "name": "Ada Lovelace" }).to_string()))
    .unwrap();
  let resp = send(&h, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let user = json_body(resp).await;
  assert_eq!(user["name"], "Ada Lovelace");
  assert_eq!(user["email"], "ada@example.com");
}

#[tokio::test]
async fn deleting_a_user_removes_their_material() {
  let h = harness().await;
  h.model.push_ok("content");
  let user = h.user.to_string();
  post_form(&h, "/api/study/summaries", &[
    Part::Text("userId", &user),
    Part::Text("text", "hello"),
  ])
  .await;

  let resp = call(&h, "DELETE", &format!("/api/auth/user/{user}")).await;
  assert_eq!(json_body(resp).await, json!({ "success": true }));

  let resp = call(&h, "GET", &format!("/api/study/summaries/user/{user}")).await;
  assert_eq!(json_body(resp).await, json!([]));
  let resp = call(&h, "GET", &format!("/api/auth/user/id/{user}")).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
