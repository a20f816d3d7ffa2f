//! Router-level tests against an in-memory store.

use std::{io::Read as _, path::PathBuf, sync::Arc};

use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version, password_hash::SaltString};
use axum::{
  body::{Body, Bytes, to_bytes},
  http::{HeaderMap, Request, StatusCode, header},
};
use chrono::Utc;
use rand_core::OsRng;
use serde_json::{Value, json};
use topics_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use super::*;

const PASSWORD: &str = "correct horse";

fn server_config(password_hash: String) -> ServerConfig {
  ServerConfig {
    host:                "127.0.0.1".to_string(),
    port:                3000,
    store_path:          PathBuf::from(":memory:"),
    admin_username:      "registrar".to_string(),
    admin_password_hash: password_hash,
    token_secret:        "router-test-secret".to_string(),
    token_ttl_minutes:   60,
  }
}

async fn make_state() -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let salt = SaltString::generate(&mut OsRng);
  let params = Params::new(1024, 1, 1, None).unwrap();
  let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    .hash_password(PASSWORD.as_bytes(), &salt)
    .unwrap()
    .to_string();

  AppState {
    store: Arc::new(store),
    auth:  Arc::new(server_config(hash).auth().unwrap()),
  }
}

fn admin_token(state: &AppState<SqliteStore>) -> String {
  state.auth.issue_token(Utc::now()).unwrap().token
}

struct Reply {
  status:  StatusCode,
  headers: HeaderMap,
  body:    Bytes,
}

impl Reply {
  fn json(&self) -> Value { serde_json::from_slice(&self.body).unwrap() }

  fn text(&self) -> String { String::from_utf8(self.body.to_vec()).unwrap() }
}

async fn send(
  state:  &AppState<SqliteStore>,
  method: &str,
  uri:    &str,
  token:  Option<&str>,
  body:   Option<Value>,
) -> Reply {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };

  let resp = router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let headers = resp.headers().clone();
  let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  Reply { status, headers, body }
}

fn submission_body(name: &str, matric: &str, discipline: &str) -> Value {
  json!({
    "fullName": name,
    "matricNumber": matric,
    "discipline": discipline,
    "projectTopic": "Language attitudes among secondary school students",
  })
}

async fn submit(state: &AppState<SqliteStore>, name: &str, matric: &str, discipline: &str) -> Value {
  let reply = send(
    state,
    "POST",
    "/api/submissions",
    None,
    Some(submission_body(name, matric, discipline)),
  )
  .await;
  assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text());
  reply.json()["data"].clone()
}

// ── Health ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
  let state = make_state().await;
  let reply = send(&state, "GET", "/health", None, None).await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.text(), "ok");
}

// ── Create / list ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_list_returns_normalized_record() {
  let state = make_state().await;
  let reply = send(
    &state,
    "POST",
    "/api/submissions",
    None,
    Some(json!({
      "fullName": "  Ada Obi ",
      "matricNumber": " 2021/ling/001 ",
      "discipline": "linguistics",
      "projectTopic": "  Tone sandhi in Igbo dialects  ",
    })),
  )
  .await;
  assert_eq!(reply.status, StatusCode::CREATED);
  let created = reply.json();
  assert_eq!(created["success"], true);
  assert_eq!(created["message"], "Topic submitted successfully!");
  assert_eq!(created["data"]["matricNumber"], "2021/LING/001");

  let token = admin_token(&state);
  let list = send(&state, "GET", "/api/submissions", Some(&token), None).await;
  assert_eq!(list.status, StatusCode::OK);
  let list = list.json();
  assert_eq!(list["count"], 1);
  let record = &list["data"][0];
  assert_eq!(record["id"], created["data"]["id"]);
  assert_eq!(record["fullName"], "Ada Obi");
  assert_eq!(record["matricNumber"], "2021/LING/001");
  assert_eq!(record["discipline"], "linguistics");
  assert_eq!(record["projectTopic"], "Tone sandhi in Igbo dialects");
}

#[tokio::test]
async fn missing_fields_are_listed() {
  let state = make_state().await;
  let reply = send(
    &state,
    "POST",
    "/api/submissions",
    None,
    Some(json!({ "fullName": "Ada Obi", "discipline": "" })),
  )
  .await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);
  let body = reply.json();
  assert_eq!(body["success"], false);
  assert_eq!(
    body["message"],
    "All fields are required (missing: matricNumber, discipline, projectTopic)"
  );
}

#[tokio::test]
async fn invalid_field_is_rejected() {
  let state = make_state().await;
  let reply = send(
    &state,
    "POST",
    "/api/submissions",
    None,
    Some(submission_body("Ada Obi", "2021/001", "physics")),
  )
  .await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);
  assert_eq!(
    reply.json()["message"],
    "Discipline must be either linguistics or communication"
  );
}

#[tokio::test]
async fn malformed_json_has_uniform_shape() {
  let state = make_state().await;
  let req = Request::builder()
    .method("POST")
    .uri("/api/submissions")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = router(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value =
    serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
  assert_eq!(body["success"], false);
  assert!(body["message"].is_string());
}

#[tokio::test]
async fn duplicate_matric_differing_in_case_conflicts() {
  let state = make_state().await;
  submit(&state, "Ada Obi", "2021/abc", "linguistics").await;

  let reply = send(
    &state,
    "POST",
    "/api/submissions",
    None,
    Some(submission_body("Bola Ade", "2021/ABC", "communication")),
  )
  .await;
  assert_eq!(reply.status, StatusCode::CONFLICT);
  assert_eq!(reply.json()["message"], "This matric number has already been used");
}

#[tokio::test]
async fn duplicate_name_differing_in_case_conflicts() {
  let state = make_state().await;
  submit(&state, "Ada Obi", "2021/001", "linguistics").await;

  let reply = send(
    &state,
    "POST",
    "/api/submissions",
    None,
    Some(submission_body("ADA OBI", "2021/002", "linguistics")),
  )
  .await;
  assert_eq!(reply.status, StatusCode::CONFLICT);
  assert_eq!(
    reply.json()["message"],
    "A submission with this full name already exists"
  );
}

#[tokio::test]
async fn list_filters_by_discipline() {
  let state = make_state().await;
  submit(&state, "Ada Obi", "2021/001", "linguistics").await;
  submit(&state, "Bola Ade", "2021/002", "communication").await;
  let token = admin_token(&state);

  let reply = send(
    &state,
    "GET",
    "/api/submissions?discipline=communication",
    Some(&token),
    None,
  )
  .await;
  let body = reply.json();
  assert_eq!(body["count"], 1);
  assert_eq!(body["data"][0]["fullName"], "Bola Ade");

  let all = send(&state, "GET", "/api/submissions?discipline=", Some(&token), None).await;
  assert_eq!(all.json()["count"], 2);

  let bad = send(&state, "GET", "/api/submissions?discipline=law", Some(&token), None).await;
  assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

// ── Get one / update / delete ──────────────────────────────────────────────────

#[tokio::test]
async fn get_one_and_malformed_id() {
  let state = make_state().await;
  let created = submit(&state, "Ada Obi", "2021/001", "linguistics").await;
  let token = admin_token(&state);
  let id = created["id"].as_str().unwrap();

  let found = send(&state, "GET", &format!("/api/submissions/{id}"), Some(&token), None).await;
  assert_eq!(found.status, StatusCode::OK);
  assert_eq!(found.json()["data"]["fullName"], "Ada Obi");

  let bad = send(&state, "GET", "/api/submissions/not-a-uuid", Some(&token), None).await;
  assert_eq!(bad.status, StatusCode::BAD_REQUEST);
  assert_eq!(bad.json()["message"], "Invalid submission ID");
}

#[tokio::test]
async fn undecodable_id_has_uniform_shape() {
  let state = make_state().await;
  let token = admin_token(&state);

  for method in ["GET", "DELETE"] {
    let reply = send(&state, method, "/api/submissions/%FF", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{method}");
    let body: Value = serde_json::from_slice(&reply.body).expect("json error body");
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
  }

  let reply = send(
    &state,
    "PUT",
    "/api/submissions/%FF",
    Some(&token),
    Some(submission_body("Ada Obi", "2021/001", "linguistics")),
  )
  .await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);
  assert_eq!(reply.json()["success"], false);
}

#[tokio::test]
async fn update_overwrites_fields() {
  let state = make_state().await;
  let created = submit(&state, "Ada Obi", "2021/001", "linguistics").await;
  let token = admin_token(&state);
  let id = created["id"].as_str().unwrap();

  let mut body = submission_body("Ada Obi Nwosu", "2021/009", "communication");
  body["projectTopic"] = json!("Radio drama and public health messaging");
  let reply = send(&state, "PUT", &format!("/api/submissions/{id}"), Some(&token), Some(body)).await;
  assert_eq!(reply.status, StatusCode::OK);
  let reply = reply.json();
  assert_eq!(reply["message"], "Submission updated successfully!");
  assert_eq!(reply["data"]["fullName"], "Ada Obi Nwosu");
  assert_eq!(reply["data"]["discipline"], "communication");
  assert!(reply["data"]["updatedAt"].is_string());
}

#[tokio::test]
async fn update_with_taken_matric_conflicts_and_keeps_record() {
  let state = make_state().await;
  submit(&state, "Ada Obi", "2021/001", "linguistics").await;
  let other = submit(&state, "Bola Ade", "2021/002", "communication").await;
  let token = admin_token(&state);
  let id = other["id"].as_str().unwrap();

  let reply = send(
    &state,
    "PUT",
    &format!("/api/submissions/{id}"),
    Some(&token),
    Some(submission_body("Bola Ade", "2021/001", "communication")),
  )
  .await;
  assert_eq!(reply.status, StatusCode::CONFLICT);
  assert_eq!(
    reply.json()["message"],
    "A submission with this matric number already exists"
  );

  let still = send(&state, "GET", &format!("/api/submissions/{id}"), Some(&token), None).await;
  assert_eq!(still.json()["data"]["matricNumber"], "2021/002");
}

#[tokio::test]
async fn update_missing_is_not_found() {
  let state = make_state().await;
  let token = admin_token(&state);
  let reply = send(
    &state,
    "PUT",
    &format!("/api/submissions/{}", uuid::Uuid::new_v4()),
    Some(&token),
    Some(submission_body("Ada Obi", "2021/001", "linguistics")),
  )
  .await;
  assert_eq!(reply.status, StatusCode::NOT_FOUND);
  assert_eq!(reply.json()["message"], "Submission not found");
}

#[tokio::test]
async fn delete_removes_record_and_missing_is_404() {
  let state = make_state().await;
  let created = submit(&state, "Ada Obi", "2021/001", "linguistics").await;
  let token = admin_token(&state);
  let uri = format!("/api/submissions/{}", created["id"].as_str().unwrap());

  let reply = send(&state, "DELETE", &uri, Some(&token), None).await;
  assert_eq!(reply.status, StatusCode::OK);
  let body = reply.json();
  assert_eq!(body["message"], "Submission deleted successfully");
  assert_eq!(body["data"]["fullName"], "Ada Obi");

  let list = send(&state, "GET", "/api/submissions", Some(&token), None).await;
  assert_eq!(list.json()["count"], 0);

  let again = send(&state, "DELETE", &uri, Some(&token), None).await;
  assert_eq!(again.status, StatusCode::NOT_FOUND);
}

// ── Stats ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_count_today() {
  let state = make_state().await;
  submit(&state, "Ada Obi", "2021/001", "linguistics").await;
  submit(&state, "Bola Ade", "2021/002", "communication").await;
  let token = admin_token(&state);

  let reply = send(&state, "GET", "/api/submissions/stats", Some(&token), None).await;
  assert_eq!(reply.status, StatusCode::OK);
  let data = &reply.json()["data"];
  assert_eq!(data["total"], 2);
  assert_eq!(data["linguistics"], 1);
  assert_eq!(data["communication"], 1);
  assert_eq!(data["today"], 2);
}

// ── Export ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn csv_export_has_header_plus_one_line_per_record() {
  let state = make_state().await;
  submit(&state, "Ada Obi", "2021/001", "linguistics").await;
  submit(&state, "Bola Ade", "2021/002", "communication").await;
  submit(&state, "Chidi Eze", "2021/003", "linguistics").await;
  let token = admin_token(&state);

  let reply = send(&state, "GET", "/api/export?format=csv", Some(&token), None).await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.headers[header::CONTENT_TYPE], "text/csv");
  let disposition = reply.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
  assert!(disposition.starts_with("attachment; filename=\"topic-submissions-"));
  assert!(disposition.ends_with(".csv\""));

  let csv = reply.text();
  let lines: Vec<_> = csv.lines().collect();
  assert_eq!(lines.len(), 4);
  assert_eq!(
    lines[0],
    "S/N,Full Name,Matric Number,Discipline,Project Topic,Date Submitted"
  );

  // Newest first, matching the list endpoint.
  let list = send(&state, "GET", "/api/submissions", Some(&token), None).await.json();
  for (i, line) in lines[1..].iter().enumerate() {
    let record = &list["data"][i];
    assert!(line.starts_with(&format!("{},", i + 1)));
    assert!(line.contains(record["fullName"].as_str().unwrap()));
    assert!(line.contains(record["matricNumber"].as_str().unwrap()));
  }
}

#[tokio::test]
async fn export_format_defaults_to_csv() {
  let state = make_state().await;
  submit(&state, "Ada Obi", "2021/001", "linguistics").await;
  let token = admin_token(&state);

  let reply = send(
    &state,
    "GET",
    "/api/export?discipline=linguistics",
    Some(&token),
    None,
  )
  .await;
  assert_eq!(reply.status, StatusCode::OK);
  let disposition = reply.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
  assert!(disposition.contains("linguistics-submissions-"));
}

#[tokio::test]
async fn export_of_empty_discipline_is_not_found() {
  let state = make_state().await;
  submit(&state, "Bola Ade", "2021/002", "communication").await;
  let token = admin_token(&state);

  let reply = send(
    &state,
    "GET",
    "/api/export?format=csv&discipline=linguistics",
    Some(&token),
    None,
  )
  .await;
  assert_eq!(reply.status, StatusCode::NOT_FOUND);
  assert_eq!(reply.json()["message"], "No submissions found");
}

#[tokio::test]
async fn export_rejects_unknown_format() {
  let state = make_state().await;
  submit(&state, "Ada Obi", "2021/001", "linguistics").await;
  let token = admin_token(&state);

  let reply = send(&state, "GET", "/api/export?format=pdf", Some(&token), None).await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);
  assert_eq!(
    reply.json()["message"],
    "Unsupported export format. Use csv or docx."
  );
}

#[tokio::test]
async fn docx_export_is_a_word_package() {
  let state = make_state().await;
  submit(&state, "Ada Obi", "2021/001", "linguistics").await;
  submit(&state, "Bola Ade", "2021/002", "communication").await;
  let token = admin_token(&state);

  let reply = send(&state, "GET", "/api/export?format=docx", Some(&token), None).await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(
    reply.headers[header::CONTENT_TYPE],
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
  );

  let mut archive = zip::ZipArchive::new(std::io::Cursor::new(reply.body.to_vec())).unwrap();
  let mut xml = String::new();
  archive
    .by_name("word/document.xml")
    .unwrap()
    .read_to_string(&mut xml)
    .unwrap();
  assert!(xml.contains("Topic Submissions Report - All Disciplines"));
  assert!(xml.contains("Ada Obi"));
  assert!(xml.contains("Bola Ade"));
}

// ── Admin gate ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_routes_require_token() {
  let state = make_state().await;
  let id = uuid::Uuid::new_v4();
  let routes = [
    ("GET", "/api/submissions".to_string()),
    ("GET", "/api/submissions/stats".to_string()),
    ("GET", format!("/api/submissions/{id}")),
    ("DELETE", format!("/api/submissions/{id}")),
    ("GET", "/api/export".to_string()),
  ];
  for (method, uri) in routes {
    let reply = send(&state, method, &uri, None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    assert_eq!(reply.json()["success"], false);
  }

  let put = send(
    &state,
    "PUT",
    &format!("/api/submissions/{id}"),
    Some("garbage"),
    Some(submission_body("Ada Obi", "2021/001", "linguistics")),
  )
  .await;
  assert_eq!(put.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_usable_token() {
  let state = make_state().await;
  let reply = send(
    &state,
    "POST",
    "/api/admin/login",
    None,
    Some(json!({ "username": "registrar", "password": PASSWORD })),
  )
  .await;
  assert_eq!(reply.status, StatusCode::OK);
  let body = reply.json();
  assert_eq!(body["success"], true);
  assert!(body["data"]["expiresAt"].is_string());
  let token = body["data"]["token"].as_str().unwrap().to_string();

  let list = send(&state, "GET", "/api/submissions", Some(&token), None).await;
  assert_eq!(list.status, StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
  let state = make_state().await;
  let reply = send(
    &state,
    "POST",
    "/api/admin/login",
    None,
    Some(json!({ "username": "registrar", "password": "wrong" })),
  )
  .await;
  assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
  assert_eq!(
    reply.json()["message"],
    "Invalid credentials. Please check your username and password."
  );
}

#[tokio::test]
async fn expired_token_is_rejected() {
  let state = make_state().await;
  let stale = state
    .auth
    .issue_token(Utc::now() - chrono::Duration::hours(3))
    .unwrap()
    .token;
  let reply = send(&state, "GET", "/api/submissions", Some(&stale), None).await;
  assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[test]
fn token_ttl_outside_bounds_is_rejected() {
  let mut config = server_config("unused".to_string());
  for ttl in [0, -5, MAX_TOKEN_TTL_MINUTES + 1, 1_000_000_000_000] {
    config.token_ttl_minutes = ttl;
    assert!(
      matches!(config.auth(), Err(ConfigError::TokenTtl(t)) if t == ttl),
      "{ttl}"
    );
  }

  config.token_ttl_minutes = MAX_TOKEN_TTL_MINUTES;
  assert!(config.auth().is_ok());
}

#[tokio::test]
async fn login_with_unrepresentable_expiry_is_a_server_error() {
  let state = make_state().await;
  let mut auth = (*state.auth).clone();
  auth.token_ttl = chrono::Duration::days(300_000 * 365);
  let state = AppState { store: state.store.clone(), auth: Arc::new(auth) };

  let reply = send(
    &state,
    "POST",
    "/api/admin/login",
    None,
    Some(json!({ "username": "registrar", "password": PASSWORD })),
  )
  .await;
  assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
  let body = reply.json();
  assert_eq!(body["success"], false);
  assert_eq!(body["message"], "Failed to sign in");
}
