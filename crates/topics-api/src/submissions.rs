//! Handlers for `/submissions` endpoints.
//!
//! | Method   | Path                 | Notes |
//! |----------|----------------------|-------|
//! | `POST`   | `/submissions`       | Public. Body: the four submission fields |
//! | `GET`    | `/submissions`       | Optional `?discipline=linguistics\|communication` |
//! | `GET`    | `/submissions/stats` | Dashboard counts |
//! | `GET`    | `/submissions/{id}`  | 404 if not found |
//! | `PUT`    | `/submissions/{id}`  | Overwrites all four fields |
//! | `DELETE` | `/submissions/{id}`  | Returns the removed record's identity |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use topics_core::{
  store::{ErrorKind, StoreError as _, SubmissionStore},
  submission::{Discipline, Submission, SubmissionInput},
};
use uuid::Uuid;

use crate::{AppState, auth::AdminSession, error::ApiError};

/// Identity of a record, echoed back after create and delete.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionRef {
  id:            Uuid,
  full_name:     String,
  matric_number: String,
}

impl From<&Submission> for SubmissionRef {
  fn from(s: &Submission) -> Self {
    Self {
      id:            s.id,
      full_name:     s.full_name.clone(),
      matric_number: s.matric_number.clone(),
    }
  }
}

type IdPath = Result<Path<String>, PathRejection>;

fn parse_id(path: IdPath) -> Result<Uuid, ApiError> {
  let Path(raw) = path?;
  Uuid::parse_str(&raw).map_err(|_| ApiError::BadRequest("Invalid submission ID".into()))
}

/// An absent or empty `discipline` parameter means "all".
pub(crate) fn parse_discipline(raw: Option<&str>) -> Result<Option<Discipline>, ApiError> {
  match raw.filter(|s| !s.is_empty()) {
    Some(s) => Ok(Some(Discipline::parse(s)?)),
    None => Ok(None),
  }
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /submissions`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<SubmissionInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubmissionStore + Clone + 'static,
{
  let Json(input) = body?;
  let new = input.validate()?;

  let created = state.store.create(new).await.map_err(|e| match e.kind() {
    ErrorKind::DuplicateMatricNumber => {
      ApiError::Conflict("This matric number has already been used")
    }
    _ => ApiError::from_store(e, "An error occurred while submitting your topic"),
  })?;

  tracing::info!(id = %created.id, discipline = %created.discipline, "submission created");
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "success": true,
      "message": "Topic submitted successfully!",
      "data": SubmissionRef::from(&created),
    })),
  ))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub discipline: Option<String>,
}

/// `GET /submissions[?discipline=<discipline>]`
pub async fn list<S>(
  _admin: AdminSession,
  State(state): State<AppState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: SubmissionStore + Clone + 'static,
{
  let Query(params) = params?;
  let discipline = parse_discipline(params.discipline.as_deref())?;

  let submissions = state
    .store
    .list(discipline)
    .await
    .map_err(|e| ApiError::from_store(e, "Failed to fetch submissions"))?;

  let count = submissions.len();
  Ok(Json(json!({ "success": true, "data": submissions, "count": count })))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /submissions/stats`
pub async fn stats<S>(
  _admin: AdminSession,
  State(state): State<AppState<S>>,
) -> Result<Json<Value>, ApiError>
where
  S: SubmissionStore + Clone + 'static,
{
  let day_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
  let stats = state
    .store
    .stats(day_start)
    .await
    .map_err(|e| ApiError::from_store(e, "Failed to fetch statistics"))?;
  Ok(Json(json!({ "success": true, "data": stats })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /submissions/{id}`
pub async fn get_one<S>(
  _admin: AdminSession,
  State(state): State<AppState<S>>,
  id: IdPath,
) -> Result<Json<Value>, ApiError>
where
  S: SubmissionStore + Clone + 'static,
{
  let id = parse_id(id)?;
  let submission = state
    .store
    .get(id)
    .await
    .map_err(|e| ApiError::from_store(e, "Failed to fetch submission"))?
    .ok_or(ApiError::NotFound("Submission not found"))?;
  Ok(Json(json!({ "success": true, "data": submission })))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /submissions/{id}`
pub async fn update<S>(
  admin: AdminSession,
  State(state): State<AppState<S>>,
  id: IdPath,
  body: Result<Json<SubmissionInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: SubmissionStore + Clone + 'static,
{
  let id = parse_id(id)?;
  let Json(input) = body?;
  let changes = input.validate()?;

  let updated = state
    .store
    .update(id, changes)
    .await
    .map_err(|e| ApiError::from_store(e, "Failed to update submission"))?
    .ok_or(ApiError::NotFound("Submission not found"))?;

  tracing::info!(%id, admin = %admin.username, "submission updated");
  Ok(Json(json!({
    "success": true,
    "message": "Submission updated successfully!",
    "data": updated,
  })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /submissions/{id}`
pub async fn delete_one<S>(
  admin: AdminSession,
  State(state): State<AppState<S>>,
  id: IdPath,
) -> Result<Json<Value>, ApiError>
where
  S: SubmissionStore + Clone + 'static,
{
  let id = parse_id(id)?;
  let deleted = state
    .store
    .delete(id)
    .await
    .map_err(|e| ApiError::from_store(e, "Failed to delete submission"))?
    .ok_or(ApiError::NotFound("Submission not found"))?;

  tracing::info!(%id, admin = %admin.username, "submission deleted");
  Ok(Json(json!({
    "success": true,
    "message": "Submission deleted successfully",
    "data": SubmissionRef::from(&deleted),
  })))
}
