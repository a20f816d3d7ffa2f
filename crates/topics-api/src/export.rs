//! `GET /export?format=<csv|docx>[&discipline=<discipline>]`
//!
//! Streams the current submissions back as a file download.

use axum::{
  extract::{Query, State, rejection::QueryRejection},
  http::header,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use topics_core::store::SubmissionStore;
use topics_export::{ExportFormat, Report, file_name};

use crate::{
  AppState, auth::AdminSession, error::ApiError, submissions::parse_discipline,
};

#[derive(Debug, Deserialize)]
pub struct ExportParams {
  pub format:     Option<String>,
  pub discipline: Option<String>,
}

fn parse_format(raw: Option<&str>) -> Result<ExportFormat, ApiError> {
  match raw.filter(|s| !s.is_empty()) {
    None => Ok(ExportFormat::Csv),
    Some(s) => s.parse().map_err(|_| {
      ApiError::BadRequest("Unsupported export format. Use csv or docx.".into())
    }),
  }
}

pub async fn handler<S>(
  _admin: AdminSession,
  State(state): State<AppState<S>>,
  params: Result<Query<ExportParams>, QueryRejection>,
) -> Result<Response, ApiError>
where
  S: SubmissionStore + Clone + 'static,
{
  let Query(params) = params?;
  let format = parse_format(params.format.as_deref())?;
  let discipline = parse_discipline(params.discipline.as_deref())?;

  let submissions = state
    .store
    .list(discipline)
    .await
    .map_err(|e| ApiError::from_store(e, "Failed to export submissions"))?;

  if submissions.is_empty() {
    return Err(ApiError::NotFound("No submissions found"));
  }

  let now = Utc::now();
  let report = Report::new(&submissions, discipline, now);
  let bytes = topics_export::render(&report, format).map_err(|e| ApiError::Export {
    message: "Failed to export submissions",
    source:  e,
  })?;

  let name = file_name(discipline, now.date_naive(), format);
  tracing::info!(file = %name, rows = submissions.len(), "export rendered");

  Ok(
    (
      [
        (header::CONTENT_TYPE, format.content_type().to_owned()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
      ],
      bytes,
    )
      .into_response(),
  )
}
