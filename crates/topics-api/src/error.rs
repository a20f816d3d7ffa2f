//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves the server as `{"success": false, "message": "…"}`.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use topics_core::store::{ErrorKind, StoreError};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Unauthorized(&'static str),

  #[error("{0}")]
  NotFound(&'static str),

  #[error("{0}")]
  Conflict(&'static str),

  /// A store call failed. `message` is what the client sees.
  #[error("{message}: {source}")]
  Store {
    message: &'static str,
    #[source]
    source:  BoxError,
  },

  #[error("{message}: {source}")]
  Export {
    message: &'static str,
    #[source]
    source:  topics_export::Error,
  },

  #[error("{message}: {source}")]
  Internal {
    message: &'static str,
    #[source]
    source:  BoxError,
  },
}

impl ApiError {
  /// Classify a backend failure. Duplicate kinds become 409s; everything
  /// else is a 500 whose client-facing text is `message`.
  pub fn from_store<E: StoreError>(err: E, message: &'static str) -> Self {
    match err.kind() {
      ErrorKind::DuplicateMatricNumber => {
        ApiError::Conflict("A submission with this matric number already exists")
      }
      ErrorKind::DuplicateFullName => {
        ApiError::Conflict("A submission with this full name already exists")
      }
      ErrorKind::Backend => ApiError::Store { message, source: Box::new(err) },
    }
  }

  fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Store { .. } | ApiError::Export { .. } | ApiError::Internal { .. } => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  /// Text sent to the client. Server-side causes stay in the log.
  fn public_message(&self) -> String {
    match self {
      ApiError::BadRequest(m) => m.clone(),
      ApiError::Unauthorized(m) | ApiError::NotFound(m) | ApiError::Conflict(m) => {
        (*m).to_owned()
      }
      ApiError::Store { message, .. }
      | ApiError::Export { message, .. }
      | ApiError::Internal { message, .. } => (*message).to_owned(),
    }
  }
}

impl From<topics_core::Error> for ApiError {
  fn from(err: topics_core::Error) -> Self {
    ApiError::BadRequest(err.to_string())
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    } else {
      tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
    }

    let body = Json(json!({ "success": false, "message": self.public_message() }));
    let mut response = (status, body).into_response();
    if status == StatusCode::UNAUTHORIZED {
      response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    response
  }
}
