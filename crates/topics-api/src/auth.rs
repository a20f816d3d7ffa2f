//! Admin login and the bearer-token extractor guarding admin routes.
//!
//! `POST /api/admin/login` checks the configured username and argon2 hash,
//! then issues an HS256 JWT. Admin handlers take an [`AdminSession`]
//! argument, which rejects the request with 401 unless it carries a valid,
//! unexpired token signed with the configured secret.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  Json,
  extract::{FromRequestParts, State, rejection::JsonRejection},
  http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use topics_core::store::SubmissionStore;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

const INVALID_CREDENTIALS: &str =
  "Invalid credentials. Please check your username and password.";
const MISSING_TOKEN: &str = "Authentication required";
const INVALID_TOKEN: &str = "Invalid or expired session. Please log in again.";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Credentials and signing material for the admin gate.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  /// HMAC secret for signing and verifying tokens.
  pub token_secret:  String,
  pub token_ttl:     Duration,
}

/// JWT claims carried by an admin token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// Admin username.
  pub sub: String,
  pub iat: i64,
  pub exp: i64,
  pub jti: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
  #[error("token expiry is out of range")]
  ExpiryOutOfRange,

  #[error("failed to sign token: {0}")]
  Sign(#[from] jsonwebtoken::errors::Error),
}

/// A freshly signed token and the moment it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

impl AuthConfig {
  /// `true` when `username` matches and `password` verifies against the
  /// stored hash. An unparsable hash never verifies.
  pub fn verify_credentials(&self, username: &str, password: &str) -> bool {
    if username != self.username {
      return false;
    }
    let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
      tracing::error!("configured admin password hash is not a valid PHC string");
      return false;
    };
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  }

  pub fn issue_token(&self, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
    let expires_at = now
      .checked_add_signed(self.token_ttl)
      .ok_or(TokenError::ExpiryOutOfRange)?;
    let claims = Claims {
      sub: self.username.clone(),
      iat: now.timestamp(),
      exp: expires_at.timestamp(),
      jti: Uuid::new_v4().to_string(),
    };
    let token = encode(
      &Header::default(),
      &claims,
      &EncodingKey::from_secret(self.token_secret.as_bytes()),
    )?;
    Ok(IssuedToken { token, expires_at })
  }

  /// Check signature and expiry, and that the token names the current admin.
  pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation.sub = Some(self.username.clone());

    let data = decode::<Claims>(
      token,
      &DecodingKey::from_secret(self.token_secret.as_bytes()),
      &validation,
    )?;
    Ok(data.claims)
  }
}

// ─── Extractor ────────────────────────────────────────────────────────────────

/// Present in a handler's arguments means the caller is the admin.
#[derive(Debug, Clone)]
pub struct AdminSession {
  pub username: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<AppState<S>> for AdminSession
where
  S: SubmissionStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token =
      bearer_token(&parts.headers).ok_or(ApiError::Unauthorized(MISSING_TOKEN))?;

    let claims = state.auth.verify_token(token).map_err(|e| {
      tracing::debug!(error = %e, "rejected admin token");
      ApiError::Unauthorized(INVALID_TOKEN)
    })?;

    Ok(AdminSession { username: claims.sub })
  }
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
  token:      String,
  expires_at: DateTime<Utc>,
}

/// `POST /admin/login`, body `{"username": "…", "password": "…"}`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: SubmissionStore + Clone + 'static,
{
  let Json(body) = body?;

  if !state.auth.verify_credentials(&body.username, &body.password) {
    return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
  }

  let issued = state.auth.issue_token(Utc::now()).map_err(|e| ApiError::Internal {
    message: "Failed to sign in",
    source:  Box::new(e),
  })?;

  tracing::info!(username = %body.username, "admin signed in");
  Ok(Json(json!({
    "success": true,
    "message": "Login successful",
    "data": LoginData { token: issued.token, expires_at: issued.expires_at },
  })))
}

#[cfg(test)]
mod tests {
  use argon2::{Algorithm, Params, PasswordHasher, Version, password_hash::SaltString};
  use rand_core::OsRng;

  use super::*;

  fn config(password: &str) -> AuthConfig {
    // Small cost parameters keep the tests quick; verification reads them
    // back from the PHC string.
    let params = Params::new(1024, 1, 1, None).unwrap();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AuthConfig {
      username:      "registrar".to_string(),
      password_hash: hash,
      token_secret:  "test-secret".to_string(),
      token_ttl:     Duration::minutes(30),
    }
  }

  #[test]
  fn correct_credentials() {
    let cfg = config("s3cret");
    assert!(cfg.verify_credentials("registrar", "s3cret"));
  }

  #[test]
  fn wrong_password_or_user() {
    let cfg = config("s3cret");
    assert!(!cfg.verify_credentials("registrar", "wrong"));
    assert!(!cfg.verify_credentials("someone", "s3cret"));
  }

  #[test]
  fn garbage_hash_never_verifies() {
    let mut cfg = config("s3cret");
    cfg.password_hash = "not-a-phc-string".to_string();
    assert!(!cfg.verify_credentials("registrar", "s3cret"));
  }

  #[test]
  fn issued_token_verifies() {
    let cfg = config("s3cret");
    let now = Utc::now();
    let issued = cfg.issue_token(now).unwrap();
    assert_eq!(issued.expires_at, now + Duration::minutes(30));

    let claims = cfg.verify_token(&issued.token).unwrap();
    assert_eq!(claims.sub, "registrar");
    assert_eq!(claims.exp - claims.iat, 30 * 60);
  }

  #[test]
  fn expired_token_is_rejected() {
    let cfg = config("s3cret");
    let issued = cfg.issue_token(Utc::now() - Duration::hours(2)).unwrap();
    assert!(cfg.verify_token(&issued.token).is_err());
  }

  #[test]
  fn expiry_overflow_is_an_error() {
    let cfg = config("s3cret");
    let err = cfg.issue_token(DateTime::<Utc>::MAX_UTC).unwrap_err();
    assert!(matches!(err, TokenError::ExpiryOutOfRange));
  }

  #[test]
  fn token_from_another_secret_is_rejected() {
    let cfg = config("s3cret");
    let mut other = cfg.clone();
    other.token_secret = "different".to_string();
    let issued = other.issue_token(Utc::now()).unwrap();
    assert!(cfg.verify_token(&issued.token).is_err());
  }

  #[test]
  fn bearer_prefix_is_required() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
    assert!(bearer_token(&headers).is_none());

    headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
    assert_eq!(bearer_token(&headers), Some("abc.def"));
  }
}
