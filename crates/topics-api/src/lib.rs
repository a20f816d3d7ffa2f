//! HTTP layer for the topic submission service.
//!
//! Exposes an axum [`Router`] backed by any [`SubmissionStore`]. JSON routes
//! live under `/api`; `/health` sits at the root for liveness probes.
//!
//! ```rust,ignore
//! let app = topics_api::router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod error;
pub mod export;
pub mod submissions;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;
use topics_core::store::SubmissionStore;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TOPICS_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  pub admin_username:      String,
  pub admin_password_hash: String,
  pub token_secret:        String,
  #[serde(default = "default_token_ttl_minutes")]
  pub token_ttl_minutes:   i64,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 3000 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/topics/topics.db") }
fn default_token_ttl_minutes() -> i64 { 480 }

/// Upper bound on `token_ttl_minutes`: 30 days.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 30 * 24 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error(
    "token_ttl_minutes must be between 1 and {MAX_TOKEN_TTL_MINUTES}, got {0}"
  )]
  TokenTtl(i64),
}

impl ServerConfig {
  /// Build the admin-gate settings, rejecting a token lifetime that is not
  /// positive or exceeds [`MAX_TOKEN_TTL_MINUTES`].
  pub fn auth(&self) -> Result<AuthConfig, ConfigError> {
    if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.token_ttl_minutes) {
      return Err(ConfigError::TokenTtl(self.token_ttl_minutes));
    }
    Ok(AuthConfig {
      username:      self.admin_username.clone(),
      password_hash: self.admin_password_hash.clone(),
      token_secret:  self.token_secret.clone(),
      token_ttl:     Duration::minutes(self.token_ttl_minutes),
    })
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SubmissionStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SubmissionStore + Clone + 'static,
{
  let api = Router::new()
    .route("/admin/login", post(auth::login::<S>))
    .route(
      "/submissions",
      get(submissions::list::<S>).post(submissions::create::<S>),
    )
    .route("/submissions/stats", get(submissions::stats::<S>))
    .route(
      "/submissions/{id}",
      get(submissions::get_one::<S>)
        .put(submissions::update::<S>)
        .delete(submissions::delete_one::<S>),
    )
    .route("/export", get(export::handler::<S>));

  Router::new()
    .route("/health", get(health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> &'static str { "ok" }

#[cfg(test)]
mod tests;
