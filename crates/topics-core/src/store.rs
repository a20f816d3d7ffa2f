//! The `SubmissionStore` trait and its typed error classification.
//!
//! The trait is implemented by storage backends (e.g. `topics-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::{convert::Infallible, future::Future};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::submission::{Discipline, NewSubmission, Submission, SubmissionStats};

// ─── Error classification ────────────────────────────────────────────────────

/// What went wrong in a store call, as far as callers need to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The matric number is already held by another submission.
  DuplicateMatricNumber,
  /// A submission with the same full name (ignoring case) already exists.
  DuplicateFullName,
  /// Anything else: I/O, corrupt rows, driver failures.
  Backend,
}

/// Implemented by every backend error type so callers can branch on the
/// failure without inspecting driver-specific details.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}

impl StoreError for Infallible {
  fn kind(&self) -> ErrorKind { match *self {} }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a submission store backend.
///
/// Lookups by id return `Ok(None)` when the record does not exist, so update
/// and delete are safe to repeat.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SubmissionStore: Send + Sync {
  type Error: StoreError;

  /// Persist a new submission. `id`, `created_at` and `updated_at` are set by
  /// the store.
  ///
  /// Fails with [`ErrorKind::DuplicateFullName`] if any existing submission
  /// has the same full name ignoring ASCII case, and with
  /// [`ErrorKind::DuplicateMatricNumber`] if the matric number is taken. The
  /// name check and the insert are atomic.
  fn create(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Retrieve a submission by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// List submissions newest first, optionally restricted to one discipline.
  fn list(
    &self,
    discipline: Option<Discipline>,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Overwrite all four fields of an existing submission and refresh
  /// `updated_at`. Returns `None` if not found.
  ///
  /// Only the matric-number uniqueness rule applies; full-name uniqueness is
  /// a creation-time rule.
  fn update(
    &self,
    id: Uuid,
    input: NewSubmission,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Permanently remove a submission, returning it. Returns `None` if not
  /// found.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Dashboard counts. `today` counts submissions created at or after
  /// `day_start`.
  fn stats(
    &self,
    day_start: DateTime<Utc>,
  ) -> impl Future<Output = Result<SubmissionStats, Self::Error>> + Send + '_;
}
