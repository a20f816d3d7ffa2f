//! Error types for `topics-core`.

use serde::Serialize;
use thiserror::Error;

/// A single failed field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum Error {
  /// One or more required fields were absent or blank.
  #[error("All fields are required (missing: {})", .0.join(", "))]
  MissingFields(Vec<&'static str>),

  /// Every field was present but at least one rule failed.
  #[error("{}", join_messages(.0))]
  Invalid(Vec<FieldError>),

  #[error("Discipline must be either linguistics or communication")]
  UnknownDiscipline,
}

fn join_messages(errors: &[FieldError]) -> String {
  errors
    .iter()
    .map(|e| e.message)
    .collect::<Vec<_>>()
    .join(". ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
