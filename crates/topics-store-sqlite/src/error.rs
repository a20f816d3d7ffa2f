//! Error type for `topics-store-sqlite`.

use thiserror::Error;
use topics_core::store::{ErrorKind, StoreError};

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] topics_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A UNIQUE violation on `matric_number`.
  #[error("matric number {0} is already in use")]
  DuplicateMatricNumber(String),

  /// The creation-time full-name check found a case-insensitive match.
  #[error("a submission named {0:?} already exists")]
  DuplicateFullName(String),
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::DuplicateMatricNumber(_) => ErrorKind::DuplicateMatricNumber,
      Error::DuplicateFullName(_) => ErrorKind::DuplicateFullName,
      _ => ErrorKind::Backend,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
