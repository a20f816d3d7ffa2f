//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision and a `Z` suffix, so lexical order equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use topics_core::submission::{Discipline, Submission};
use uuid::Uuid;

use crate::{Error, Result};

/// Column list shared by every query that returns whole submissions.
pub const SUBMISSION_COLUMNS: &str = "submission_id, full_name, matric_number, \
                                      discipline, project_topic, created_at, \
                                      updated_at";

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Discipline ──────────────────────────────────────────────────────────────

pub fn encode_discipline(d: Discipline) -> &'static str { d.as_str() }

pub fn decode_discipline(s: &str) -> Result<Discipline> {
  Ok(Discipline::parse(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `submissions` row.
pub struct RawSubmission {
  pub submission_id: String,
  pub full_name:     String,
  pub matric_number: String,
  pub discipline:    String,
  pub project_topic: String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawSubmission {
  /// Read a row selected with [`SUBMISSION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawSubmission {
      submission_id: row.get(0)?,
      full_name:     row.get(1)?,
      matric_number: row.get(2)?,
      discipline:    row.get(3)?,
      project_topic: row.get(4)?,
      created_at:    row.get(5)?,
      updated_at:    row.get(6)?,
    })
  }

  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      id:            decode_uuid(&self.submission_id)?,
      full_name:     self.full_name,
      matric_number: self.matric_number,
      discipline:    decode_discipline(&self.discipline)?,
      project_topic: self.project_topic,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let a = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let b = a + chrono::Duration::microseconds(1);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea, "2026-01-02T03:04:05.000000Z");
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn discipline_round_trips_through_column_text() {
    for d in Discipline::ALL {
      assert_eq!(decode_discipline(encode_discipline(d)).unwrap(), d);
    }
    assert!(decode_discipline("physics").is_err());
  }
}
