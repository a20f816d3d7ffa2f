//! [`SqliteStore`], the SQLite implementation of [`SubmissionStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{ErrorCode, OptionalExtension as _};
use uuid::Uuid;

use topics_core::{
  store::SubmissionStore,
  submission::{Discipline, NewSubmission, Submission, SubmissionStats},
};

use crate::{
  encode::{
    encode_discipline, encode_dt, encode_uuid, RawSubmission, SUBMISSION_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Write outcomes ──────────────────────────────────────────────────────────

// Constraint failures are reported as values from the connection thread so
// they can be told apart from driver errors once back on the async side.

enum CreateOutcome {
  Inserted,
  DuplicateMatric,
  DuplicateName,
}

enum UpdateOutcome {
  Updated(Option<RawSubmission>),
  DuplicateMatric,
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == ErrorCode::ConstraintViolation
        && f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn select_by_id(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawSubmission>> {
  conn
    .query_row(
      &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE submission_id = ?1"),
      rusqlite::params![id_str],
      RawSubmission::from_row,
    )
    .optional()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A submission store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Flush and close the underlying connection.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: NewSubmission) -> Result<Submission> {
    let now = Utc::now();
    let submission = Submission {
      id:            Uuid::new_v4(),
      full_name:     input.full_name,
      matric_number: input.matric_number,
      discipline:    input.discipline,
      project_topic: input.project_topic,
      created_at:    now,
      updated_at:    now,
    };

    let id_str     = encode_uuid(submission.id);
    let name       = submission.full_name.clone();
    let matric     = submission.matric_number.clone();
    let discipline = encode_discipline(submission.discipline);
    let topic      = submission.project_topic.clone();
    let at_str     = encode_dt(now);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let name_taken = tx
          .query_row(
            "SELECT 1 FROM submissions WHERE full_name = ?1 COLLATE NOCASE LIMIT 1",
            rusqlite::params![name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if name_taken {
          return Ok(CreateOutcome::DuplicateName);
        }

        let inserted = tx.execute(
          "INSERT INTO submissions (
             submission_id, full_name, matric_number, discipline,
             project_topic, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, name, matric, discipline, topic, at_str],
        );
        match inserted {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => {
            return Ok(CreateOutcome::DuplicateMatric);
          }
          Err(e) => return Err(e.into()),
        }

        tx.commit()?;
        Ok(CreateOutcome::Inserted)
      })
      .await?;

    match outcome {
      CreateOutcome::Inserted => {
        tracing::debug!(id = %submission.id, "submission created");
        Ok(submission)
      }
      CreateOutcome::DuplicateMatric => {
        Err(Error::DuplicateMatricNumber(submission.matric_number))
      }
      CreateOutcome::DuplicateName => {
        Err(Error::DuplicateFullName(submission.full_name))
      }
    }
  }

  async fn get(&self, id: Uuid) -> Result<Option<Submission>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(select_by_id(conn, &id_str)?))
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn list(&self, discipline: Option<Discipline>) -> Result<Vec<Submission>> {
    let discipline = discipline.map(encode_discipline);

    let raws: Vec<RawSubmission> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBMISSION_COLUMNS} FROM submissions
           WHERE ?1 IS NULL OR discipline = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![discipline], RawSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  async fn update(&self, id: Uuid, input: NewSubmission) -> Result<Option<Submission>> {
    let id_str     = encode_uuid(id);
    let matric     = input.matric_number.clone();
    let discipline = encode_discipline(input.discipline);
    let at_str     = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE submissions
           SET full_name = ?2, matric_number = ?3, discipline = ?4,
               project_topic = ?5, updated_at = ?6
           WHERE submission_id = ?1",
          rusqlite::params![
            id_str,
            input.full_name,
            input.matric_number,
            discipline,
            input.project_topic,
            at_str,
          ],
        );
        match changed {
          Ok(0) => Ok(UpdateOutcome::Updated(None)),
          Ok(_) => Ok(UpdateOutcome::Updated(select_by_id(conn, &id_str)?)),
          Err(e) if is_unique_violation(&e) => Ok(UpdateOutcome::DuplicateMatric),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    match outcome {
      UpdateOutcome::Updated(raw) => {
        raw.map(RawSubmission::into_submission).transpose()
      }
      UpdateOutcome::DuplicateMatric => Err(Error::DuplicateMatricNumber(matric)),
    }
  }

  async fn delete(&self, id: Uuid) -> Result<Option<Submission>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = select_by_id(&tx, &id_str)?;
        if raw.is_some() {
          tx.execute(
            "DELETE FROM submissions WHERE submission_id = ?1",
            rusqlite::params![id_str],
          )?;
        }
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn stats(&self, day_start: DateTime<Utc>) -> Result<SubmissionStats> {
    let since = encode_dt(day_start);

    let (total, linguistics, communication, today): (i64, i64, i64, i64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             COUNT(*),
             COUNT(*) FILTER (WHERE discipline = 'linguistics'),
             COUNT(*) FILTER (WHERE discipline = 'communication'),
             COUNT(*) FILTER (WHERE created_at >= ?1)
           FROM submissions",
          rusqlite::params![since],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?)
      })
      .await?;

    Ok(SubmissionStats {
      total:         total as u64,
      linguistics:   linguistics as u64,
      communication: communication as u64,
      today:         today as u64,
    })
  }
}
