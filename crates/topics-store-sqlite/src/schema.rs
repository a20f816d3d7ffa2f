//! SQL schema for the submission store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS submissions (
    submission_id TEXT PRIMARY KEY,
    full_name     TEXT NOT NULL,
    matric_number TEXT NOT NULL UNIQUE,
    discipline    TEXT NOT NULL
                  CHECK (discipline IN ('linguistics', 'communication')),
    project_topic TEXT NOT NULL,
    created_at    TEXT NOT NULL,   -- fixed-width RFC 3339 UTC; server-assigned
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS submissions_name_matric_idx
    ON submissions(full_name COLLATE NOCASE, matric_number);
CREATE INDEX IF NOT EXISTS submissions_discipline_created_idx
    ON submissions(discipline, created_at DESC);

PRAGMA user_version = 1;
";
