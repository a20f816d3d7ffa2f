//! A submission (one student's project-topic record) and the rules that admit
//! one into the store.
//!
//! Raw request fields arrive as a [`SubmissionInput`]. [`SubmissionInput::validate`]
//! normalizes them (trimming, matric upper-casing) and checks every field rule,
//! producing a [`NewSubmission`] that backends can persist as-is.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Error, FieldError, Result};

// ─── Discipline ──────────────────────────────────────────────────────────────

/// Field of study a topic is submitted under.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Discipline {
  Linguistics,
  Communication,
}

impl Discipline {
  pub const ALL: [Discipline; 2] =
    [Discipline::Linguistics, Discipline::Communication];

  /// Parse the lowercase wire form (`"linguistics"`, `"communication"`).
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownDiscipline)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Discipline::Linguistics => "linguistics",
      Discipline::Communication => "communication",
    }
  }

  /// Capitalized form used in reports.
  pub fn label(self) -> &'static str {
    match self {
      Discipline::Linguistics => "Linguistics",
      Discipline::Communication => "Communication",
    }
  }
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// A persisted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub id:            Uuid,
  pub full_name:     String,
  pub matric_number: String,
  pub discipline:    Discipline,
  pub project_topic: String,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStats {
  pub total:         u64,
  pub linguistics:   u64,
  pub communication: u64,
  /// Submissions created since the start of the current UTC day.
  pub today:         u64,
}

// ─── Input ───────────────────────────────────────────────────────────────────

pub const FULL_NAME_MIN: usize = 2;
pub const FULL_NAME_MAX: usize = 100;
pub const MATRIC_MIN: usize = 3;
pub const MATRIC_MAX: usize = 20;
pub const TOPIC_MIN: usize = 10;
pub const TOPIC_MAX: usize = 500;

/// Un-normalized fields as they arrive in a create or update request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
  pub full_name:     Option<String>,
  pub matric_number: Option<String>,
  pub discipline:    Option<String>,
  pub project_topic: Option<String>,
}

/// Normalized, validated fields ready to be written by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
  pub full_name:     String,
  pub matric_number: String,
  pub discipline:    Discipline,
  pub project_topic: String,
}

impl SubmissionInput {
  /// Normalize and check every field.
  ///
  /// Absent or blank fields are reported together as
  /// [`Error::MissingFields`] before any other rule runs. Otherwise all
  /// failing rules are collected into [`Error::Invalid`].
  pub fn validate(self) -> Result<NewSubmission> {
    let missing: Vec<&'static str> = [
      ("fullName", &self.full_name),
      ("matricNumber", &self.matric_number),
      ("discipline", &self.discipline),
      ("projectTopic", &self.project_topic),
    ]
    .into_iter()
    .filter(|(_, v)| v.as_deref().is_none_or(|s| s.trim().is_empty()))
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
      return Err(Error::MissingFields(missing));
    }

    let full_name = normalize_text(self.full_name);
    let matric_number = normalize_text(self.matric_number).to_uppercase();
    let discipline = normalize_text(self.discipline);
    let project_topic = normalize_text(self.project_topic);

    let mut errors = Vec::new();
    check_full_name(&full_name, &mut errors);
    check_matric_number(&matric_number, &mut errors);
    let discipline = match Discipline::parse(&discipline) {
      Ok(d) => Some(d),
      Err(_) => {
        errors.push(FieldError {
          field:   "discipline",
          message: "Discipline must be either linguistics or communication",
        });
        None
      }
    };
    check_project_topic(&project_topic, &mut errors);

    match discipline {
      Some(discipline) if errors.is_empty() => Ok(NewSubmission {
        full_name,
        matric_number,
        discipline,
        project_topic,
      }),
      _ => Err(Error::Invalid(errors)),
    }
  }
}

fn normalize_text(value: Option<String>) -> String {
  value.as_deref().unwrap_or_default().trim().to_owned()
}

// ─── Field rules ─────────────────────────────────────────────────────────────

fn check_full_name(value: &str, errors: &mut Vec<FieldError>) {
  let len = value.chars().count();
  if len < FULL_NAME_MIN {
    errors.push(FieldError {
      field:   "fullName",
      message: "Full name must be at least 2 characters",
    });
  } else if len > FULL_NAME_MAX {
    errors.push(FieldError {
      field:   "fullName",
      message: "Full name cannot exceed 100 characters",
    });
  }
  if !value.chars().all(|c| c.is_ascii_alphabetic() || c.is_whitespace()) {
    errors.push(FieldError {
      field:   "fullName",
      message: "Full name should only contain letters and spaces",
    });
  }
}

fn check_matric_number(value: &str, errors: &mut Vec<FieldError>) {
  let len = value.chars().count();
  if len < MATRIC_MIN {
    errors.push(FieldError {
      field:   "matricNumber",
      message: "Matric number must be at least 3 characters",
    });
  } else if len > MATRIC_MAX {
    errors.push(FieldError {
      field:   "matricNumber",
      message: "Matric number cannot exceed 20 characters",
    });
  }
  if !value
    .chars()
    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '/')
  {
    errors.push(FieldError {
      field:   "matricNumber",
      message: "Matric number should only contain uppercase letters, numbers, \
                and forward slashes",
    });
  }
}

fn check_project_topic(value: &str, errors: &mut Vec<FieldError>) {
  let len = value.chars().count();
  if len < TOPIC_MIN {
    errors.push(FieldError {
      field:   "projectTopic",
      message: "Project topic must be at least 10 characters",
    });
  } else if len > TOPIC_MAX {
    errors.push(FieldError {
      field:   "projectTopic",
      message: "Project topic cannot exceed 500 characters",
    });
  }
}
