//! The format-independent report model.

use chrono::{DateTime, NaiveDate, Utc};
use strum::EnumString;
use topics_core::submission::{Discipline, Submission};

/// Column headers, in output order.
pub const COLUMNS: [&str; 6] = [
  "S/N",
  "Full Name",
  "Matric Number",
  "Discipline",
  "Project Topic",
  "Date Submitted",
];

/// Supported download formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
  Csv,
  Docx,
}

impl ExportFormat {
  pub fn content_type(self) -> &'static str {
    match self {
      ExportFormat::Csv => "text/csv",
      ExportFormat::Docx => {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
      }
    }
  }

  pub fn extension(self) -> &'static str {
    match self {
      ExportFormat::Csv => "csv",
      ExportFormat::Docx => "docx",
    }
  }
}

/// Attachment name: `linguistics-submissions-2026-10-18.csv`, or
/// `topic-submissions-2026-10-18.csv` when no discipline filter applies.
pub fn file_name(
  discipline: Option<Discipline>,
  date: NaiveDate,
  format: ExportFormat,
) -> String {
  let prefix = discipline.map_or("topic", Discipline::as_str);
  format!(
    "{prefix}-submissions-{}.{}",
    date.format("%Y-%m-%d"),
    format.extension()
  )
}

/// `October 18, 2026 at 03:04 PM` (UTC).
pub fn format_date(dt: DateTime<Utc>) -> String {
  dt.format("%B %-d, %Y at %I:%M %p").to_string()
}

/// One table row, with every cell already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
  pub serial:         usize,
  pub full_name:      String,
  pub matric_number:  String,
  pub discipline:     &'static str,
  pub project_topic:  String,
  pub date_submitted: String,
}

impl ReportRow {
  pub fn cells(&self) -> [String; 6] {
    [
      self.serial.to_string(),
      self.full_name.clone(),
      self.matric_number.clone(),
      self.discipline.to_owned(),
      self.project_topic.clone(),
      self.date_submitted.clone(),
    ]
  }
}

/// A titled, dated list of rows ready to be rendered.
#[derive(Debug, Clone)]
pub struct Report {
  pub discipline:   Option<Discipline>,
  pub generated_at: DateTime<Utc>,
  pub rows:         Vec<ReportRow>,
}

impl Report {
  /// Build a report from submissions in the order given (callers pass them
  /// newest first). Serial numbers start at 1.
  pub fn new(
    submissions: &[Submission],
    discipline: Option<Discipline>,
    generated_at: DateTime<Utc>,
  ) -> Self {
    let rows = submissions
      .iter()
      .enumerate()
      .map(|(i, s)| ReportRow {
        serial:         i + 1,
        full_name:      s.full_name.clone(),
        matric_number:  s.matric_number.clone(),
        discipline:     s.discipline.label(),
        project_topic:  s.project_topic.clone(),
        date_submitted: format_date(s.created_at),
      })
      .collect();

    Self { discipline, generated_at, rows }
  }

  pub fn title(&self) -> String {
    let label = self.discipline.map_or("All Disciplines", Discipline::label);
    format!("Topic Submissions Report - {label}")
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use uuid::Uuid;

  use super::*;

  fn submission(name: &str, discipline: Discipline) -> Submission {
    let at = Utc.with_ymd_and_hms(2026, 3, 7, 14, 5, 0).unwrap();
    Submission {
      id:            Uuid::new_v4(),
      full_name:     name.into(),
      matric_number: "2021/001".into(),
      discipline,
      project_topic: "Politeness strategies in Yoruba".into(),
      created_at:    at,
      updated_at:    at,
    }
  }

  #[test]
  fn date_matches_long_us_style() {
    let dt = Utc.with_ymd_and_hms(2026, 10, 8, 9, 4, 0).unwrap();
    assert_eq!(format_date(dt), "October 8, 2026 at 09:04 AM");
  }

  #[test]
  fn file_name_encodes_discipline_and_date() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    assert_eq!(
      file_name(Some(Discipline::Linguistics), date, ExportFormat::Csv),
      "linguistics-submissions-2026-10-18.csv"
    );
    assert_eq!(
      file_name(None, date, ExportFormat::Docx),
      "topic-submissions-2026-10-18.docx"
    );
  }

  #[test]
  fn format_parses_lowercase_only() {
    assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
    assert_eq!("docx".parse::<ExportFormat>().unwrap(), ExportFormat::Docx);
    assert!("pdf".parse::<ExportFormat>().is_err());
  }

  #[test]
  fn rows_are_numbered_and_labelled() {
    let report = Report::new(
      &[
        submission("Ada Obi", Discipline::Linguistics),
        submission("Bola Ade", Discipline::Communication),
      ],
      None,
      Utc::now(),
    );
    assert_eq!(report.title(), "Topic Submissions Report - All Disciplines");
    assert_eq!(report.rows[0].serial, 1);
    assert_eq!(report.rows[1].serial, 2);
    assert_eq!(report.rows[1].discipline, "Communication");
    assert_eq!(report.rows[0].date_submitted, "March 7, 2026 at 02:05 PM");
  }

  #[test]
  fn title_names_filtered_discipline() {
    let report = Report::new(&[], Some(Discipline::Communication), Utc::now());
    assert_eq!(report.title(), "Topic Submissions Report - Communication");
  }
}
