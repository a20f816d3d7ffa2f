//! Rendering of submission lists into downloadable reports.
//!
//! A [`Report`] fixes the rows, title and generation time once; the
//! [`csv`] and [`docx`] modules turn it into bytes. Both formats carry the
//! same six columns in the same order.

pub mod csv;
pub mod docx;
pub mod error;
mod report;

pub use error::{Error, Result};
pub use report::{COLUMNS, ExportFormat, Report, ReportRow, file_name, format_date};

/// Render `report` in the requested format.
pub fn render(report: &Report, format: ExportFormat) -> Result<Vec<u8>> {
  match format {
    ExportFormat::Csv => Ok(csv::render(report).into_bytes()),
    ExportFormat::Docx => docx::render(report),
  }
}
