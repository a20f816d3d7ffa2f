//! CSV rendering: one header line, then one line per row.

use crate::report::{COLUMNS, Report};

/// Quote a value if it contains a comma, quote, or line break.
fn escape(value: &str) -> String {
  if value.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}

/// Render the report as CSV. Every line, including the last, ends in `\n`.
pub fn render(report: &Report) -> String {
  let mut out = String::new();

  out.push_str(&COLUMNS.map(escape).join(","));
  out.push('\n');

  for row in &report.rows {
    out.push_str(&row.cells().map(|c| escape(&c)).join(","));
    out.push('\n');
  }

  out
}
