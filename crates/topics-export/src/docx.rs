//! DOCX rendering.
//!
//! Produces the smallest valid WordprocessingML package: a content-types
//! part, the package relationships, and `word/document.xml`. The document
//! body is generated with `quick-xml`'s writer API and the parts are stored
//! in a deflated zip archive.

use std::{
  borrow::Cow,
  io::{Cursor, Write as _},
};

use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
  Error, Result,
  report::{COLUMNS, Report, format_date},
};

// ─── Static package parts ────────────────────────────────────────────────────

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

pub const NS_WORDPROCESSING: &str =
  "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Column widths in twentieths of a point, one per entry in [`COLUMNS`].
const COLUMN_WIDTHS: [u32; 6] = [1000, 2000, 1500, 2000, 3000, 1500];

/// Run sizes are in half-points.
const TITLE_SIZE: &str = "32";
const SUBTITLE_SIZE: &str = "20";

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Render the report as a `.docx` package.
pub fn render(report: &Report) -> Result<Vec<u8>> {
  let document = document_xml(report)?;

  let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
  let options =
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

  zip.start_file("[Content_Types].xml", options)?;
  zip.write_all(CONTENT_TYPES.as_bytes())?;
  zip.start_file("_rels/.rels", options)?;
  zip.write_all(PACKAGE_RELS.as_bytes())?;
  zip.start_file("word/document.xml", options)?;
  zip.write_all(&document)?;

  Ok(zip.finish()?.into_inner())
}

// ─── word/document.xml ───────────────────────────────────────────────────────

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn document_xml(report: &Report) -> Result<Vec<u8>> {
  let mut w = Writer::new(Cursor::new(Vec::new()));

  write(
    &mut w,
    Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
  )?;

  let mut doc = BytesStart::new("w:document");
  doc.push_attribute(("xmlns:w", NS_WORDPROCESSING));
  write(&mut w, Event::Start(doc))?;
  write_start(&mut w, "w:body")?;

  paragraph(&mut w, &report.title(), Style::Title)?;
  paragraph(
    &mut w,
    &format!("Generated on: {}", format_date(report.generated_at)),
    Style::Subtitle,
  )?;
  write_empty(&mut w, "w:p")?;

  write_start(&mut w, "w:tbl")?;
  table_properties(&mut w)?;

  write_start(&mut w, "w:tblGrid")?;
  for width in COLUMN_WIDTHS {
    let width = width.to_string();
    write_empty_with_attr(&mut w, "w:gridCol", &[("w:w", width.as_str())])?;
  }
  write_end(&mut w, "w:tblGrid")?;

  table_row(&mut w, COLUMNS.iter().copied(), true)?;
  for row in &report.rows {
    let cells = row.cells();
    table_row(&mut w, cells.iter().map(String::as_str), false)?;
  }
  write_end(&mut w, "w:tbl")?;

  write_end(&mut w, "w:body")?;
  write_end(&mut w, "w:document")?;

  Ok(w.into_inner().into_inner())
}

#[derive(Clone, Copy)]
enum Style {
  Title,
  Subtitle,
}

/// A centered single-run paragraph.
fn paragraph(w: &mut XmlWriter, text: &str, style: Style) -> Result<()> {
  write_start(w, "w:p")?;
  write_start(w, "w:pPr")?;
  write_empty_with_attr(w, "w:jc", &[("w:val", "center")])?;
  write_end(w, "w:pPr")?;

  write_start(w, "w:r")?;
  write_start(w, "w:rPr")?;
  let size = match style {
    Style::Title => {
      write_empty(w, "w:b")?;
      TITLE_SIZE
    }
    Style::Subtitle => SUBTITLE_SIZE,
  };
  write_empty_with_attr(w, "w:sz", &[("w:val", size)])?;
  write_end(w, "w:rPr")?;
  write_text_run(w, text)?;
  write_end(w, "w:r")?;

  write_end(w, "w:p")
}

fn table_properties(w: &mut XmlWriter) -> Result<()> {
  write_start(w, "w:tblPr")?;
  write_empty_with_attr(w, "w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
  write_start(w, "w:tblBorders")?;
  for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
    write_empty_with_attr(
      w,
      edge,
      &[("w:val", "single"), ("w:sz", "4"), ("w:space", "0"), ("w:color", "000000")],
    )?;
  }
  write_end(w, "w:tblBorders")?;
  write_end(w, "w:tblPr")
}

fn table_row<'a>(
  w: &mut XmlWriter,
  cells: impl Iterator<Item = &'a str>,
  bold: bool,
) -> Result<()> {
  write_start(w, "w:tr")?;
  for (text, width) in cells.zip(COLUMN_WIDTHS) {
    write_start(w, "w:tc")?;
    let width = width.to_string();
    write_start(w, "w:tcPr")?;
    write_empty_with_attr(w, "w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;
    write_end(w, "w:tcPr")?;

    write_start(w, "w:p")?;
    write_start(w, "w:r")?;
    if bold {
      write_start(w, "w:rPr")?;
      write_empty(w, "w:b")?;
      write_end(w, "w:rPr")?;
    }
    write_text_run(w, text)?;
    write_end(w, "w:r")?;
    write_end(w, "w:p")?;

    write_end(w, "w:tc")?;
  }
  write_end(w, "w:tr")
}

// ─── XML writer helpers ──────────────────────────────────────────────────────

fn write(w: &mut XmlWriter, event: Event<'_>) -> Result<()> {
  w.write_event(event).map_err(|e| Error::Xml(e.to_string()))
}

fn write_start(w: &mut XmlWriter, tag: &str) -> Result<()> {
  write(w, Event::Start(BytesStart::new(tag)))
}

fn write_end(w: &mut XmlWriter, tag: &str) -> Result<()> {
  write(w, Event::End(BytesEnd::new(tag)))
}

fn write_empty(w: &mut XmlWriter, tag: &str) -> Result<()> {
  write(w, Event::Empty(BytesStart::new(tag)))
}

fn write_empty_with_attr(
  w: &mut XmlWriter,
  tag: &str,
  attrs: &[(&str, &str)],
) -> Result<()> {
  let mut el = BytesStart::new(tag);
  for (k, v) in attrs {
    el.push_attribute((*k, *v));
  }
  write(w, Event::Empty(el))
}

/// `<w:t xml:space="preserve">text</w:t>`
fn write_text_run(w: &mut XmlWriter, text: &str) -> Result<()> {
  let mut t = BytesStart::new("w:t");
  t.push_attribute(("xml:space", "preserve"));
  write(w, Event::Start(t))?;
  write(w, Event::Text(BytesText::new(&xml_chars_only(text))))?;
  write_end(w, "w:t")
}

/// Characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
  matches!(
    c,
    '\t' | '\n' | '\r'
      | '\u{20}'..='\u{D7FF}'
      | '\u{E000}'..='\u{FFFD}'
      | '\u{10000}'..='\u{10FFFF}'
  )
}

/// Drop characters that cannot appear in an XML document at all, escaped
/// or not (C0 controls, U+FFFE, U+FFFF).
fn xml_chars_only(text: &str) -> Cow<'_, str> {
  if text.chars().all(is_xml_char) {
    Cow::Borrowed(text)
  } else {
    Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
  }
}
