//! Minimal WordprocessingML (`.docx`) writer.
//!
//! The package holds only the three parts Word needs to open a document:
//! content types, the package relationship, and `word/document.xml` with one
//! paragraph per input line.

use std::io::{Cursor, Write};
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// A4 in twentieths of a point, with one-inch margins.
const PAGE_WIDTH: &str = "11906";
const PAGE_HEIGHT: &str = "16838";
const MARGIN: &str = "1440";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write document XML: {0}")]
    Xml(String),
    #[error("failed to package document: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn xml_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(e.to_string())
}

/// Serialize `text` into a `.docx` package, one paragraph per line.
///
/// Blank lines become empty paragraphs so the draft's spacing survives.
pub fn docx_bytes(text: &str) -> Result<Vec<u8>, ExportError> {
    let document = document_xml(text)?;

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(PACKAGE_RELS.as_bytes())?;
    zip.start_file("word/document.xml", options)?;
    zip.write_all(&document)?;

    let bytes = zip.finish()?.into_inner();
    tracing::debug!(
        paragraphs = text.split('\n').count(),
        bytes = bytes.len(),
        "docx packaged"
    );
    Ok(bytes)
}

/// Write `text` as a `.docx` file at `path`.
pub fn write_docx(text: &str, path: &Path) -> Result<(), ExportError> {
    let bytes = docx_bytes(text)?;
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), "document exported");
    Ok(())
}

fn document_xml(text: &str) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_error)?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", WORDML_NS));
    writer.write_event(Event::Start(root)).map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("w:body")))
        .map_err(xml_error)?;

    for line in text.split('\n') {
        let line = xml_safe(line.trim_end_matches('\r'));
        if line.is_empty() {
            writer
                .write_event(Event::Empty(BytesStart::new("w:p")))
                .map_err(xml_error)?;
            continue;
        }

        writer
            .write_event(Event::Start(BytesStart::new("w:p")))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Start(BytesStart::new("w:r")))
            .map_err(xml_error)?;
        let mut run_text = BytesStart::new("w:t");
        run_text.push_attribute(("xml:space", "preserve"));
        writer
            .write_event(Event::Start(run_text))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Text(BytesText::new(&line)))
            .map_err(xml_error)?;
        for tag in ["w:t", "w:r", "w:p"] {
            writer
                .write_event(Event::End(BytesEnd::new(tag)))
                .map_err(xml_error)?;
        }
    }

    writer
        .write_event(Event::Start(BytesStart::new("w:sectPr")))
        .map_err(xml_error)?;
    let mut size = BytesStart::new("w:pgSz");
    size.push_attribute(("w:w", PAGE_WIDTH));
    size.push_attribute(("w:h", PAGE_HEIGHT));
    writer.write_event(Event::Empty(size)).map_err(xml_error)?;
    let mut margins = BytesStart::new("w:pgMar");
    for side in ["w:top", "w:right", "w:bottom", "w:left"] {
        margins.push_attribute((side, MARGIN));
    }
    writer.write_event(Event::Empty(margins)).map_err(xml_error)?;

    for tag in ["w:sectPr", "w:body", "w:document"] {
        writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(xml_error)?;
    }

    Ok(writer.into_inner().into_inner())
}

/// Drop characters XML 1.0 cannot carry (form feeds from PDF text, stray
/// NULs); tabs survive.
fn xml_safe(line: &str) -> String {
    line.chars()
        .filter(|&c| c == '\t' || !c.is_control())
        .collect()
}
