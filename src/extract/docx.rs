//! DOCX readers.
//!
//! The primary strategy opens the package as a zip archive and parses
//! `word/document.xml` directly with quick-xml, keeping the paragraph and
//! run structure along with run-level styling. The fallback walks the
//! docx-rs object tree and recovers plain text only.
//!
//! Legacy `.doc` files are routed through the same chain on a best-effort
//! basis; genuinely old binary files will fail extraction with a clear error.

use crate::detect::DocFormat;
use crate::error::{Error, Result};
use crate::model::{Document, Metadata, Paragraph, Run, RunStyle};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{Extraction, TextExtractor};

/// Load a DOCX file into the structured document model, preserving
/// paragraph boundaries and run styling.
pub fn load_document(path: &Path) -> Result<Document> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::Extraction(format!("not a valid DOCX package: {e}")))?;

    let xml = read_archive_entry(&mut archive, "word/document.xml")?
        .ok_or_else(|| Error::Extraction("DOCX package has no word/document.xml".into()))?;

    let mut doc = parse_document_xml(&xml)?;
    doc.metadata = read_core_properties(&mut archive).unwrap_or_default();
    doc.metadata.source_format = Some(DocFormat::Docx);
    doc.metadata.paragraph_count = Some(doc.paragraph_count());
    Ok(doc)
}

fn read_archive_entry(
    archive: &mut zip::ZipArchive<File>,
    name: &str,
) -> Result<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(Error::Extraction(format!("cannot read {name}: {e}"))),
    };
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| Error::Extraction(format!("cannot read {name}: {e}")))?;
    Ok(Some(xml))
}

/// Parse the main document part into paragraphs and styled runs.
fn parse_document_xml(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut doc = Document::new();
    let mut paragraph: Option<Paragraph> = None;
    let mut run_text = String::new();
    let mut run_style = RunStyle::default();
    let mut in_run = false;
    let mut in_props = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:p" => paragraph = Some(Paragraph::new()),
                b"w:r" => {
                    in_run = true;
                    run_text.clear();
                    run_style = RunStyle::default();
                }
                b"w:rPr" if in_run => in_props = true,
                b"w:t" if in_run => in_text = true,
                name if in_props => apply_run_property(name, e, &mut run_style),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                // Word serializes empty paragraphs self-closed
                b"w:p" => doc.add_paragraph(Paragraph::new()),
                b"w:br" | b"w:cr" if in_run => run_text.push('\n'),
                b"w:tab" if in_run => run_text.push('\t'),
                name if in_props => apply_run_property(name, e, &mut run_style),
                _ => {}
            },
            Ok(Event::Text(ref t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::Extraction(format!("malformed document XML: {e}")))?;
                run_text.push_str(&text);
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:rPr" => in_props = false,
                b"w:r" => {
                    in_run = false;
                    if let Some(p) = paragraph.as_mut() {
                        p.add_run(Run::styled(std::mem::take(&mut run_text), run_style.clone()));
                    }
                }
                b"w:p" => {
                    if let Some(p) = paragraph.take() {
                        doc.add_paragraph(p);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Extraction(format!("malformed document XML: {e}")));
            }
        }
    }

    Ok(doc)
}

/// Apply a single `w:rPr` child element to the run style.
///
/// Toggle properties (`w:b`, `w:i`, `w:u`) honor explicit off values,
/// since an inherited style can be switched off at the run level.
fn apply_run_property(name: &[u8], e: &BytesStart<'_>, style: &mut RunStyle) {
    match name {
        b"w:b" => style.bold = Some(toggle_value(e)),
        b"w:i" => style.italic = Some(toggle_value(e)),
        b"w:u" => {
            let on = attr_value(e, b"w:val").map_or(true, |v| v != "none");
            style.underline = Some(on);
        }
        b"w:rFonts" => {
            if let Some(font) = attr_value(e, b"w:ascii") {
                style.font_name = Some(font);
            }
        }
        b"w:sz" => {
            // stored in half-points
            if let Some(half) = attr_value(e, b"w:val").and_then(|v| v.parse::<f32>().ok()) {
                style.font_size = Some(half / 2.0);
            }
        }
        b"w:color" => {
            if let Some(color) = attr_value(e, b"w:val") {
                if color != "auto" {
                    style.color = Some(color);
                }
            }
        }
        _ => {}
    }
}

fn toggle_value(e: &BytesStart<'_>) -> bool {
    attr_value(e, b"w:val").map_or(true, |v| v != "0" && v != "false")
}

fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Best-effort read of `docProps/core.xml`.
fn read_core_properties(archive: &mut zip::ZipArchive<File>) -> Option<Metadata> {
    let xml = read_archive_entry(archive, "docProps/core.xml").ok()??;
    let mut reader = Reader::from_str(&xml);

    let mut metadata = Metadata::default();
    let mut current: Option<&'static str> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                current = match e.name().as_ref() {
                    b"dc:title" => Some("title"),
                    b"dc:creator" => Some("creator"),
                    b"dcterms:created" => Some("created"),
                    b"dcterms:modified" => Some("modified"),
                    _ => None,
                };
            }
            Ok(Event::Text(ref t)) => {
                if let (Some(field), Ok(value)) = (current, t.unescape()) {
                    let value = value.into_owned();
                    match field {
                        "title" if !value.is_empty() => metadata.title = Some(value),
                        "creator" if !value.is_empty() => metadata.author = Some(value),
                        "created" => metadata.created = parse_dc_date(&value),
                        "modified" => metadata.modified = parse_dc_date(&value),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(_) => return None,
            Ok(_) => {}
        }
    }

    Some(metadata)
}

fn parse_dc_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Structured DOCX extractor backed by [`load_document`].
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DocxExtractor {
    fn name(&self) -> &'static str {
        "docx-structured"
    }

    fn formats(&self) -> &[DocFormat] {
        &[DocFormat::Docx, DocFormat::Doc]
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        let doc = load_document(path)?;
        let paragraphs = doc.paragraph_count();
        Ok(
            Extraction::new(doc.plain_text(), DocFormat::Docx, self.name())
                .with_paragraphs(paragraphs),
        )
    }
}

/// Fallback DOCX extractor that walks the docx-rs object tree.
///
/// Recovers text only; run styling is not kept. Used when the structured
/// reader rejects the package.
pub struct DocxRsExtractor;

impl DocxRsExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxRsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DocxRsExtractor {
    fn name(&self) -> &'static str {
        "docx-rs"
    }

    fn formats(&self) -> &[DocFormat] {
        &[DocFormat::Docx, DocFormat::Doc]
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        let bytes = std::fs::read(path)?;
        let docx = docx_rs::read_docx(&bytes)
            .map_err(|e| Error::Extraction(format!("docx-rs failed to parse package: {e:?}")))?;

        let mut lines = Vec::new();
        for child in &docx.document.children {
            if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
                lines.push(paragraph_text(paragraph));
            }
        }

        let count = lines.len();
        Ok(
            Extraction::new(lines.join("\n"), DocFormat::Docx, self.name())
                .with_paragraphs(count),
        )
    }
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    docx_rs::RunChild::Text(t) => text.push_str(&t.text),
                    docx_rs::RunChild::Tab(_) => text.push('\t'),
                    docx_rs::RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}
