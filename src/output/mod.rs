//! Document writers.
//!
//! Saves the structured document model to disk. DOCX is written with
//! docx-rs; TXT flattens to plain text. PDF output is realized as a
//! DOCX file next to the requested path, since a faithful styled PDF
//! writer is out of scope; the actual path written is always returned.

use crate::error::{Error, Result};
use crate::model::{Document, Run as ModelRun, RunStyle};
use docx_rs::{Docx, Paragraph, Run, RunFonts};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Txt,
    Docx,
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Docx => "docx",
            // realized as DOCX
            OutputFormat::Pdf => "docx",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "txt" | "text" => Some(OutputFormat::Txt),
            "docx" => Some(OutputFormat::Docx),
            "pdf" => Some(OutputFormat::Pdf),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Txt => write!(f, "txt"),
            OutputFormat::Docx => write!(f, "docx"),
            OutputFormat::Pdf => write!(f, "pdf"),
        }
    }
}

/// Save a document to `path`, adjusting the extension to match the
/// format. Returns the path actually written.
pub fn save(doc: &Document, path: &Path, format: OutputFormat) -> Result<PathBuf> {
    let target = path.with_extension(format.extension());

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Save(format!("cannot create {}: {e}", parent.display())))?;
        }
    }

    match format {
        OutputFormat::Txt => save_txt(doc, &target)?,
        OutputFormat::Docx | OutputFormat::Pdf => save_docx(doc, &target)?,
    }

    log::info!("saved {} paragraphs to {}", doc.paragraph_count(), target.display());
    Ok(target)
}

fn save_txt(doc: &Document, path: &Path) -> Result<()> {
    std::fs::write(path, doc.plain_text())
        .map_err(|e| Error::Save(format!("cannot write {}: {e}", path.display())))
}

fn save_docx(doc: &Document, path: &Path) -> Result<()> {
    let mut docx = Docx::new();

    for paragraph in &doc.paragraphs {
        let mut p = Paragraph::new();
        for run in &paragraph.runs {
            p = p.add_run(build_run(run));
        }
        docx = docx.add_paragraph(p);
    }

    let file = File::create(path)
        .map_err(|e| Error::Save(format!("cannot create {}: {e}", path.display())))?;
    docx.build()
        .pack(file)
        .map_err(|e| Error::Save(format!("cannot write {}: {e}", path.display())))?;
    Ok(())
}

fn build_run(run: &ModelRun) -> Run {
    let mut out = Run::new().add_text(run.text.as_str());
    out = apply_style(out, &run.style);
    out
}

fn apply_style(mut run: Run, style: &RunStyle) -> Run {
    if style.bold == Some(true) {
        run = run.bold();
    }
    if style.italic == Some(true) {
        run = run.italic();
    }
    if style.underline == Some(true) {
        run = run.underline("single");
    }
    if let Some(size) = style.font_size {
        // docx stores half-points
        run = run.size((size * 2.0).round() as usize);
    }
    if let Some(color) = &style.color {
        run = run.color(color.as_str());
    }
    if let Some(font) = &style.font_name {
        run = run.fonts(RunFonts::new().ascii(font.as_str()));
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Paragraph as ModelParagraph;

    fn sample_doc() -> Document {
        let mut doc = Document::new();
        doc.add_paragraph(ModelParagraph::with_text("First paragraph."));
        doc.add_paragraph(ModelParagraph::with_text("Second paragraph."));
        doc
    }

    #[test]
    fn test_save_txt() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(&sample_doc(), &dir.path().join("out.txt"), OutputFormat::Txt).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_save_docx_is_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(&sample_doc(), &dir.path().join("out.docx"), OutputFormat::Docx).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], &[0x50, 0x4B, 0x03, 0x04]);
    }

    #[test]
    fn test_pdf_request_writes_docx_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(&sample_doc(), &dir.path().join("out.pdf"), OutputFormat::Pdf).unwrap();
        assert_eq!(path.extension().unwrap(), "docx");
        assert!(path.exists());
    }

    #[test]
    fn test_extension_is_corrected() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(&sample_doc(), &dir.path().join("out.docx"), OutputFormat::Txt).unwrap();
        assert_eq!(path.extension().unwrap(), "txt");
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(OutputFormat::from_name("DOCX"), Some(OutputFormat::Docx));
        assert_eq!(OutputFormat::from_name("text"), Some(OutputFormat::Txt));
        assert_eq!(OutputFormat::from_name("odt"), None);
    }

    #[test]
    fn test_styled_roundtrip_through_structured_reader() {
        use crate::model::{Run, RunStyle};

        let mut doc = Document::new();
        let mut p = ModelParagraph::new();
        let style = RunStyle {
            bold: Some(true),
            ..Default::default()
        };
        p.add_run(Run::styled("Bold text", style));
        doc.add_paragraph(p);

        let dir = tempfile::tempdir().unwrap();
        let path = save(&doc, &dir.path().join("styled.docx"), OutputFormat::Docx).unwrap();

        let reread = crate::extract::load_document(&path).unwrap();
        assert_eq!(reread.paragraph_count(), 1);
        assert_eq!(reread.paragraphs[0].plain_text(), "Bold text");
        assert_eq!(reread.paragraphs[0].runs[0].style.bold, Some(true));
    }
}
