//! # docmend
//!
//! Document improvement pipeline for Rust.
//!
//! This library extracts text from common document formats (DOCX, PDF,
//! TXT, RTF), runs it through a text improvement provider, and rewrites
//! the result back into a document while preserving the original DOCX
//! paragraph and run formatting wherever possible.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docmend::{Config, Pipeline};
//!
//! fn main() -> docmend::Result<()> {
//!     let config = Config::default();
//!     let pipeline = Pipeline::new(config)?;
//!
//!     let record = pipeline.process_file("report.docx".as_ref())?;
//!     println!("improved: {}", record.output_file.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Multiple input formats**: DOCX, PDF, TXT, RTF, with content-based detection
//! - **Formatting preservation**: improved text is redistributed across the
//!   original DOCX run structure, keeping bold, italic, fonts, and colors
//! - **Pluggable improvers**: OpenAI-compatible endpoints or an offline
//!   rule-based provider
//! - **Print dispatch**: hands finished documents to the platform spooler
//! - **Processing records**: one JSON record per run for auditing

pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod improve;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod print;
pub mod rewrite;

// Re-export commonly used types
pub use config::{Config, Provider};
pub use detect::{detect_format, detect_format_from_bytes, validate_input, DocFormat};
pub use error::{Error, Result};
pub use extract::{Extraction, ExtractorRegistry, TextExtractor};
pub use improve::{Improvement, OpenAiImprover, RuleImprover, TextImprover};
pub use model::{Document, Metadata, Paragraph, Run, RunStyle};
pub use output::{save, OutputFormat};
pub use pipeline::{Pipeline, ProcessingRecord};
pub use print::{list_printers, PrintDispatcher, PrintOutcome, PrinterInfo};
pub use rewrite::{rewrite_plain, rewrite_preserving, RewritePath, RewritePlan};

use std::path::Path;

/// Extract plain text from a document file.
///
/// # Example
///
/// ```no_run
/// use docmend::extract_text;
///
/// let text = extract_text("document.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let registry = ExtractorRegistry::with_defaults();
    Ok(registry.extract(path.as_ref())?.text)
}

/// Load a DOCX file into the structured document model.
///
/// # Example
///
/// ```no_run
/// use docmend::load_docx;
///
/// let doc = load_docx("report.docx").unwrap();
/// println!("paragraphs: {}", doc.paragraph_count());
/// ```
pub fn load_docx<P: AsRef<Path>>(path: P) -> Result<Document> {
    extract::load_document(path.as_ref())
}

/// Run the full improvement pipeline on one file with default settings.
///
/// The offline rule-based improver is used; configure a [`Pipeline`]
/// directly for an API-backed provider.
///
/// # Example
///
/// ```no_run
/// use docmend::improve_file;
///
/// let record = improve_file("notes.txt").unwrap();
/// println!("{}", record.change_summary);
/// ```
pub fn improve_file<P: AsRef<Path>>(path: P) -> Result<ProcessingRecord> {
    let pipeline = Pipeline::new(Config::default())?;
    pipeline.process_file(path.as_ref())
}
