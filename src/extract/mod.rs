//! Text extraction: per-format readers behind a ranked strategy registry.
//!
//! Each supported format has an ordered list of extraction strategies;
//! the first one that succeeds serves the request, and the result is
//! tagged with the strategy name purely for diagnostics.

pub mod docx;
pub mod pdf;
pub mod rtf;
pub mod text;

pub use docx::{load_document, DocxExtractor, DocxRsExtractor};
pub use pdf::PdfExtractor;
pub use rtf::RtfExtractor;
pub use text::TextFileExtractor;

use crate::detect::{detect_format, DocFormat};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Extracted text plus per-format metadata.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The extracted plain text
    pub text: String,

    /// Source format
    pub format: DocFormat,

    /// Name of the strategy that served the extraction (diagnostics only)
    pub strategy: &'static str,

    /// Page count, for paged formats
    pub pages: Option<u32>,

    /// Paragraph count, for structured formats
    pub paragraphs: Option<usize>,

    /// Detected text encoding, for plain-text input
    pub encoding: Option<&'static str>,
}

impl Extraction {
    /// Create a new extraction result.
    pub fn new(text: String, format: DocFormat, strategy: &'static str) -> Self {
        Self {
            text,
            format,
            strategy,
            pages: None,
            paragraphs: None,
            encoding: None,
        }
    }

    /// Set the page count.
    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = Some(pages);
        self
    }

    /// Set the paragraph count.
    pub fn with_paragraphs(mut self, paragraphs: usize) -> Self {
        self.paragraphs = Some(paragraphs);
        self
    }

    /// Set the detected encoding.
    pub fn with_encoding(mut self, encoding: &'static str) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Character count of the extracted text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Trait for per-format text extractors.
pub trait TextExtractor: Send + Sync {
    /// Name of this extractor, used to tag results.
    fn name(&self) -> &'static str;

    /// Formats this extractor can read.
    fn formats(&self) -> &[DocFormat];

    /// Extract plain text and metadata from a file.
    fn extract(&self, path: &Path) -> Result<Extraction>;
}

/// Registry of ranked extraction strategies per format.
///
/// Strategies are tried in registration order; the first success wins.
pub struct ExtractorRegistry {
    chains: HashMap<DocFormat, Vec<Arc<dyn TextExtractor>>>,
}

impl ExtractorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            chains: HashMap::new(),
        }
    }

    /// Create a registry with the default strategy chains.
    ///
    /// DOCX (and best-effort DOC) try the structured XML reader first and
    /// fall back to the docx-rs text walk; PDF, TXT, and RTF each have one
    /// reader.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxExtractor::new()));
        registry.register(Arc::new(DocxRsExtractor::new()));
        registry.register(Arc::new(PdfExtractor::new()));
        registry.register(Arc::new(TextFileExtractor::new()));
        registry.register(Arc::new(RtfExtractor::new()));
        registry
    }

    /// Register an extractor at the end of the chain for each of its formats.
    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        for format in extractor.formats() {
            self.chains
                .entry(*format)
                .or_default()
                .push(extractor.clone());
        }
    }

    /// Whether any strategy is registered for a format.
    pub fn supports(&self, format: DocFormat) -> bool {
        self.chains.contains_key(&format)
    }

    /// Extract text from a file, detecting its format first.
    pub fn extract(&self, path: &Path) -> Result<Extraction> {
        let format = detect_format(path)?;
        self.extract_as(path, format)
    }

    /// Extract text from a file using the chain for a known format.
    pub fn extract_as(&self, path: &Path, format: DocFormat) -> Result<Extraction> {
        let chain = self
            .chains
            .get(&format)
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))?;

        let mut last_err = None;
        for extractor in chain {
            match extractor.extract(path) {
                Ok(extraction) => {
                    log::debug!(
                        "extracted {} chars from {} via {}",
                        extraction.char_count(),
                        path.display(),
                        extractor.name()
                    );
                    return Ok(extraction);
                }
                Err(e) => {
                    log::warn!(
                        "extractor {} failed on {}: {}",
                        extractor.name(),
                        path.display(),
                        e
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            Error::Extraction(format!("no extractor registered for {format}"))
        }))
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
