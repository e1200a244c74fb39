//! PDF text extraction via lopdf.

use crate::detect::DocFormat;
use crate::error::{Error, Result};
use lopdf::Document as LopdfDocument;
use std::path::Path;

use super::{Extraction, TextExtractor};

/// PDF extractor that concatenates per-page text in page order.
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn formats(&self) -> &[DocFormat] {
        &[DocFormat::Pdf]
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        let doc = LopdfDocument::load(path)?;

        if doc.is_encrypted() {
            return Err(Error::Extraction(
                "PDF is encrypted and cannot be read".into(),
            ));
        }

        let pages = doc.get_pages();
        let page_count = pages.len() as u32;

        let mut page_texts = Vec::with_capacity(pages.len());
        for &page_num in pages.keys() {
            // Lenient per page: a damaged content stream should not lose
            // the rest of the document.
            match doc.extract_text(&[page_num]) {
                Ok(text) => page_texts.push(text.trim_end().to_string()),
                Err(e) => {
                    log::warn!("failed to extract page {page_num}: {e}");
                    page_texts.push(String::new());
                }
            }
        }

        let text = page_texts.join("\n").trim_end().to_string();
        if text.is_empty() {
            return Err(Error::Extraction(
                "PDF contains no extractable text".into(),
            ));
        }

        Ok(Extraction::new(text, DocFormat::Pdf, self.name()).with_pages(page_count))
    }
}
