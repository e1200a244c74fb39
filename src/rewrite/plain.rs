//! Plain rewrite: build a fresh document from improved text.
//!
//! Fallback for inputs with no original structure (TXT, PDF, RTF) and for
//! preserving rewrites that fail. No styling is retained.

use crate::model::{Document, Paragraph};

/// Build a new document from improved text.
///
/// Text is split at blank-line boundaries; each non-empty block becomes one
/// paragraph with a single default-styled run. Blocks keep their internal
/// single line breaks.
pub fn rewrite_plain(improved_text: &str) -> Document {
    let normalized = improved_text.replace("\r\n", "\n");

    let mut doc = Document::new();
    for block in normalized.split("\n\n") {
        let block = block.trim();
        if !block.is_empty() {
            doc.add_paragraph(Paragraph::with_text(block));
        }
    }
    doc
}
