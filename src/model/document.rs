//! Document-level types.

use super::Paragraph;
use crate::detect::DocFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document loaded for rewriting.
///
/// Owned by one pipeline run: loaded from the original file, mutated in
/// place by the rewriter, serialized to the output path, discarded. Never
/// cloned mid-pipeline and never shared across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Paragraphs in document order; order is preserved on output
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Append a paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// Whether the document has no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Plain text of the whole document, one line per paragraph.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Document metadata, all optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Document author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Creation date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,

    /// Format the document was loaded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_format: Option<DocFormat>,

    /// Paragraph count at load time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_count: Option<usize>,

    /// Page count, when the source format has pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}
