//! Paragraph and run-level types.

use serde::{Deserialize, Serialize};

/// A paragraph: an ordered sequence of styled text runs.
///
/// The paragraph's rendered text is the concatenation of its runs' text,
/// in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in the paragraph; order significant
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self { runs: Vec::new() }
    }

    /// Create a paragraph with a single default-styled run.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::new(text)],
        }
    }

    /// Append a run.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// The paragraph's visible text: run texts concatenated in order.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Whether the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }
}

/// A contiguous span of text sharing one style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,

    /// Style attributes, atomic for the whole run
    pub style: RunStyle,
}

impl Run {
    /// Create a run with default (unset) style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    /// Create a run with an explicit style.
    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle {
                bold: Some(true),
                ..Default::default()
            },
        }
    }

    /// Create an italic run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle {
                italic: Some(true),
                ..Default::default()
            },
        }
    }

    /// Length of the run's text in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Style attributes for a run. Each attribute is optional: `None` means
/// unset, inheriting whatever the surrounding document defines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    /// Bold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    /// Italic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,

    /// Underline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,

    /// Font name (e.g. "Calibri")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,

    /// Font size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,

    /// Text color as a hex string without '#' (e.g. "FF0000")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl RunStyle {
    /// Check if any attribute is set.
    pub fn has_styling(&self) -> bool {
        self.bold.is_some()
            || self.italic.is_some()
            || self.underline.is_some()
            || self.font_name.is_some()
            || self.font_size.is_some()
            || self.color.is_some()
    }

    /// Best-effort attribute-by-attribute copy from another style.
    ///
    /// Each attribute is copied independently; an unset source attribute is
    /// skipped without affecting the others. Returns the number of
    /// attributes actually copied, for diagnostics.
    pub fn copy_from(&mut self, other: &RunStyle) -> usize {
        let mut copied = 0;

        if let Some(v) = other.bold {
            self.bold = Some(v);
            copied += 1;
        }
        if let Some(v) = other.italic {
            self.italic = Some(v);
            copied += 1;
        }
        if let Some(v) = other.underline {
            self.underline = Some(v);
            copied += 1;
        }
        if let Some(ref v) = other.font_name {
            self.font_name = Some(v.clone());
            copied += 1;
        }
        if let Some(v) = other.font_size {
            self.font_size = Some(v);
            copied += 1;
        }
        if let Some(ref v) = other.color {
            self.color = Some(v.clone());
            copied += 1;
        }

        copied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let mut p = Paragraph::new();
        p.add_run(Run::new("Hello "));
        p.add_run(Run::bold("world"));
        p.add_run(Run::new("!"));

        assert_eq!(p.plain_text(), "Hello world!");
    }

    #[test]
    fn test_paragraph_empty() {
        assert!(Paragraph::new().is_empty());

        let mut p = Paragraph::new();
        p.add_run(Run::new(""));
        assert!(p.is_empty());

        p.add_run(Run::new("x"));
        assert!(!p.is_empty());
    }

    #[test]
    fn test_char_len_multibyte() {
        let run = Run::new("héllo");
        assert_eq!(run.char_len(), 5);
        assert_eq!(run.text.len(), 6);
    }

    #[test]
    fn test_style_copy_counts_attributes() {
        let src = RunStyle {
            bold: Some(true),
            font_name: Some("Arial".into()),
            font_size: Some(11.0),
            ..Default::default()
        };

        let mut dst = RunStyle::default();
        assert_eq!(dst.copy_from(&src), 3);
        assert_eq!(dst.bold, Some(true));
        assert_eq!(dst.font_name.as_deref(), Some("Arial"));
        assert!(dst.italic.is_none());
    }

    #[test]
    fn test_style_copy_skips_unset() {
        let src = RunStyle::default();
        let mut dst = RunStyle {
            bold: Some(true),
            ..Default::default()
        };

        assert_eq!(dst.copy_from(&src), 0);
        // Existing attributes are left alone when the source is unset.
        assert_eq!(dst.bold, Some(true));
    }

    #[test]
    fn test_has_styling() {
        assert!(!RunStyle::default().has_styling());
        assert!(RunStyle {
            color: Some("FF0000".into()),
            ..Default::default()
        }
        .has_styling());
    }
}
