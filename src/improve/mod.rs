//! Text improvement providers.
//!
//! Providers return raw text that is expected, but not required, to
//! follow the two-section response convention:
//!
//! ```text
//! IMPROVED DOCUMENT:
//! <the rewritten text>
//!
//! CHANGES SUMMARY:
//! <one-line description of the edits>
//! ```
//!
//! [`normalize_response`] parses that convention leniently; a response
//! without the markers is used wholesale with a generic summary, so a
//! sloppy provider degrades to a working result instead of an error.

pub mod openai;
pub mod rules;

pub use openai::OpenAiImprover;
pub use rules::RuleImprover;

use crate::error::Result;

const IMPROVED_MARKER: &str = "IMPROVED DOCUMENT:";
const SUMMARY_MARKER: &str = "CHANGES SUMMARY:";

/// Result of an improvement pass.
#[derive(Debug, Clone)]
pub struct Improvement {
    /// The improved text
    pub improved_text: String,

    /// One-line description of the edits
    pub summary: String,

    /// The provider's raw response, kept for diagnostics
    pub raw: String,
}

/// A text improvement provider.
pub trait TextImprover: Send + Sync {
    /// Provider name, used in logs and records.
    fn name(&self) -> &'static str;

    /// Improve the given text. The optional `hint` names the source
    /// document type so a provider can tailor its handling.
    fn improve(&self, text: &str, hint: Option<&str>) -> Result<Improvement>;
}

/// Parse a provider response into text and summary.
///
/// When both markers are present, everything between them is the improved
/// text and everything after the summary marker is the summary. Otherwise
/// the whole response is taken as the improved text.
pub fn normalize_response(raw: &str) -> Improvement {
    if raw.contains(IMPROVED_MARKER) && raw.contains(SUMMARY_MARKER) {
        let mut parts = raw.splitn(2, SUMMARY_MARKER);
        let content = parts
            .next()
            .unwrap_or("")
            .replace(IMPROVED_MARKER, "")
            .trim()
            .to_string();
        let summary = parts
            .next()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Document processed successfully".to_string());
        Improvement {
            improved_text: content,
            summary,
            raw: raw.to_string(),
        }
    } else {
        Improvement {
            improved_text: raw.trim().to_string(),
            summary: "Document processed and improved".to_string(),
            raw: raw.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_both_markers() {
        let raw = "IMPROVED DOCUMENT:\nBetter text here.\n\nCHANGES SUMMARY:\nFixed two typos.";
        let improvement = normalize_response(raw);
        assert_eq!(improvement.improved_text, "Better text here.");
        assert_eq!(improvement.summary, "Fixed two typos.");
    }

    #[test]
    fn test_normalize_without_markers() {
        let improvement = normalize_response("  just some text  ");
        assert_eq!(improvement.improved_text, "just some text");
        assert_eq!(improvement.summary, "Document processed and improved");
    }

    #[test]
    fn test_normalize_empty_summary_section() {
        let raw = "IMPROVED DOCUMENT:\nText.\n\nCHANGES SUMMARY:\n   ";
        let improvement = normalize_response(raw);
        assert_eq!(improvement.improved_text, "Text.");
        assert_eq!(improvement.summary, "Document processed successfully");
    }

    #[test]
    fn test_raw_is_preserved() {
        let raw = "IMPROVED DOCUMENT:\nX\nCHANGES SUMMARY:\nY";
        assert_eq!(normalize_response(raw).raw, raw);
    }
}
