//! Rewriting improved text back into documents.
//!
//! Two strategies: [`preserve`] maps improved text into an existing
//! document's paragraph/run structure so the original styling survives;
//! [`plain`] builds a fresh, unstyled document and is the fallback when
//! no original structure is available or preservation fails.

pub mod plain;
pub mod preserve;

pub use plain::rewrite_plain;
pub use preserve::{rewrite_preserving, RewritePlan, EMPTY_RUN_QUOTA};

use serde::{Deserialize, Serialize};

/// Which rewrite strategy produced the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewritePath {
    /// Improved text written into the original paragraph/run structure
    Preserved,
    /// Fresh document built from the improved text alone
    Plain,
}

impl std::fmt::Display for RewritePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewritePath::Preserved => f.write_str("preserved"),
            RewritePath::Plain => f.write_str("plain"),
        }
    }
}
