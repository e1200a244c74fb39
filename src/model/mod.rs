//! Document model: paragraphs of styled text runs.

mod document;
mod paragraph;

pub use document::{Document, Metadata};
pub use paragraph::{Paragraph, Run, RunStyle};
