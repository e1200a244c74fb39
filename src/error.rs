//! Error types for the docmend pipeline.

use std::io;
use thiserror::Error;

/// Result type alias for docmend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while processing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized or not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The input file exceeds the configured size limit.
    #[error("File too large: {} ({:.1} MB, limit {:.1} MB)", path, *size as f64 / 1_048_576.0, *limit as f64 / 1_048_576.0)]
    FileTooLarge {
        /// Offending file path
        path: String,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Plain-text input could not be decoded with any known encoding.
    #[error("Could not decode text content: {0}")]
    Decode(String),

    /// A per-format reader failed (corrupt file, malformed structure).
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// The text-improvement backend is not reachable or rejected the request.
    #[error("Improver unavailable: {0}")]
    ImproverUnavailable(String),

    /// The text-improvement backend did not respond in time.
    #[error("Improver timed out after {0}s")]
    ImproverTimeout(u64),

    /// The formatting-preserving rewrite could not complete.
    ///
    /// Recovered locally by falling back to the plain rewriter; never
    /// surfaced to the caller as a failure of the whole pipeline.
    #[error("Formatting preservation failed: {0}")]
    Preservation(String),

    /// Writing the output document failed.
    #[error("Failed to save output: {0}")]
    Save(String),

    /// Dispatching the document to a printer failed.
    #[error("Print failed: {0}")]
    Print(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the orchestrator may retry the failed stage.
    ///
    /// Only improver failures are retryable; everything else either aborts
    /// the current document or degrades gracefully.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ImproverUnavailable(_) | Error::ImproverTimeout(_)
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Extraction(err.to_string()),
        }
    }
}
