//! Input format detection: content sniffing with extension fallback.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Supported input document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    /// Office Open XML word-processing document
    Docx,
    /// Legacy binary Word document (best-effort)
    Doc,
    /// Portable Document Format
    Pdf,
    /// Plain text
    Txt,
    /// Rich Text Format
    Rtf,
}

impl DocFormat {
    /// Canonical lowercase extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            DocFormat::Docx => "docx",
            DocFormat::Doc => "doc",
            DocFormat::Pdf => "pdf",
            DocFormat::Txt => "txt",
            DocFormat::Rtf => "rtf",
        }
    }

    /// Map a file extension (without dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(DocFormat::Docx),
            "doc" => Some(DocFormat::Doc),
            "pdf" => Some(DocFormat::Pdf),
            "txt" | "text" => Some(DocFormat::Txt),
            "rtf" => Some(DocFormat::Rtf),
            _ => None,
        }
    }

    /// All supported formats.
    pub fn all() -> &'static [DocFormat] {
        &[
            DocFormat::Docx,
            DocFormat::Doc,
            DocFormat::Pdf,
            DocFormat::Txt,
            DocFormat::Rtf,
        ]
    }
}

impl std::fmt::Display for DocFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
/// RTF files open with a {\rtf group.
const RTF_MAGIC: &[u8] = b"{\\rtf";
/// ZIP local file header; DOCX is a ZIP archive.
const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
/// OLE2 compound-file header; legacy .doc container.
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Sniff a format from the leading bytes of a file.
///
/// Returns `None` when no magic matches; the caller falls back to the
/// file extension. A ZIP header is reported as DOCX since that is the only
/// ZIP-container format this pipeline accepts.
pub fn detect_format_from_bytes(data: &[u8]) -> Option<DocFormat> {
    if data.starts_with(PDF_MAGIC) {
        Some(DocFormat::Pdf)
    } else if data.starts_with(RTF_MAGIC) {
        Some(DocFormat::Rtf)
    } else if data.starts_with(ZIP_MAGIC) {
        Some(DocFormat::Docx)
    } else if data.starts_with(OLE_MAGIC) {
        Some(DocFormat::Doc)
    } else {
        None
    }
}

/// Detect the format of a file: content sniffing first, extension fallback.
///
/// # Errors
///
/// `Error::UnsupportedFormat` when neither the leading bytes nor the
/// extension identify a supported format.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<DocFormat> {
    let path = path.as_ref();

    let mut header = [0u8; 8];
    let read = File::open(path).and_then(|mut f| f.read(&mut header))?;
    if let Some(format) = detect_format_from_bytes(&header[..read]) {
        return Ok(format);
    }

    path.extension()
        .and_then(|e| e.to_str())
        .and_then(DocFormat::from_extension)
        .ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "{} (supported: docx, doc, pdf, txt, rtf)",
                path.display()
            ))
        })
}

/// Validate an input file before any processing.
///
/// Checks existence, the configured size limit, and format support, in
/// that order. Returns the detected format and the file size in bytes.
pub fn validate_input<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<(DocFormat, u64)> {
    let path = path.as_ref();
    let meta = std::fs::metadata(path)?;

    let size = meta.len();
    if size > max_bytes {
        return Err(Error::FileTooLarge {
            path: path.display().to_string(),
            size,
            limit: max_bytes,
        });
    }

    let format = detect_format(path)?;
    Ok((format, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_pdf_magic() {
        assert_eq!(
            detect_format_from_bytes(b"%PDF-1.7\n%junk"),
            Some(DocFormat::Pdf)
        );
    }

    #[test]
    fn test_detect_rtf_magic() {
        assert_eq!(
            detect_format_from_bytes(b"{\\rtf1\\ansi"),
            Some(DocFormat::Rtf)
        );
    }

    #[test]
    fn test_detect_zip_is_docx() {
        assert_eq!(
            detect_format_from_bytes(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00]),
            Some(DocFormat::Docx)
        );
    }

    #[test]
    fn test_detect_ole_is_doc() {
        let mut data = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        data.extend_from_slice(&[0u8; 8]);
        assert_eq!(detect_format_from_bytes(&data), Some(DocFormat::Doc));
    }

    #[test]
    fn test_detect_no_magic() {
        assert_eq!(detect_format_from_bytes(b"just some text"), None);
        assert_eq!(detect_format_from_bytes(b""), None);
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(DocFormat::from_extension("DOCX"), Some(DocFormat::Docx));
        assert_eq!(DocFormat::from_extension("text"), Some(DocFormat::Txt));
        assert_eq!(DocFormat::from_extension("xlsx"), None);
    }

    #[test]
    fn test_detect_falls_back_to_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut f = File::create(&path).unwrap();
        f.write_all(b"plain text, no magic").unwrap();

        assert_eq!(detect_format(&path).unwrap(), DocFormat::Txt);
    }

    #[test]
    fn test_detect_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.xyz");
        std::fs::write(&path, b"garbage").unwrap();

        let result = detect_format(&path);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validate_input_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        std::fs::write(&path, vec![b'a'; 2048]).unwrap();

        let result = validate_input(&path, 1024);
        assert!(matches!(result, Err(Error::FileTooLarge { .. })));
    }

    #[test]
    fn test_validate_input_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.txt");
        std::fs::write(&path, b"hello").unwrap();

        let (format, size) = validate_input(&path, 1024).unwrap();
        assert_eq!(format, DocFormat::Txt);
        assert_eq!(size, 5);
    }
}
