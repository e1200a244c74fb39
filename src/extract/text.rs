//! Plain-text reading with a fixed encoding ladder.
//!
//! Decoding is attempted in a fixed order and the first clean decode
//! wins: UTF-8, UTF-16 (BOM required), strict Latin-1, Windows-1252.
//! Latin-1 is strict about the C1 control range so that files using
//! the Windows-1252 punctuation block fall through to the right pass.

use crate::detect::DocFormat;
use crate::error::{Error, Result};
use std::path::Path;

use super::{Extraction, TextExtractor};

/// Windows-1252 mappings for 0x80..=0x9F. Zero marks the five
/// codepoints the code page leaves undefined.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\0', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\0', '\u{017D}', '\0',
    '\0', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\0', '\u{017E}', '\u{0178}',
];

/// Decode raw bytes to text, returning the text and the encoding name.
pub fn decode_text(data: &[u8]) -> Result<(String, &'static str)> {
    if let Ok(s) = std::str::from_utf8(data) {
        return Ok((s.strip_prefix('\u{FEFF}').unwrap_or(s).to_string(), "utf-8"));
    }

    if let Some(text) = decode_utf16(data) {
        return Ok((text, "utf-16"));
    }

    if let Some(text) = decode_latin1_strict(data) {
        return Ok((text, "latin-1"));
    }

    if let Some(text) = decode_cp1252(data) {
        return Ok((text, "windows-1252"));
    }

    Err(Error::Decode(
        "file is not valid UTF-8, UTF-16, Latin-1, or Windows-1252".into(),
    ))
}

/// UTF-16 with a mandatory byte order mark.
fn decode_utf16(data: &[u8]) -> Option<String> {
    let (le, payload) = match data {
        [0xFF, 0xFE, rest @ ..] => (true, rest),
        [0xFE, 0xFF, rest @ ..] => (false, rest),
        _ => return None,
    };
    if payload.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = payload
        .chunks_exact(2)
        .map(|pair| {
            if le {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();
    String::from_utf16(&units).ok()
}

/// Latin-1, rejecting the 0x80..=0x9F control range.
fn decode_latin1_strict(data: &[u8]) -> Option<String> {
    if data.iter().any(|&b| (0x80..=0x9F).contains(&b)) {
        return None;
    }
    Some(data.iter().map(|&b| b as char).collect())
}

fn decode_cp1252(data: &[u8]) -> Option<String> {
    let mut text = String::with_capacity(data.len());
    for &b in data {
        let c = match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
            _ => b as char,
        };
        if c == '\0' && b != 0 {
            return None;
        }
        text.push(c);
    }
    Some(text)
}

/// Plain-text file extractor.
pub struct TextFileExtractor;

impl TextFileExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextFileExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for TextFileExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn formats(&self) -> &[DocFormat] {
        &[DocFormat::Txt]
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        let data = std::fs::read(path)?;
        let (text, encoding) = decode_text(&data)?;
        Ok(Extraction::new(text, DocFormat::Txt, self.name()).with_encoding(encoding))
    }
}
