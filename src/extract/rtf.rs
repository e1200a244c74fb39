//! RTF text extraction.
//!
//! A lightweight control-word stripper rather than a full RTF parser:
//! paragraph and line controls become newlines, hex escapes are decoded,
//! remaining control words and group braces are dropped, and whitespace
//! is normalized. Destination groups that never carry body text (fonttbl,
//! colortbl, stylesheet, info, pict) are removed wholesale.

use crate::detect::DocFormat;
use crate::error::{Error, Result};
use regex::Regex;
use std::path::Path;

use super::text::decode_text;
use super::{Extraction, TextExtractor};

pub struct RtfExtractor {
    newline_controls: Regex,
    hex_escape: Regex,
    control_word: Regex,
    spaces: Regex,
    blank_runs: Regex,
}

impl RtfExtractor {
    pub fn new() -> Self {
        Self {
            newline_controls: Regex::new(r"\\(?:par|line|sect|page)\b ?").unwrap(),
            hex_escape: Regex::new(r"\\'([0-9a-fA-F]{2})").unwrap(),
            control_word: Regex::new(r"\\[a-zA-Z]+-?\d* ?|\\\*").unwrap(),
            spaces: Regex::new(r"[ \t]+").unwrap(),
            blank_runs: Regex::new(r"\n{3,}").unwrap(),
        }
    }

    fn strip(&self, rtf: &str) -> String {
        let text = strip_headless_groups(rtf);
        let text = self.newline_controls.replace_all(&text, "\n");
        let text = self
            .hex_escape
            .replace_all(&text, |caps: &regex::Captures| {
                let byte = u8::from_str_radix(&caps[1], 16).unwrap_or(b'?');
                // hex escapes address the document code page; treat as cp1252
                (byte as char).to_string()
            });
        // literal brace and backslash escapes, protected before the
        // generic control-word pass
        let text = text
            .replace(r"\{", "\u{0}L")
            .replace(r"\}", "\u{0}R")
            .replace(r"\\", "\u{0}B");
        let text = self.control_word.replace_all(&text, "");
        let text = text.replace(['{', '}'], "");
        let text = text
            .replace("\u{0}L", "{")
            .replace("\u{0}R", "}")
            .replace("\u{0}B", "\\");
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let text = self.spaces.replace_all(&text, " ");
        let text = self.blank_runs.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}

/// Remove groups whose destination carries no body text.
fn strip_headless_groups(rtf: &str) -> String {
    const SKIP: [&str; 5] = ["fonttbl", "colortbl", "stylesheet", "info", "pict"];
    let bytes = rtf.as_bytes();
    let mut out = String::with_capacity(rtf.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            let rest = &rtf[i + 1..];
            let rest = rest.strip_prefix("\\*").unwrap_or(rest);
            if let Some(word) = rest.strip_prefix('\\') {
                if SKIP.iter().any(|s| word.starts_with(s)) {
                    i += skip_group(&bytes[i..]);
                    continue;
                }
            }
        }
        // advance one char, not one byte
        let ch_len = rtf[i..].chars().next().map_or(1, |c| c.len_utf8());
        out.push_str(&rtf[i..i + ch_len]);
        i += ch_len;
    }
    out
}

/// Length of the brace-balanced group starting at `bytes[0] == b'{'`.
fn skip_group(bytes: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

impl Default for RtfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for RtfExtractor {
    fn name(&self) -> &'static str {
        "rtf"
    }

    fn formats(&self) -> &[DocFormat] {
        &[DocFormat::Rtf]
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        let data = std::fs::read(path)?;
        let (raw, _) = decode_text(&data)?;

        if !raw.starts_with("{\\rtf") {
            return Err(Error::Extraction("missing RTF header".into()));
        }

        let text = self.strip(&raw);
        if text.is_empty() {
            return Err(Error::Extraction("RTF contains no body text".into()));
        }

        Ok(Extraction::new(text, DocFormat::Rtf, self.name()))
    }
}
