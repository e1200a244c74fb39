//! Offline rule-based improver.
//!
//! Applies a small set of mechanical cleanups so the pipeline works end
//! to end without any network provider configured: common missing
//! apostrophes, standalone "i", doubled spaces, and sentence-start
//! capitalization per line. Deliberately conservative; it never reflows
//! or reorders text, so line structure is stable for the rewrite stage.

use crate::error::Result;
use regex::{Captures, Regex};

use super::{normalize_response, Improvement, TextImprover};

pub struct RuleImprover {
    words: Regex,
    spaces: Regex,
}

fn fix_word(word: &str) -> &str {
    match word {
        "dont" => "don't",
        "Dont" => "Don't",
        "cant" => "can't",
        "Cant" => "Can't",
        "wont" => "won't",
        "Wont" => "Won't",
        "im" | "Im" => "I'm",
        "ive" | "Ive" => "I've",
        "lets" => "let's",
        "Lets" => "Let's",
        "i" => "I",
        other => other,
    }
}

impl RuleImprover {
    pub fn new() -> Self {
        Self {
            words: Regex::new(
                r"\b(dont|Dont|cant|Cant|wont|Wont|im|Im|ive|Ive|lets|Lets|i)\b",
            )
            .unwrap(),
            spaces: Regex::new(r" {2,}").unwrap(),
        }
    }

    fn apply(&self, text: &str) -> (String, usize) {
        let mut corrections = 0;

        let text = self.words.replace_all(text, |caps: &Captures| {
            corrections += 1;
            fix_word(&caps[1]).to_string()
        });

        let spaced = self.spaces.replace_all(&text, " ");
        if spaced != text {
            corrections += 1;
        }

        let mut lines = Vec::new();
        for line in spaced.split('\n') {
            lines.push(capitalize_line(line, &mut corrections));
        }

        (lines.join("\n"), corrections)
    }
}

/// Uppercase the first alphabetic character of a line.
fn capitalize_line(line: &str, corrections: &mut usize) -> String {
    for (idx, c) in line.char_indices() {
        if c.is_alphabetic() {
            if c.is_lowercase() {
                *corrections += 1;
                let mut fixed = String::with_capacity(line.len());
                fixed.push_str(&line[..idx]);
                fixed.extend(c.to_uppercase());
                fixed.push_str(&line[idx + c.len_utf8()..]);
                return fixed;
            }
            break;
        }
        if !c.is_whitespace() {
            break;
        }
    }
    line.to_string()
}

impl Default for RuleImprover {
    fn default() -> Self {
        Self::new()
    }
}

impl TextImprover for RuleImprover {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn improve(&self, text: &str, _hint: Option<&str>) -> Result<Improvement> {
        let (improved, corrections) = self.apply(text);
        let summary = if corrections == 0 {
            "No corrections needed".to_string()
        } else {
            format!("Applied {corrections} corrections (contractions, capitalization, spacing)")
        };
        let raw = format!("IMPROVED DOCUMENT:\n{improved}\n\nCHANGES SUMMARY:\n{summary}");
        Ok(normalize_response(&raw))
    }
}
