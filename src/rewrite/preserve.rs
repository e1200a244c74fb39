//! Formatting-preserving rewrite: map improved plain text back into an
//! existing document's paragraph/run structure.
//!
//! Line *i* of the improved text replaces the text of paragraph *i*. Within
//! a paragraph the new text is distributed across the existing runs by each
//! run's original length, so style boundaries stay approximately where they
//! were in the original prose. Paragraph count never changes: paragraphs
//! beyond the last line keep their original text and style, and lines
//! beyond the last paragraph are dropped.

use crate::model::{Document, Paragraph, Run};

/// Consumption quota for a run whose original text was empty.
///
/// Zero-length runs would otherwise stall the distribution; giving them a
/// fixed width lets them absorb overflow text.
pub const EMPTY_RUN_QUOTA: usize = 32;

/// The line-to-paragraph assignment for one rewrite call.
///
/// Ephemeral: built from the improved text, consumed by
/// [`rewrite_preserving`], discarded. Line *i* targets paragraph *i*;
/// the assignment stops when either side is exhausted.
#[derive(Debug)]
pub struct RewritePlan {
    lines: Vec<String>,
}

impl RewritePlan {
    /// Split improved text into lines. One split per `\n`, a single
    /// trailing `\r` stripped per line; no merging, no re-wrapping.
    pub fn build(improved_text: &str) -> Self {
        let lines = improved_text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Self { lines }
    }

    /// Number of lines in the plan.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the plan holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The lines in assignment order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Write improved text into `doc`, preserving its run-level styling.
///
/// Mutates the document in place and cannot fail; I/O and serialization
/// happen later in the output stage.
pub fn rewrite_preserving(doc: &mut Document, improved_text: &str) {
    let plan = RewritePlan::build(improved_text);

    let assigned = plan.len().min(doc.paragraphs.len());
    if plan.len() > doc.paragraphs.len() {
        log::warn!(
            "improved text has {} lines but document has {} paragraphs; dropping {} excess lines",
            plan.len(),
            doc.paragraphs.len(),
            plan.len() - doc.paragraphs.len()
        );
    }

    for (paragraph, line) in doc.paragraphs.iter_mut().zip(plan.lines()) {
        distribute_runs(paragraph, line);
    }

    log::debug!(
        "preserving rewrite assigned {} of {} lines across {} paragraphs",
        assigned,
        plan.len(),
        doc.paragraphs.len()
    );
}

/// Distribute new text across a paragraph's existing runs.
///
/// Each run consumes a prefix of the remaining text equal to its original
/// length in characters (or [`EMPTY_RUN_QUOTA`] if it was empty). A run
/// whose quota finds no text left becomes empty but keeps its style. Any
/// remainder after all quotas goes into one appended run styled after the
/// paragraph's last original run.
fn distribute_runs(paragraph: &mut Paragraph, new_text: &str) {
    if paragraph.runs.is_empty() {
        paragraph.runs.push(Run::new(new_text));
        return;
    }

    let mut rest = new_text.chars();

    for run in paragraph.runs.iter_mut() {
        let quota = match run.char_len() {
            0 => EMPTY_RUN_QUOTA,
            n => n,
        };
        run.text = rest.by_ref().take(quota).collect();
    }

    let remainder: String = rest.collect();
    if !remainder.is_empty() {
        let mut overflow = Run::new(remainder);
        // Style inherited from the last original run, attribute by
        // attribute; partial copy is acceptable.
        if let Some(last) = paragraph.runs.last() {
            let copied = overflow.style.copy_from(&last.style);
            log::debug!("overflow run inherited {copied} style attributes");
        }
        paragraph.runs.push(overflow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunStyle;

    fn styled(text: &str, style: RunStyle) -> Run {
        Run::styled(text, style)
    }

    fn bold_style() -> RunStyle {
        RunStyle {
            bold: Some(true),
            ..Default::default()
        }
    }

    fn italic_style() -> RunStyle {
        RunStyle {
            italic: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_splits_lines() {
        let plan = RewritePlan::build("one\ntwo\r\nthree");
        assert_eq!(plan.lines(), &["one", "two", "three"]);
    }

    #[test]
    fn test_plan_empty_text_is_one_empty_line() {
        let plan = RewritePlan::build("");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.lines(), &[""]);
    }

    #[test]
    fn test_distribute_by_original_lengths() {
        // "Hello " (6 chars, bold) + "world" (5 chars, italic),
        // new text "Goodbye world" (13 chars) splits 6 + 5 + overflow 2.
        let mut p = Paragraph {
            runs: vec![
                styled("Hello ", bold_style()),
                styled("world", italic_style()),
            ],
        };
        distribute_runs(&mut p, "Goodbye world");

        assert_eq!(p.runs[0].text, "Goodby");
        assert_eq!(p.runs[0].style, bold_style());
        assert_eq!(p.runs[1].text, "e wor");
        assert_eq!(p.runs[1].style, italic_style());
        // Overflow run copies the last original run's style.
        assert_eq!(p.runs[2].text, "ld");
        assert_eq!(p.runs[2].style.italic, Some(true));
        assert_eq!(p.plain_text(), "Goodbye world");
    }

    #[test]
    fn test_distribute_shorter_text_empties_trailing_runs() {
        let mut p = Paragraph {
            runs: vec![styled("Hello ", bold_style()), styled("world", italic_style())],
        };
        distribute_runs(&mut p, "Hi");

        assert_eq!(p.runs.len(), 2);
        assert_eq!(p.runs[0].text, "Hi");
        assert_eq!(p.runs[1].text, "");
        // Emptied run keeps its style.
        assert_eq!(p.runs[1].style, italic_style());
    }

    #[test]
    fn test_distribute_no_runs_creates_one() {
        let mut p = Paragraph::new();
        distribute_runs(&mut p, "brand new text");

        assert_eq!(p.runs.len(), 1);
        assert_eq!(p.runs[0].text, "brand new text");
        assert!(!p.runs[0].style.has_styling());
    }

    #[test]
    fn test_overflow_run_copies_last_style() {
        // ("Hi", bold) + "Hello there" -> ("He", bold) + ("llo there", bold)
        let mut p = Paragraph {
            runs: vec![styled("Hi", bold_style())],
        };
        distribute_runs(&mut p, "Hello there");

        assert_eq!(p.runs.len(), 2);
        assert_eq!(p.runs[0].text, "He");
        assert_eq!(p.runs[1].text, "llo there");
        assert_eq!(p.runs[1].style.bold, Some(true));
    }

    #[test]
    fn test_empty_run_absorbs_up_to_quota() {
        let long_text: String = "x".repeat(EMPTY_RUN_QUOTA + 10);
        let mut p = Paragraph {
            runs: vec![styled("", bold_style()), styled("ab", italic_style())],
        };
        distribute_runs(&mut p, &long_text);

        assert_eq!(p.runs[0].char_len(), EMPTY_RUN_QUOTA);
        assert_eq!(p.runs[1].char_len(), 2);
        assert_eq!(p.runs[2].char_len(), 8);
        assert_eq!(p.plain_text(), long_text);
    }

    #[test]
    fn test_distribute_counts_chars_not_bytes() {
        // Multibyte text must never split inside a UTF-8 sequence.
        let mut p = Paragraph {
            runs: vec![styled("héllo", bold_style()), styled(" wörld", italic_style())],
        };
        distribute_runs(&mut p, "àccénted téxt");

        assert_eq!(p.runs[0].char_len(), 5);
        assert_eq!(p.runs[1].char_len(), 6);
        assert_eq!(p.plain_text(), "àccénted téxt");
    }

    #[test]
    fn test_rewrite_paragraph_count_never_changes() {
        for (n_paragraphs, text) in [
            (0, "a\nb\nc"),
            (2, "a\nb\nc\nd\ne"),
            (5, "only one line"),
            (3, ""),
        ] {
            let mut doc = Document::new();
            for i in 0..n_paragraphs {
                doc.add_paragraph(Paragraph::with_text(format!("original {i}")));
            }
            rewrite_preserving(&mut doc, text);
            assert_eq!(doc.paragraph_count(), n_paragraphs);
        }
    }

    #[test]
    fn test_rewrite_text_fidelity() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("first original"));
        doc.add_paragraph(Paragraph::with_text("second original"));

        rewrite_preserving(&mut doc, "Improved  first line\nimproved second");

        assert_eq!(doc.paragraphs[0].plain_text(), "Improved  first line");
        assert_eq!(doc.paragraphs[1].plain_text(), "improved second");
    }

    #[test]
    fn test_rewrite_untouched_tail() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("first"));
        doc.add_paragraph(Paragraph {
            runs: vec![styled("kept ", bold_style()), styled("intact", italic_style())],
        });

        rewrite_preserving(&mut doc, "only one line");

        // Paragraph beyond the last line is byte-identical.
        assert_eq!(doc.paragraphs[1].plain_text(), "kept intact");
        assert_eq!(doc.paragraphs[1].runs[0].style, bold_style());
        assert_eq!(doc.paragraphs[1].runs[1].style, italic_style());
    }

    #[test]
    fn test_rewrite_drops_overflow_lines() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("one"));

        rewrite_preserving(&mut doc, "kept\nDROPPED LINE\nALSO DROPPED");

        assert_eq!(doc.paragraph_count(), 1);
        let text = doc.plain_text();
        assert!(!text.contains("DROPPED"));
        assert_eq!(doc.paragraphs[0].plain_text(), "kept");
    }
}
