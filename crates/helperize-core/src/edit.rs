//! Span-based source edits
//!
//! Rewritten trees are re-emitted by splicing the text of synthesized nodes
//! over the source spans they replaced, leaving everything else untouched.

use mago_span::Span;
use thiserror::Error;

/// Errors that can occur while splicing edits into source text
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Overlapping edits detected at offset {0}")]
    OverlappingEdits(usize),

    #[error("Edit span {start}..{end} out of bounds for source length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
}

/// Replacement of one source span
#[derive(Debug, Clone)]
pub struct Edit {
    pub span: Span,
    pub replacement: String,
    /// Human-readable description of the edit
    pub message: String,
}

impl Edit {
    pub fn new(span: Span, replacement: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            message: message.into(),
        }
    }

    pub fn start_offset(&self) -> usize {
        self.span.start.offset as usize
    }

    pub fn end_offset(&self) -> usize {
        self.span.end.offset as usize
    }

    /// 1-based line and column of the edit start within `source`
    pub fn line_column(&self, source: &str) -> (usize, usize) {
        offset_to_line_column(source, self.start_offset())
    }
}

/// Apply edits to `source`, back to front so earlier offsets stay valid.
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by(|a, b| b.start_offset().cmp(&a.start_offset()));

    let len = source.len();
    let mut prev_start: Option<usize> = None;
    for edit in &sorted {
        let (start, end) = (edit.start_offset(), edit.end_offset());
        if end > len || start > end {
            return Err(EditError::SpanOutOfBounds { start, end, len });
        }
        if prev_start.is_some_and(|prev| end > prev) {
            return Err(EditError::OverlappingEdits(start));
        }
        prev_start = Some(start);
    }

    let mut result = source.to_string();
    for edit in sorted {
        result.replace_range(edit.start_offset()..edit.end_offset(), &edit.replacement);
    }

    Ok(result)
}

/// Sort edits by position and drop exact duplicates (same span, same text).
pub fn dedup_edits(mut edits: Vec<Edit>) -> Vec<Edit> {
    edits.sort_by(|a, b| {
        (a.start_offset(), a.end_offset(), &a.replacement)
            .cmp(&(b.start_offset(), b.end_offset(), &b.replacement))
    });
    edits.dedup_by(|b, a| {
        a.start_offset() == b.start_offset()
            && a.end_offset() == b.end_offset()
            && a.replacement == b.replacement
    });
    edits
}

fn offset_to_line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mago_database::file::FileId;
    use mago_span::Position;

    fn make_span(start: u32, end: u32) -> Span {
        Span::new(FileId::zero(), Position::new(start), Position::new(end))
    }

    #[test]
    fn test_simple_replacement() {
        let source = "$this->faker->name";
        let edit = Edit::new(make_span(0, 12), "fake()", "helper");

        assert_eq!(apply_edits(source, &[edit]).unwrap(), "fake()->name");
    }

    #[test]
    fn test_multiple_edits_any_order() {
        let source = "[$this->faker->a, $this->faker->b]";
        let edits = vec![
            Edit::new(make_span(18, 30), "fake()", "second"),
            Edit::new(make_span(1, 13), "fake()", "first"),
        ];

        assert_eq!(apply_edits(source, &edits).unwrap(), "[fake()->a, fake()->b]");
    }

    #[test]
    fn test_overlapping_edits() {
        let source = "$this->faker->name";
        let edits = vec![
            Edit::new(make_span(0, 12), "fake()", "a"),
            Edit::new(make_span(6, 18), "x", "b"),
        ];

        assert!(matches!(
            apply_edits(source, &edits),
            Err(EditError::OverlappingEdits(_))
        ));
    }

    #[test]
    fn test_out_of_bounds() {
        let edit = Edit::new(make_span(0, 100), "replacement", "oob");
        assert!(matches!(
            apply_edits("short", &[edit]),
            Err(EditError::SpanOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_dedup_drops_identical_edits_only() {
        let edits = vec![
            Edit::new(make_span(10, 22), "fake()", "outer"),
            Edit::new(make_span(0, 5), "x", "first"),
            Edit::new(make_span(10, 22), "fake()", "nested"),
            Edit::new(make_span(10, 22), "other()", "different"),
        ];

        let deduped = dedup_edits(edits);
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[0].start_offset(), 0);
        assert_eq!(deduped[1].message, "outer");
    }

    #[test]
    fn test_dedup_interleaved_same_span() {
        let edits = vec![
            Edit::new(make_span(1, 13), "fake()", "a"),
            Edit::new(make_span(1, 13), "other()", "b"),
            Edit::new(make_span(1, 13), "fake()", "a again"),
        ];

        let deduped = dedup_edits(edits);
        let replacements: Vec<_> = deduped.iter().map(|e| e.replacement.as_str()).collect();
        assert_eq!(replacements, vec!["fake()", "other()"]);
    }

    #[test]
    fn test_line_column() {
        let source = "<?php\nreturn [\n    'a' => 1,\n];";
        let edit = Edit::new(make_span(19, 22), "'b'", "key");
        assert_eq!(edit.line_column(source), (3, 5));
    }
}
