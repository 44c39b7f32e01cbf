//! Immutable, versioned document snapshots.
//!
//! The analysis engine never reads a live buffer directly: every committed edit
//! produces a new [`TextSnapshot`], and all derived structure (outline regions,
//! bracket pairs) is computed against exactly one snapshot. Snapshots are backed
//! by a [`ropey::Rope`], so cloning one is cheap and line access is O(log n).

use ropey::Rope;
use std::ops::Range;

/// A half-open character-offset range (`start..end`) in a document.
///
/// Offsets are in Unicode scalar values (`char`), not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether the span contains the given offset.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Whether two spans overlap (share at least one character).
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Convert to a standard half-open range.
    pub fn to_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// One line of a snapshot, with its character-offset range.
///
/// `start..end` covers the line content only; the trailing line break is
/// excluded (an offset at `end` sits on the line break, not on the next line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLine {
    /// Zero-based line index.
    pub index: usize,
    /// Char offset of the first character of the line.
    pub start: usize,
    /// Char offset past the last character of the line (newline excluded).
    pub end: usize,
    /// Line text without the trailing line break.
    pub text: String,
}

impl SnapshotLine {
    /// The line content as a span.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Whether the line is empty or entirely whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Immutable text state at one point in time, with a monotonically increasing
/// version.
///
/// A snapshot is never mutated; [`TextSnapshot::edit`] produces a successor
/// with `version + 1`. Consumers holding results computed against an older
/// snapshot must re-resolve spans against the latest one via
/// [`TextSnapshot::translate`].
#[derive(Debug, Clone)]
pub struct TextSnapshot {
    version: u64,
    rope: Rope,
}

impl TextSnapshot {
    /// Create the initial snapshot (version 0) from text.
    pub fn new(text: &str) -> Self {
        Self::with_version(text, 0)
    }

    /// Create a snapshot with an explicit version.
    pub fn with_version(text: &str, version: u64) -> Self {
        Self {
            version,
            rope: Rope::from_str(text),
        }
    }

    /// Produce the successor snapshot with `span` replaced by `replacement`.
    ///
    /// `span` is clamped into this snapshot's bounds first; the successor's
    /// version is this snapshot's version plus one.
    pub fn edit(&self, span: Span, replacement: &str) -> TextSnapshot {
        let span = self.translate(span);
        let mut rope = self.rope.clone();
        if !span.is_empty() {
            rope.remove(span.to_range());
        }
        if !replacement.is_empty() {
            rope.insert(span.start, replacement);
        }
        Self {
            version: self.version + 1,
            rope,
        }
    }

    /// Snapshot version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Total character count.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Whether the document contains no text.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Total line count (an empty document has one empty line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get a line by index.
    pub fn line(&self, index: usize) -> Option<SnapshotLine> {
        if index >= self.rope.len_lines() {
            return None;
        }

        let start = self.rope.line_to_char(index);
        let mut text = self.rope.line(index).to_string();

        // Rope's line() includes the trailing line break.
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }

        let end = start + text.chars().count();
        Some(SnapshotLine {
            index,
            start,
            end,
            text,
        })
    }

    /// Iterate over all lines in order.
    pub fn lines(&self) -> impl Iterator<Item = SnapshotLine> + '_ {
        (0..self.line_count()).filter_map(|index| self.line(index))
    }

    /// Line index containing the given char offset (clamped to the document).
    pub fn line_index_at(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Character at the given offset, if in bounds.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset < self.rope.len_chars() {
            Some(self.rope.char(offset))
        } else {
            None
        }
    }

    /// Text covered by `span` (clamped into this snapshot's bounds).
    pub fn text_in(&self, span: Span) -> String {
        let span = self.translate(span);
        self.rope.slice(span.to_range()).to_string()
    }

    /// The complete document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The span covering the whole document.
    pub fn full_span(&self) -> Span {
        Span::new(0, self.rope.len_chars())
    }

    /// Translate a span that originated against another (possibly older)
    /// snapshot into this snapshot's coordinate space.
    ///
    /// The wholesale-replace analysis model needs no per-edit mapping: spans
    /// are clamped edge-exclusively into bounds. A span entirely beyond the
    /// document collapses to an empty span at document end.
    pub fn translate(&self, span: Span) -> Span {
        let len = self.rope.len_chars();
        let start = span.start.min(len);
        let end = span.end.min(len).max(start);
        Span::new(start, end)
    }

    pub(crate) fn rope(&self) -> &Rope {
        &self.rope
    }
}
