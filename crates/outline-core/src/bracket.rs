//! Depth-aware bracket pair matching.
//!
//! Runs synchronously on demand against one snapshot: cheap enough for the
//! caret-movement path, so results are transient and never cached. Matching is
//! a bounded linear scan; an opening marker increments depth and only the
//! closing marker that returns to the starting depth is the partner, so nested
//! pairs are skipped rather than mismatched.

use crate::snapshot::{Span, TextSnapshot};

/// One opening/closing marker pair recognized by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketKind {
    /// Opening marker.
    pub open: char,
    /// Closing marker.
    pub close: char,
}

impl BracketKind {
    /// Create a marker pair.
    pub fn new(open: char, close: char) -> Self {
        Self { open, close }
    }
}

/// The set of marker pairs a matcher recognizes.
///
/// Each kind is matched independently; markers of other kinds are ignored
/// while scanning for a partner.
#[derive(Debug, Clone)]
pub struct BracketSet {
    kinds: Vec<BracketKind>,
}

impl BracketSet {
    /// Create a set from explicit marker pairs.
    pub fn new(kinds: Vec<BracketKind>) -> Self {
        Self { kinds }
    }

    /// The recognized marker pairs.
    pub fn kinds(&self) -> &[BracketKind] {
        &self.kinds
    }

    fn kind_opened_by(&self, ch: char) -> Option<BracketKind> {
        self.kinds.iter().copied().find(|kind| kind.open == ch)
    }

    fn kind_closed_by(&self, ch: char) -> Option<BracketKind> {
        self.kinds.iter().copied().find(|kind| kind.close == ch)
    }
}

impl Default for BracketSet {
    /// Parentheses, square brackets, and braces.
    fn default() -> Self {
        Self::new(vec![
            BracketKind::new('(', ')'),
            BracketKind::new('[', ']'),
            BracketKind::new('{', '}'),
        ])
    }
}

/// A matched pair: the two marker spans to highlight.
///
/// Transient result; recompute after every caret move or edit instead of
/// storing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPair {
    /// Span of the opening marker (one character).
    pub open: Span,
    /// Span of the closing marker (one character).
    pub close: Span,
    /// Number of same-kind pairs enclosing this one (0 = top level).
    pub depth: usize,
}

/// On-demand bracket matcher over a snapshot.
#[derive(Debug, Clone, Default)]
pub struct BracketMatcher {
    set: BracketSet,
}

impl BracketMatcher {
    /// Create a matcher over the given marker set.
    pub fn new(set: BracketSet) -> Self {
        Self { set }
    }

    /// The recognized marker set.
    pub fn set(&self) -> &BracketSet {
        &self.set
    }

    /// Find the pair to highlight for a caret position.
    ///
    /// - Caret on an opening marker: scan forward for its partner.
    /// - Caret on, or immediately after, a closing marker: scan backward.
    /// - Otherwise: the innermost pair enclosing the caret.
    ///
    /// Returns `None` when the scan reaches the document start/end without
    /// finding a counterpart.
    pub fn match_at(&self, snapshot: &TextSnapshot, caret: usize) -> Option<BracketPair> {
        let len = snapshot.len_chars();
        if len == 0 {
            return None;
        }
        let caret = caret.min(len);

        if let Some(ch) = snapshot.char_at(caret) {
            if let Some(kind) = self.set.kind_opened_by(ch) {
                let close = find_forward(snapshot, caret, kind)?;
                return Some(self.pair(snapshot, caret, close, kind));
            }
            if let Some(kind) = self.set.kind_closed_by(ch) {
                let open = find_backward(snapshot, caret, kind)?;
                return Some(self.pair(snapshot, open, caret, kind));
            }
        }

        // Typing position just after a closing marker.
        if caret > 0 {
            if let Some(ch) = snapshot.char_at(caret - 1) {
                if let Some(kind) = self.set.kind_closed_by(ch) {
                    let open = find_backward(snapshot, caret - 1, kind)?;
                    return Some(self.pair(snapshot, open, caret - 1, kind));
                }
            }
        }

        self.enclosing(snapshot, caret)
    }

    /// The innermost pair strictly enclosing the caret, if any.
    fn enclosing(&self, snapshot: &TextSnapshot, caret: usize) -> Option<BracketPair> {
        let mut best: Option<(usize, usize, BracketKind)> = None;

        for kind in self.set.kinds.iter().copied() {
            let Some(open) = nearest_unbalanced_open(snapshot, caret, kind) else {
                continue;
            };
            let Some(close) = find_forward(snapshot, open, kind) else {
                continue;
            };
            if close < caret {
                continue;
            }
            // Innermost wins across kinds.
            if best.is_none_or(|(best_open, _, _)| open > best_open) {
                best = Some((open, close, kind));
            }
        }

        let (open, close, kind) = best?;
        Some(self.pair(snapshot, open, close, kind))
    }

    fn pair(
        &self,
        snapshot: &TextSnapshot,
        open: usize,
        close: usize,
        kind: BracketKind,
    ) -> BracketPair {
        BracketPair {
            open: Span::new(open, open + 1),
            close: Span::new(close, close + 1),
            depth: depth_above(snapshot, open, kind),
        }
    }
}

/// Index of the closing marker matching the opener at `open`, skipping nested
/// pairs of the same kind.
fn find_forward(snapshot: &TextSnapshot, open: usize, kind: BracketKind) -> Option<usize> {
    let mut depth = 0usize;
    let mut index = open + 1;
    for ch in snapshot.rope().chars_at(open + 1) {
        if ch == kind.open {
            depth += 1;
        } else if ch == kind.close {
            if depth == 0 {
                return Some(index);
            }
            depth -= 1;
        }
        index += 1;
    }
    None
}

/// Index of the opening marker matching the closer at `close`, skipping nested
/// pairs of the same kind.
fn find_backward(snapshot: &TextSnapshot, close: usize, kind: BracketKind) -> Option<usize> {
    let mut depth = 0usize;
    let mut index = close;
    let mut chars = snapshot.rope().chars_at(close);
    while let Some(ch) = chars.prev() {
        index -= 1;
        if ch == kind.close {
            depth += 1;
        } else if ch == kind.open {
            if depth == 0 {
                return Some(index);
            }
            depth -= 1;
        }
    }
    None
}

/// The nearest opener before `caret` with no matching closer before `caret`.
fn nearest_unbalanced_open(
    snapshot: &TextSnapshot,
    caret: usize,
    kind: BracketKind,
) -> Option<usize> {
    let mut pending_closers = 0usize;
    let mut index = caret;
    let mut chars = snapshot.rope().chars_at(caret);
    while let Some(ch) = chars.prev() {
        index -= 1;
        if ch == kind.close {
            pending_closers += 1;
        } else if ch == kind.open {
            if pending_closers == 0 {
                return Some(index);
            }
            pending_closers -= 1;
        }
    }
    None
}

/// Number of unbalanced same-kind openers before `open` (nesting depth of the
/// pair starting there).
fn depth_above(snapshot: &TextSnapshot, open: usize, kind: BracketKind) -> usize {
    let mut depth = 0usize;
    let mut pending_closers = 0usize;
    let mut chars = snapshot.rope().chars_at(open);
    while let Some(ch) = chars.prev() {
        if ch == kind.close {
            pending_closers += 1;
        } else if ch == kind.open {
            if pending_closers == 0 {
                depth += 1;
            } else {
                pending_closers -= 1;
            }
        }
    }
    depth
}
