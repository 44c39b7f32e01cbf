//! Line-based outline regions and the region scanner.
//!
//! The grammar is deliberately simple: a line whose first non-whitespace
//! character is the configured marker opens a region, and the region extends
//! until the line before the next blank line, the line before the next marker
//! line, or the last non-blank line of the document. Only one region is open
//! at a time; hierarchical folding would generalize the single `current`
//! slot into a stack of open regions keyed by marker depth, and is an
//! extension point rather than implemented behavior.

use crate::snapshot::{Span, TextSnapshot};
use regex::Regex;
use std::convert::Infallible;

/// A foldable structural range spanning two or more lines.
///
/// A region is computed relative to exactly one [`TextSnapshot`] and becomes
/// stale when a newer snapshot exists; resolve its text through the snapshot
/// it was scanned from (the one stored alongside it in the structure store).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineRegion {
    /// Line index of the opening line.
    pub start_line: usize,
    /// Char offset of the start of the opening line.
    pub start_offset: usize,
    /// Line index of the closing line (inclusive).
    pub end_line: usize,
    /// Char offset of the end of the closing line (line break excluded).
    pub end_offset: usize,
}

impl OutlineRegion {
    /// The full region as a char-offset span.
    pub fn span(&self) -> Span {
        Span::new(self.start_offset, self.end_offset)
    }

    /// Text of the line that opened the region (shown on the collapse header).
    pub fn header_text(&self, snapshot: &TextSnapshot) -> String {
        snapshot
            .line(self.start_line)
            .map(|line| line.text)
            .unwrap_or_default()
    }

    /// Full region text (shown as hover/preview when collapsed).
    pub fn preview_text(&self, snapshot: &TextSnapshot) -> String {
        snapshot.text_in(self.span())
    }

    /// Whether the region intersects the inclusive line interval
    /// `[start_line, end_line]`.
    pub fn overlaps_lines(&self, start_line: usize, end_line: usize) -> bool {
        self.start_line <= end_line && self.end_line >= start_line
    }
}

/// Recognizer for lines that open an outline region.
///
/// The marker is tested against the line after leading whitespace is stripped;
/// blank lines never open a region.
#[derive(Debug, Clone)]
pub enum RegionMarker {
    /// The first non-whitespace character of the line equals the marker.
    Char(char),
    /// The pattern matches at the start of the trimmed line.
    Pattern(Regex),
}

impl RegionMarker {
    /// Build a pattern marker from a regex source string.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    /// Whether a line opens a region under this marker.
    pub fn opens(&self, line_text: &str) -> bool {
        let trimmed = line_text.trim_start();
        if trimmed.is_empty() {
            return false;
        }
        match self {
            Self::Char(marker) => trimmed.starts_with(*marker),
            Self::Pattern(regex) => regex.find(trimmed).is_some_and(|m| m.start() == 0),
        }
    }
}

impl Default for RegionMarker {
    fn default() -> Self {
        Self::Char('[')
    }
}

/// Computes derived outline structure for one snapshot.
///
/// The built-in [`OutlineScanner`] cannot fail, but external providers
/// (language services, external indexers) can; the scan scheduler recovers
/// from `Err` by re-marking the document dirty and retrying on a later tick.
pub trait StructureScanner {
    /// The error type returned by [`StructureScanner::scan`].
    type Error;

    /// Compute the complete region set for `snapshot`.
    ///
    /// Must be pure and deterministic: calling it twice on the same snapshot
    /// yields the same regions.
    fn scan(&self, snapshot: &TextSnapshot) -> Result<Vec<OutlineRegion>, Self::Error>;
}

/// The line-based outline scanner.
#[derive(Debug, Clone, Default)]
pub struct OutlineScanner {
    marker: RegionMarker,
}

impl OutlineScanner {
    /// Create a scanner with the given region-start marker.
    pub fn new(marker: RegionMarker) -> Self {
        Self { marker }
    }

    /// The configured region-start marker.
    pub fn marker(&self) -> &RegionMarker {
        &self.marker
    }

    /// Scan a snapshot into its ordered region set.
    ///
    /// Single pass over the lines, linear in document length. The result is
    /// ordered by ascending start offset (the scan is monotonic over line
    /// order, so no sorting pass is needed) and contains only regions spanning
    /// two or more lines.
    pub fn scan(&self, snapshot: &TextSnapshot) -> Vec<OutlineRegion> {
        let mut regions = Vec::new();
        let mut current: Option<(usize, usize)> = None;
        let mut prev: Option<SnapshotLineEnd> = None;
        let last_line = snapshot.line_count().saturating_sub(1);

        for line in snapshot.lines() {
            let blank = line.is_blank();
            let opens = !blank && self.marker.opens(&line.text);

            if let Some((start_line, start_offset)) = current {
                // End-of-document implicitly closes a dangling region.
                if line.index == last_line && !blank {
                    regions.push(OutlineRegion {
                        start_line,
                        start_offset,
                        end_line: line.index,
                        end_offset: line.end,
                    });
                    current = None;
                    break;
                }

                // A blank or marker line closes the open region at the
                // previous line; the terminator itself is excluded.
                if blank || opens {
                    if let Some(prev) = prev {
                        regions.push(OutlineRegion {
                            start_line,
                            start_offset,
                            end_line: prev.index,
                            end_offset: prev.end,
                        });
                    }
                    current = None;
                }

                // Closing and re-opening are two effects of the same line:
                // a marker line that just terminated a region immediately
                // starts the next one.
                if opens {
                    current = Some((line.index, line.start));
                }
            } else if opens {
                current = Some((line.index, line.start));
            }

            prev = Some(SnapshotLineEnd {
                index: line.index,
                end: line.end,
            });
        }

        // Single-line ranges are not foldable.
        regions.retain(|region| region.end_line > region.start_line);
        regions
    }
}

impl StructureScanner for OutlineScanner {
    type Error = Infallible;

    fn scan(&self, snapshot: &TextSnapshot) -> Result<Vec<OutlineRegion>, Self::Error> {
        Ok(OutlineScanner::scan(self, snapshot))
    }
}

#[derive(Debug, Clone, Copy)]
struct SnapshotLineEnd {
    index: usize,
    end: usize,
}
