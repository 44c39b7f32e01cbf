//! Atomic `(snapshot, regions)` store with viewport overlap queries.

use crate::region::OutlineRegion;
use crate::snapshot::{Span, TextSnapshot};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// One complete analysis result: a region set plus the snapshot it was
/// computed against.
///
/// The two always travel together; regions are meaningless in any other
/// snapshot's coordinate space.
#[derive(Debug, Clone)]
pub struct StructureModel {
    /// The snapshot the regions were scanned from.
    pub snapshot: TextSnapshot,
    /// The complete region set, ordered by ascending start offset.
    pub regions: Vec<OutlineRegion>,
}

/// Holds the current [`StructureModel`] and answers overlap queries.
///
/// Single-writer / multi-reader: [`StructureStore::replace`] is the only
/// mutator and swaps the whole model atomically, so a concurrent query
/// observes either the previous complete pair or the new complete pair, never
/// a mixture.
#[derive(Debug)]
pub struct StructureStore {
    model: ArcSwap<StructureModel>,
}

impl StructureStore {
    /// Create a store for a snapshot with no regions yet.
    pub fn new(snapshot: TextSnapshot) -> Self {
        Self {
            model: ArcSwap::from_pointee(StructureModel {
                snapshot,
                regions: Vec::new(),
            }),
        }
    }

    /// The current model.
    pub fn model(&self) -> Arc<StructureModel> {
        self.model.load_full()
    }

    /// Version of the snapshot the current region set was computed against.
    pub fn version(&self) -> u64 {
        self.model.load().snapshot.version()
    }

    /// Atomically replace the model with a freshly scanned pair.
    pub fn replace(&self, snapshot: TextSnapshot, regions: Vec<OutlineRegion>) {
        self.model
            .store(Arc::new(StructureModel { snapshot, regions }));
    }

    /// Regions intersecting the inclusive line interval
    /// `[start_line, end_line]`.
    pub fn query_lines(&self, start_line: usize, end_line: usize) -> Vec<OutlineRegion> {
        self.model
            .load()
            .regions
            .iter()
            .filter(|region| region.overlaps_lines(start_line, end_line))
            .copied()
            .collect()
    }

    /// Regions intersecting a char-offset span.
    ///
    /// The span may originate against an older snapshot; it is translated into
    /// the current snapshot's coordinate space before the line interval is
    /// derived. A span lying entirely beyond the current document is stale and
    /// yields an empty result rather than an error.
    pub fn query_span(&self, span: Span) -> Vec<OutlineRegion> {
        let model = self.model.load();
        let snapshot = &model.snapshot;

        if span.start > snapshot.len_chars() {
            return Vec::new();
        }

        let span = snapshot.translate(span);
        let start_line = snapshot.line_index_at(span.start);
        let end_line = snapshot.line_index_at(span.end);

        model
            .regions
            .iter()
            .filter(|region| region.overlaps_lines(start_line, end_line))
            .copied()
            .collect()
    }
}
