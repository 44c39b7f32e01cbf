//! The structural analysis engine facade.
//!
//! [`StructureEngine`] wires a snapshot feed, a scanner, the structure store,
//! and the debounce scheduler into one per-document unit, and exposes the
//! query surface consumed by a tag/rendering layer: fold region queries,
//! bracket pair lookup, and structural change notifications.

use crate::buffer::SnapshotFeed;
use crate::scheduler::{SchedulerConfig, run_scan_loop};
use outline_core::{
    BracketMatcher, BracketPair, BracketSet, OutlineScanner, RegionMarker, Span, StructureScanner,
    StructureStore,
};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Notification that a new region set was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureChange {
    /// Affected span; the wholesale-replace design always reports the full
    /// document span.
    pub span: Span,
    /// Version of the snapshot the new region set was computed against.
    pub version: u64,
}

/// A fold region resolved for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldTag {
    /// The foldable span.
    pub span: Span,
    /// Text of the opening line, shown on the collapse header.
    pub header_text: String,
    /// Full region text, shown as hover/preview when collapsed.
    pub preview_text: String,
}

/// Engine configuration: grammar options plus scheduling policy.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Region-start marker for the outline grammar.
    pub marker: RegionMarker,
    /// Marker pairs recognized by the bracket matcher.
    pub brackets: BracketSet,
    /// Debounce timing.
    pub scheduler: SchedulerConfig,
}

impl EngineConfig {
    /// Override the region-start marker.
    pub fn with_marker(mut self, marker: RegionMarker) -> Self {
        self.marker = marker;
        self
    }

    /// Override the bracket marker set.
    pub fn with_brackets(mut self, brackets: BracketSet) -> Self {
        self.brackets = brackets;
        self
    }

    /// Override the scan interval.
    pub fn with_scan_interval(mut self, interval: std::time::Duration) -> Self {
        self.scheduler = SchedulerConfig::new(interval);
        self
    }
}

/// Per-document structural analysis engine.
///
/// One instance per open document. Dropping the engine (or calling
/// [`StructureEngine::shutdown`]) cancels the background task and releases the
/// feed subscription, so a closed document is never re-analyzed.
pub struct StructureEngine {
    store: Arc<StructureStore>,
    feed: SnapshotFeed,
    brackets: BracketMatcher,
    events: broadcast::Sender<StructureChange>,
    cancel: CancellationToken,
}

impl StructureEngine {
    /// Spawn an engine with the built-in line grammar.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(feed: SnapshotFeed, config: EngineConfig) -> Self {
        let scanner = OutlineScanner::new(config.marker.clone());
        Self::spawn_with_scanner(feed, scanner, config)
    }

    /// Spawn an engine with a custom scanner.
    ///
    /// One scan runs synchronously before the background task starts, so
    /// consumers never observe an unscanned store. If that initial scan fails
    /// the scheduler starts dirty and retries on its first tick.
    pub fn spawn_with_scanner<S>(feed: SnapshotFeed, scanner: S, config: EngineConfig) -> Self
    where
        S: StructureScanner + Send + 'static,
        S::Error: Display,
    {
        // The task's subscription is created before the initial snapshot is
        // taken, so an edit landing in between is either included in the
        // initial scan or still pending on the task's feed.
        let task_feed = feed.clone();
        let initial = feed.borrow().clone();
        let store = Arc::new(StructureStore::new(initial.clone()));
        let initial_dirty = match scanner.scan(&initial) {
            Ok(regions) => {
                store.replace(initial, regions);
                false
            }
            Err(error) => {
                tracing::warn!(version = initial.version(), %error, "initial structure scan failed");
                true
            }
        };

        let (events, _) = broadcast::channel(16);
        let cancel = CancellationToken::new();
        tokio::spawn(run_scan_loop(
            task_feed,
            scanner,
            Arc::clone(&store),
            events.clone(),
            config.scheduler.clone(),
            cancel.clone(),
            initial_dirty,
        ));

        Self {
            store,
            feed,
            brackets: BracketMatcher::new(config.brackets),
            events,
            cancel,
        }
    }

    /// The engine's structure store.
    pub fn store(&self) -> Arc<StructureStore> {
        Arc::clone(&self.store)
    }

    /// Fold regions overlapping a visible span, resolved for rendering.
    ///
    /// Answered from the last published `(snapshot, regions)` pair; the span
    /// may originate against an older snapshot and is translated first.
    pub fn fold_regions(&self, span: Span) -> Vec<FoldTag> {
        let model = self.store.model();
        self.store
            .query_span(span)
            .into_iter()
            .map(|region| FoldTag {
                span: region.span(),
                header_text: region.header_text(&model.snapshot),
                preview_text: region.preview_text(&model.snapshot),
            })
            .collect()
    }

    /// The bracket pair to highlight for a caret position.
    ///
    /// Synchronous and undebounced: runs against the latest snapshot from the
    /// feed (not the last scanned one), confined to this document's buffer.
    pub fn bracket_pair_at(&self, caret: usize) -> Option<BracketPair> {
        let snapshot = self.feed.borrow().clone();
        self.brackets.match_at(&snapshot, caret)
    }

    /// Subscribe to structural change notifications.
    ///
    /// One notification fires after every successful background scan.
    pub fn subscribe(&self) -> broadcast::Receiver<StructureChange> {
        self.events.subscribe()
    }

    /// Version of the snapshot the published region set was computed against.
    pub fn analyzed_version(&self) -> u64 {
        self.store.version()
    }

    /// Stop the background task. Idempotent; also invoked on drop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for StructureEngine {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
