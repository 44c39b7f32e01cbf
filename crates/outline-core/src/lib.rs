#![warn(missing_docs)]
//! Outline Core - Incremental Structural Analysis for Editor Buffers
//!
//! # Overview
//!
//! `outline-core` computes two derived structural views of a live document for
//! an editor frontend: foldable outline regions and matching bracket pairs.
//! It is headless and runtime-free: all analysis runs against immutable,
//! versioned [`TextSnapshot`]s, and results are published atomically so
//! rendering-path readers never observe a half-updated state. The companion
//! crate `outline-core-engine` adds the debounced background re-scan loop.
//!
//! # Core pieces
//!
//! - **Snapshot model**: [`TextSnapshot`] / [`Span`] — immutable text states
//!   with cheap cloning, line enumeration, and span translation between
//!   snapshot versions
//! - **Region scanner**: [`OutlineScanner`] — pure single-pass line grammar
//!   producing [`OutlineRegion`]s (configurable [`RegionMarker`], default `[`)
//! - **Structure store**: [`StructureStore`] — one atomic
//!   `(snapshot, regions)` pair with viewport overlap queries
//! - **Bracket matcher**: [`BracketMatcher`] — on-demand, depth-aware pair
//!   matching for caret highlighting
//!
//! # Quick Start
//!
//! ```rust
//! use outline_core::{OutlineScanner, StructureStore, TextSnapshot};
//!
//! let snapshot = TextSnapshot::new("[section\nbody\n\nplain");
//! let regions = OutlineScanner::default().scan(&snapshot);
//!
//! let store = StructureStore::new(snapshot.clone());
//! store.replace(snapshot, regions);
//!
//! // A viewport-limited consumer asks only for what it renders.
//! let visible = store.query_lines(0, 1);
//! assert_eq!(visible.len(), 1);
//! ```
//!
//! # Module Description
//!
//! - [`snapshot`] - immutable versioned text snapshots and spans
//! - [`region`] - outline regions, the line grammar, and the scanner trait
//! - [`store`] - atomic structure store with overlap queries
//! - [`bracket`] - bracket pair matching

pub mod bracket;
pub mod region;
pub mod snapshot;
pub mod store;

pub use bracket::{BracketKind, BracketMatcher, BracketPair, BracketSet};
pub use region::{OutlineRegion, OutlineScanner, RegionMarker, StructureScanner};
pub use snapshot::{SnapshotLine, Span, TextSnapshot};
pub use store::{StructureModel, StructureStore};
