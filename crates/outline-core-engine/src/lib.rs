#![warn(missing_docs)]
//! `outline-core-engine` - Debounced background re-analysis for `outline-core`.
//!
//! Glues a document's snapshot feed to the structural analysis in
//! `outline-core`: edits mark the document dirty, a fixed-interval scheduler
//! re-scans against the latest snapshot (never more than one scan in flight),
//! and results are published atomically for the rendering layer to query.
//! Bracket pair lookup stays synchronous and undebounced since it is cheap
//! enough for the caret path.
//!
//! ```rust
//! use outline_core::Span;
//! use outline_core_engine::{EngineConfig, SharedTextBuffer, StructureEngine};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let buffer = SharedTextBuffer::new("[section\nbody");
//! let engine = StructureEngine::spawn(buffer.subscribe(), EngineConfig::default());
//!
//! // The initial scan runs before spawn returns.
//! let folds = engine.fold_regions(Span::new(0, 13));
//! assert_eq!(folds[0].header_text, "[section");
//! # }
//! ```

mod buffer;
mod engine;
mod scheduler;

pub use buffer::{SharedTextBuffer, SnapshotFeed};
pub use engine::{EngineConfig, FoldTag, StructureChange, StructureEngine};
pub use scheduler::SchedulerConfig;
