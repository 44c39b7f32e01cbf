//! Scheduling behavior of the structural analysis engine, under a paused
//! clock so debounce timing is deterministic.

use outline_core::{OutlineRegion, OutlineScanner, Span, StructureScanner, TextSnapshot};
use outline_core_engine::{EngineConfig, SharedTextBuffer, StructureEngine};
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;

/// Fails the first `failures_left` scans, then behaves normally.
struct FlakyScanner {
    failures_left: AtomicUsize,
    attempts: Arc<AtomicUsize>,
    inner: OutlineScanner,
}

impl FlakyScanner {
    fn new(failures: usize, attempts: Arc<AtomicUsize>) -> Self {
        Self {
            failures_left: AtomicUsize::new(failures),
            attempts,
            inner: OutlineScanner::default(),
        }
    }
}

impl StructureScanner for FlakyScanner {
    type Error = String;

    fn scan(&self, snapshot: &TextSnapshot) -> Result<Vec<OutlineRegion>, Self::Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err("induced scan failure".to_string());
        }
        Ok(self.inner.scan(snapshot))
    }
}

/// Commits a buffer edit from inside `scan`, simulating a change that arrives
/// while a scan is in flight.
struct ReentrantScanner {
    buffer: Arc<SharedTextBuffer>,
    edits_left: AtomicUsize,
    inner: OutlineScanner,
}

impl StructureScanner for ReentrantScanner {
    type Error = Infallible;

    fn scan(&self, snapshot: &TextSnapshot) -> Result<Vec<OutlineRegion>, Self::Error> {
        if self
            .edits_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            self.buffer.insert(0, "x");
        }
        Ok(self.inner.scan(snapshot))
    }
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_coalesce_into_one_scan() {
    let buffer = SharedTextBuffer::new("");
    let engine = StructureEngine::spawn(buffer.subscribe(), EngineConfig::default());
    let mut events = engine.subscribe();

    // A burst of edits, all well within one tick interval.
    for i in 0..5 {
        buffer.set_text(&format!("[section {i}\nbody"));
    }

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let change = events.try_recv().expect("one scan after the tick");
    assert_eq!(change.version, 5, "scan must use the latest snapshot");
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    // Nothing changed since: further ticks are no-ops.
    tokio::time::sleep(Duration::from_millis(3000)).await;
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    assert_eq!(engine.analyzed_version(), 5);
}

#[tokio::test(start_paused = true)]
async fn edit_during_scan_triggers_follow_up_scan() {
    let buffer = Arc::new(SharedTextBuffer::new("[a\nb"));
    let scanner = ReentrantScanner {
        buffer: Arc::clone(&buffer),
        edits_left: AtomicUsize::new(1),
        inner: OutlineScanner::default(),
    };

    // The initial synchronous scan commits an edit mid-flight.
    let engine =
        StructureEngine::spawn_with_scanner(buffer.subscribe(), scanner, EngineConfig::default());
    let mut events = engine.subscribe();
    assert_eq!(engine.analyzed_version(), 0);

    // The mid-scan edit must not be lost: a follow-up scan picks it up.
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let change = events.try_recv().expect("follow-up scan after in-flight edit");
    assert_eq!(change.version, 1);
    assert_eq!(engine.analyzed_version(), 1);
    assert_eq!(engine.store().model().snapshot.text(), "x[a\nb");
}

#[tokio::test(start_paused = true)]
async fn scan_failure_rearms_and_recovers() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let buffer = SharedTextBuffer::new("[header\nbody");
    let scanner = FlakyScanner::new(2, Arc::clone(&attempts));

    let engine =
        StructureEngine::spawn_with_scanner(buffer.subscribe(), scanner, EngineConfig::default());
    let mut events = engine.subscribe();

    // Initial scan failed; the store still answers (empty) instead of crashing.
    assert!(engine.fold_regions(Span::new(0, 12)).is_empty());

    // No further edits are made: recovery must come from re-arming alone.
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    let change = events.try_recv().expect("successful scan after recovery");
    assert_eq!(change.version, 0);
    assert_eq!(engine.fold_regions(Span::new(0, 12)).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn fold_and_bracket_queries() {
    let buffer = SharedTextBuffer::new("[alpha\nbody\n\n(x [y] z)");
    let engine = StructureEngine::spawn(buffer.subscribe(), EngineConfig::default());

    let folds = engine.fold_regions(Span::new(0, 22));
    assert_eq!(folds.len(), 1);
    assert_eq!(folds[0].header_text, "[alpha");
    assert_eq!(folds[0].preview_text, "[alpha\nbody");

    // Outer '(' at offset 13 pairs with the final ')', skipping the nested
    // '[y]'.
    let pair = engine.bracket_pair_at(13).expect("bracket pair");
    assert_eq!(pair.open, Span::new(13, 14));
    assert_eq!(pair.close, Span::new(21, 22));

    // Bracket matching is undebounced: it sees a fresh edit immediately,
    // before any re-scan has run.
    buffer.insert(14, "()");
    let pair = engine.bracket_pair_at(14).expect("pair in fresh snapshot");
    assert_eq!(pair.open, Span::new(14, 15));
    assert_eq!(pair.close, Span::new(15, 16));
    assert_eq!(engine.analyzed_version(), 0, "outline not re-scanned yet");
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_background_task() {
    let buffer = SharedTextBuffer::new("[a\nb");
    let engine = StructureEngine::spawn(buffer.subscribe(), EngineConfig::default());
    let mut events = engine.subscribe();

    drop(engine);
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Edits on a disposed document are ignored; no scan ever fires again.
    buffer.set_text("[changed\nbody");
    tokio::time::sleep(Duration::from_millis(3000)).await;
    assert!(matches!(events.try_recv(), Err(TryRecvError::Closed)));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_buffer_ends_the_loop() {
    let buffer = SharedTextBuffer::new("[a\nb");
    let engine = StructureEngine::spawn(buffer.subscribe(), EngineConfig::default());
    let mut events = engine.subscribe();

    drop(buffer);
    tokio::time::sleep(Duration::from_millis(1100)).await;

    // The task exited; only the engine's own event handle remains.
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    drop(engine);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Closed)));
}

#[tokio::test(start_paused = true)]
async fn custom_scan_interval_is_honored() {
    let buffer = SharedTextBuffer::new("");
    let engine = StructureEngine::spawn(
        buffer.subscribe(),
        EngineConfig::default().with_scan_interval(Duration::from_millis(100)),
    );
    let mut events = engine.subscribe();

    buffer.set_text("[s\nbody");
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(events.try_recv().is_ok());
}
