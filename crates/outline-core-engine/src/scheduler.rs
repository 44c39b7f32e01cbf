//! Debounced scan scheduling.
//!
//! One background task per document coalesces arbitrarily frequent change
//! notifications into a bounded re-scan rate: a change only marks the document
//! dirty, and a fixed-interval tick performs at most one scan, always against
//! the latest snapshot at scan time. The scan runs inline in the task, so the
//! timer cannot fire mid-scan and two scans can never overlap; after each scan
//! the interval is reset so the next tick is a full period away.

use crate::engine::StructureChange;
use outline_core::{StructureScanner, StructureStore, TextSnapshot};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Timing policy for background re-analysis.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Fixed tick interval between potential scans.
    pub scan_interval: Duration,
}

impl SchedulerConfig {
    /// Create a config with an explicit tick interval.
    pub fn new(scan_interval: Duration) -> Self {
        Self { scan_interval }
    }
}

impl Default for SchedulerConfig {
    /// One scan per second at most.
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

/// The scheduler loop. Runs until cancelled or until the snapshot feed's
/// sender is dropped.
///
/// `dirty` starts set when the caller's initial synchronous scan failed, so
/// the first tick retries instead of waiting for another edit.
pub(crate) async fn run_scan_loop<S>(
    mut feed: watch::Receiver<TextSnapshot>,
    scanner: S,
    store: Arc<StructureStore>,
    events: broadcast::Sender<StructureChange>,
    config: SchedulerConfig,
    cancel: CancellationToken,
    mut dirty: bool,
) where
    S: StructureScanner,
    S::Error: Display,
{
    // First tick one full interval after startup; the caller already scanned
    // the initial snapshot synchronously.
    let mut interval = tokio::time::interval_at(
        tokio::time::Instant::now() + config.scan_interval,
        config.scan_interval,
    );
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            // Only polled while clean: once dirty, further notifications are
            // absorbed by taking the latest snapshot at scan time.
            changed = feed.changed(), if !dirty => {
                if changed.is_err() {
                    // Buffer gone; nothing left to analyze.
                    break;
                }
                dirty = true;
            }

            _ = interval.tick() => {
                if !dirty {
                    continue;
                }

                // Taking the snapshot marks the feed as seen up to here;
                // edits landing while the scan runs re-trigger `changed()`
                // afterwards, guaranteeing a follow-up scan.
                let snapshot = feed.borrow_and_update().clone();
                dirty = false;

                match scanner.scan(&snapshot) {
                    Ok(regions) => {
                        debug!(
                            version = snapshot.version(),
                            regions = regions.len(),
                            "structure scan complete"
                        );
                        let change = StructureChange {
                            span: snapshot.full_span(),
                            version: snapshot.version(),
                        };
                        store.replace(snapshot, regions);
                        let _ = events.send(change);
                    }
                    Err(error) => {
                        // Re-arm immediately so edits made during the fault
                        // window still get analyzed on the next tick.
                        warn!(version = snapshot.version(), %error, "structure scan failed");
                        dirty = true;
                    }
                }

                // The next tick is a full interval after this scan finished.
                interval.reset();
            }
        }
    }
}
