//! In-process text buffer publishing a feed of immutable snapshots.
//!
//! The engine consumes a host buffer only through its snapshot feed: a
//! [`tokio::sync::watch`] channel whose latest value is always the current
//! snapshot. Editor hosts with their own buffer implementation publish into a
//! channel of their own; [`SharedTextBuffer`] is the in-memory implementation
//! used by tests and embedders without a host buffer.

use outline_core::{Span, TextSnapshot};
use tokio::sync::watch;

/// Receiving end of a buffer's snapshot feed.
///
/// `borrow()` yields the current snapshot; `changed()` resolves once a newer
/// snapshot has been committed.
pub type SnapshotFeed = watch::Receiver<TextSnapshot>;

/// Thread-safe in-memory text buffer.
///
/// Every committed edit produces a new [`TextSnapshot`] with the next version
/// and publishes it to all feed subscribers. Edits are serialized by the
/// channel, so versions stay strictly monotonic even under concurrent callers.
#[derive(Debug)]
pub struct SharedTextBuffer {
    tx: watch::Sender<TextSnapshot>,
}

impl SharedTextBuffer {
    /// Create a buffer with initial text (snapshot version 0).
    pub fn new(text: &str) -> Self {
        let (tx, _rx) = watch::channel(TextSnapshot::new(text));
        Self { tx }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> TextSnapshot {
        self.tx.borrow().clone()
    }

    /// Subscribe to the snapshot feed.
    ///
    /// The subscription sees every commit made after this call; the current
    /// snapshot is available immediately via `borrow()`.
    pub fn subscribe(&self) -> SnapshotFeed {
        self.tx.subscribe()
    }

    /// Replace `span` with `text`, committing and publishing a new snapshot.
    pub fn replace(&self, span: Span, text: &str) -> TextSnapshot {
        let mut committed = None;
        self.tx.send_modify(|current| {
            let next = current.edit(span, text);
            committed = Some(next.clone());
            *current = next;
        });
        committed.unwrap_or_else(|| self.snapshot())
    }

    /// Replace the whole document text.
    pub fn set_text(&self, text: &str) -> TextSnapshot {
        let span = self.snapshot().full_span();
        self.replace(span, text)
    }

    /// Insert `text` at a char offset.
    pub fn insert(&self, offset: usize, text: &str) -> TextSnapshot {
        self.replace(Span::new(offset, offset), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_bump_versions_monotonically() {
        let buffer = SharedTextBuffer::new("hello");
        assert_eq!(buffer.snapshot().version(), 0);

        let v1 = buffer.insert(5, " world");
        assert_eq!(v1.version(), 1);
        assert_eq!(v1.text(), "hello world");

        let v2 = buffer.replace(Span::new(0, 5), "goodbye");
        assert_eq!(v2.version(), 2);
        assert_eq!(buffer.snapshot().text(), "goodbye world");
    }

    #[test]
    fn test_set_text_replaces_everything() {
        let buffer = SharedTextBuffer::new("old content");
        buffer.set_text("new");
        assert_eq!(buffer.snapshot().text(), "new");
    }

    #[tokio::test]
    async fn test_feed_sees_commits() {
        let buffer = SharedTextBuffer::new("a");
        let mut feed = buffer.subscribe();

        buffer.insert(1, "b");
        feed.changed().await.unwrap();
        assert_eq!(feed.borrow_and_update().text(), "ab");
    }
}
