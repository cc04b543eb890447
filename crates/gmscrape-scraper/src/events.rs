//! Progress events emitted by a running session.

use std::path::PathBuf;

use gmscrape_core::ResultRecord;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeEvent {
    Started {
        query: String,
        location: String,
    },
    ListingsFound {
        available: usize,
        selected: usize,
    },
    /// Fraction in `0.0..=1.0` of the scroll steps done.
    ScrollProgress {
        fraction: f32,
    },
    ItemExtracted {
        record: ResultRecord,
        running_total: usize,
    },
    /// `index` is the 1-based position of the candidate.
    ItemSkipped {
        index: usize,
        reason: String,
    },
    Flushed {
        bundle_path: PathBuf,
        total_written: usize,
        with_phone: usize,
    },
    FlushFailed {
        reason: String,
    },
    Completed {
        final_count: usize,
    },
    Cancelled {
        final_count: usize,
    },
    Failed {
        reason: String,
    },
}

impl ScrapeEvent {
    /// Whether this event ends the stream for its session.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Cancelled { .. } | Self::Failed { .. }
        )
    }
}

/// Receives events from the session worker. Implementations must tolerate
/// being called from a task other than the consumer's.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ScrapeEvent);
}

impl ProgressSink for UnboundedSender<ScrapeEvent> {
    fn emit(&self, event: ScrapeEvent) {
        // A dropped receiver means nobody is listening anymore.
        let _ = self.send(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ScrapeEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_events() {
        assert!(ScrapeEvent::Completed { final_count: 0 }.is_terminal());
        assert!(ScrapeEvent::Cancelled { final_count: 1 }.is_terminal());
        assert!(ScrapeEvent::Failed { reason: "x".into() }.is_terminal());
        assert!(!ScrapeEvent::FlushFailed { reason: "x".into() }.is_terminal());
        assert!(!ScrapeEvent::ScrollProgress { fraction: 1.0 }.is_terminal());
    }

    #[tokio::test]
    async fn channel_sink_survives_dropped_receiver() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.emit(ScrapeEvent::Completed { final_count: 2 });
        assert_eq!(rx.recv().await, Some(ScrapeEvent::Completed { final_count: 2 }));

        drop(rx);
        tx.emit(ScrapeEvent::Completed { final_count: 3 });
    }
}
