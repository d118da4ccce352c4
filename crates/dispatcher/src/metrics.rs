//! Sink metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use contracts::EmitOutcome;

/// Metrics for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Current inbound queue length
    queue_len: AtomicUsize,
    /// Metrics taken off the inbound queue
    received_count: AtomicU64,
    /// Batches delivered
    sent_batches: AtomicU64,
    /// Datapoints delivered
    sent_datapoints: AtomicU64,
    /// Batches not attempted (empty or unconfigured)
    skipped_batches: AtomicU64,
    /// Batches attempted and lost
    failed_batches: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn received_count(&self) -> u64 {
        self.received_count.load(Ordering::Relaxed)
    }

    pub fn inc_received_count(&self) {
        self.received_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent_batches(&self) -> u64 {
        self.sent_batches.load(Ordering::Relaxed)
    }

    pub fn sent_datapoints(&self) -> u64 {
        self.sent_datapoints.load(Ordering::Relaxed)
    }

    pub fn skipped_batches(&self) -> u64 {
        self.skipped_batches.load(Ordering::Relaxed)
    }

    pub fn failed_batches(&self) -> u64 {
        self.failed_batches.load(Ordering::Relaxed)
    }

    /// Account for one emission
    pub fn record_outcome(&self, outcome: &EmitOutcome) {
        match outcome {
            EmitOutcome::Sent(count) => {
                self.sent_batches.fetch_add(1, Ordering::Relaxed);
                self.sent_datapoints
                    .fetch_add(*count as u64, Ordering::Relaxed);
            }
            EmitOutcome::Skipped(_) => {
                self.skipped_batches.fetch_add(1, Ordering::Relaxed);
            }
            EmitOutcome::Failed(_) => {
                self.failed_batches.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Get snapshot of all metrics
    ///
    /// `dropped_count` is owned by the inbound queue and passed in.
    pub fn snapshot(&self, dropped_count: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            received_count: self.received_count(),
            sent_batches: self.sent_batches(),
            sent_datapoints: self.sent_datapoints(),
            skipped_batches: self.skipped_batches(),
            failed_batches: self.failed_batches(),
            dropped_count,
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub received_count: u64,
    pub sent_batches: u64,
    pub sent_datapoints: u64,
    pub skipped_batches: u64,
    pub failed_batches: u64,
    pub dropped_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcome() {
        let metrics = SinkMetrics::new();
        metrics.record_outcome(&EmitOutcome::Sent(3));
        metrics.record_outcome(&EmitOutcome::Sent(2));
        metrics.record_outcome(&EmitOutcome::Skipped("empty".into()));
        metrics.record_outcome(&EmitOutcome::Failed("500".into()));

        let snapshot = metrics.snapshot(4);
        assert_eq!(snapshot.sent_batches, 2);
        assert_eq!(snapshot.sent_datapoints, 5);
        assert_eq!(snapshot.skipped_batches, 1);
        assert_eq!(snapshot.failed_batches, 1);
        assert_eq!(snapshot.dropped_count, 4);
    }
}
