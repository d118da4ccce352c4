//! Bounded metric queues
//!
//! The only hand-off primitive between units of work. A push never blocks:
//! when the queue is full the newest metric is dropped and counted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::Metric;

/// Reason a push was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PushError {
    /// Queue at capacity, metric dropped
    #[error("queue full")]
    Full,
    /// Consumer gone, metric dropped
    #[error("queue closed")]
    Closed,
}

/// Create a bounded metric queue
///
/// `name` identifies the queue in logs. A capacity of 0 is raised to 1.
pub fn metric_queue(name: impl Into<String>, capacity: usize) -> (MetricQueue, MetricReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let queue = MetricQueue {
        name: Arc::from(name.into()),
        tx,
        dropped: Arc::new(AtomicU64::new(0)),
    };
    (queue, MetricReceiver { rx })
}

/// Producer half of a metric queue
#[derive(Debug, Clone)]
pub struct MetricQueue {
    name: Arc<str>,
    tx: mpsc::Sender<Metric>,
    dropped: Arc<AtomicU64>,
}

impl MetricQueue {
    /// Queue name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Push a metric without waiting
    pub fn push(&self, metric: Metric) -> Result<(), PushError> {
        match self.tx.try_send(metric) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(m)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(queue = %self.name, metric = m.name(), "Queue full, metric dropped");
                Err(PushError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(m)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                error!(queue = %self.name, metric = m.name(), "Queue closed, metric dropped");
                Err(PushError::Closed)
            }
        }
    }

    /// Metrics dropped on this queue so far
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Free slots right now
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    /// Metrics waiting in the queue
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the consumer half is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half of a metric queue (single consumer)
#[derive(Debug)]
pub struct MetricReceiver {
    rx: mpsc::Receiver<Metric>,
}

impl MetricReceiver {
    /// Wait for the next metric; `None` once every producer is dropped
    pub async fn recv(&mut self) -> Option<Metric> {
        self.rx.recv().await
    }

    /// Take a metric if one is ready
    pub fn try_recv(&mut self) -> Option<Metric> {
        self.rx.try_recv().ok()
    }

    /// Metrics currently queued
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_and_recv() {
        let (queue, mut rx) = metric_queue("test", 4);
        queue.push(Metric::gauge("a", 1.0).unwrap()).unwrap();
        queue.push(Metric::gauge("b", 2.0).unwrap()).unwrap();

        assert_eq!(rx.len(), 2);
        assert_eq!(queue.len(), 2);
        assert_eq!(rx.recv().await.unwrap().name(), "a");
        assert_eq!(rx.recv().await.unwrap().name(), "b");
    }

    #[tokio::test]
    async fn test_full_queue_drops_newest() {
        let (queue, mut rx) = metric_queue("small", 1);
        queue.push(Metric::gauge("kept", 1.0).unwrap()).unwrap();

        let result = queue.push(Metric::gauge("dropped", 2.0).unwrap());
        assert_eq!(result, Err(PushError::Full));
        assert_eq!(queue.dropped_count(), 1);

        assert_eq!(rx.recv().await.unwrap().name(), "kept");
        assert!(rx.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let (queue, rx) = metric_queue("gone", 2);
        drop(rx);

        assert!(queue.is_closed());
        let result = queue.push(Metric::gauge("late", 1.0).unwrap());
        assert_eq!(result, Err(PushError::Closed));
    }

    #[tokio::test]
    async fn test_recv_ends_when_producers_dropped() {
        let (queue, mut rx) = metric_queue("end", 2);
        drop(queue);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let (queue, _rx) = metric_queue("zero", 0);
        assert_eq!(queue.capacity(), 1);
    }
}
