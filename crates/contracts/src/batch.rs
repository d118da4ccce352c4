//! Batch - size- and time-bounded accumulation of converted datapoints
//!
//! Both triggers are re-checked after every single append:
//! - elapsed time since the last flush >= flush interval
//! - batch length >= max batch size
//!
//! Either one drains the batch and resets the flush timestamp.

use std::mem;
use std::time::Duration;

use tokio::time::Instant;

/// In-memory batch of `T` with dual flush trigger
#[derive(Debug)]
pub struct Batch<T> {
    items: Vec<T>,
    max_size: usize,
    flush_interval: Duration,
    last_flush: Instant,
}

impl<T> Batch<T> {
    /// Create an empty batch whose flush clock starts now
    pub fn new(max_size: usize, flush_interval: Duration) -> Self {
        Self::starting_at(max_size, flush_interval, Instant::now())
    }

    /// Create an empty batch whose flush clock starts at `now`
    ///
    /// A `max_size` of 0 is raised to 1.
    pub fn starting_at(max_size: usize, flush_interval: Duration, now: Instant) -> Self {
        let max_size = max_size.max(1);
        Self {
            items: Vec::with_capacity(max_size),
            max_size,
            flush_interval,
            last_flush: now,
        }
    }

    /// Append an item, returning the drained batch if a flush is due
    pub fn push(&mut self, item: T) -> Option<Vec<T>> {
        self.push_at(item, Instant::now())
    }

    /// Append an item at `now`, returning the drained batch if a flush is due
    pub fn push_at(&mut self, item: T, now: Instant) -> Option<Vec<T>> {
        self.items.push(item);
        if self.should_flush(now) {
            Some(self.take(now))
        } else {
            None
        }
    }

    /// Whether either trigger holds at `now`
    pub fn should_flush(&self, now: Instant) -> bool {
        self.interval_elapsed(now) || self.is_full()
    }

    /// Time trigger
    pub fn interval_elapsed(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_flush) >= self.flush_interval
    }

    /// Size trigger
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_size
    }

    /// Drain every item and restart the flush clock at `now`
    pub fn take(&mut self, now: Instant) -> Vec<T> {
        self.last_flush = now;
        mem::replace(&mut self.items, Vec::with_capacity(self.max_size))
    }

    /// Restart the flush clock without draining
    ///
    /// Used when the flush timestamp should reflect the end of an emission
    /// rather than the moment the batch was drained.
    pub fn restart_clock(&mut self, now: Instant) {
        self.last_flush = now;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    pub fn last_flush(&self) -> Instant {
        self.last_flush
    }
}
