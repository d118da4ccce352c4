//! SourceHandle - drives one source on its own interval

use std::time::Duration;

use contracts::{Metric, MetricQueue, MetricSource};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Smallest cadence the scheduler accepts
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Push a sampled metric onto a source's outbound queue
///
/// Returns whether the metric was queued. A refused metric is already logged
/// and counted by the queue; this also reports it to the agent's metrics.
pub(crate) fn publish(outbound: &MetricQueue, metric: Metric) -> bool {
    match outbound.push(metric) {
        Ok(()) => true,
        Err(_) => {
            observability::record_metric_dropped(outbound.name());
            false
        }
    }
}

/// Handle to a running source worker
pub struct SourceHandle {
    name: String,
    interval: Duration,
    worker_handle: JoinHandle<()>,
}

impl SourceHandle {
    /// Spawn the sampling task for `source`
    ///
    /// Samples immediately, then once per `source.interval()`. The task
    /// stops once the source's outbound queue has no consumer left.
    pub fn spawn(source: Box<dyn MetricSource>) -> Self {
        let name = source.name().to_string();
        let interval = source.interval().max(MIN_INTERVAL);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            source_worker(source, interval, worker_name).await;
        });

        Self {
            name,
            interval,
            worker_handle,
        }
    }

    /// Source name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective sampling cadence
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the worker has exited
    pub fn is_finished(&self) -> bool {
        self.worker_handle.is_finished()
    }

    /// Stop sampling
    pub async fn shutdown(self) {
        self.worker_handle.abort();
        let _ = self.worker_handle.await;
        debug!(source = %self.name, "SourceHandle shutdown complete");
    }
}

#[instrument(name = "source_worker_loop", skip(source, interval), fields(source = %name))]
async fn source_worker(mut source: Box<dyn MetricSource>, interval: Duration, name: String) {
    info!(interval_secs = interval.as_secs_f64(), "Source worker started");

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if source.outbound().is_closed() {
            info!("Outbound queue closed, source worker stopping");
            break;
        }

        match source.sample() {
            Ok(()) => observability::record_sample(&name, true),
            Err(e) => {
                observability::record_sample(&name, false);
                warn!(error = %e, "Sample failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{metric_queue, ContractError, Metric, MetricQueue};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        interval: Duration,
        outbound: MetricQueue,
        samples: Arc<AtomicU64>,
        fail: bool,
    }

    impl MetricSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        fn interval(&self) -> Duration {
            self.interval
        }

        fn set_interval(&mut self, interval: Duration) {
            self.interval = interval;
        }

        fn sample(&mut self) -> Result<(), ContractError> {
            let n = self.samples.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ContractError::sample("counting", "mock failure"));
            }
            let _ = self.outbound.push(Metric::counter("ticks", n as f64)?);
            Ok(())
        }

        fn outbound(&self) -> &MetricQueue {
            &self.outbound
        }
    }

    fn counting(interval: Duration, fail: bool) -> (CountingSource, Arc<AtomicU64>, contracts::MetricReceiver) {
        let (outbound, rx) = metric_queue("counting", 100);
        let samples = Arc::new(AtomicU64::new(0));
        let source = CountingSource {
            interval,
            outbound,
            samples: Arc::clone(&samples),
            fail,
        };
        (source, samples, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_samples_once_per_interval() {
        let (source, samples, mut rx) = counting(Duration::from_secs(10), false);
        let handle = SourceHandle::spawn(Box::new(source));

        // first tick fires immediately
        let first = rx.recv().await.unwrap();
        assert_eq!(first.value(), 0.0);

        time::sleep(Duration::from_secs(25)).await;
        assert_eq!(samples.load(Ordering::SeqCst), 3);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_scheduling() {
        let (source, samples, _rx) = counting(Duration::from_secs(1), true);
        let handle = SourceHandle::spawn(Box::new(source));

        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(samples.load(Ordering::SeqCst), 4);
        assert!(!handle.is_finished());

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_queue_closed() {
        let (source, _samples, rx) = counting(Duration::from_secs(1), false);
        let handle = SourceHandle::spawn(Box::new(source));
        drop(rx);

        time::sleep(Duration::from_secs(2)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_cadences() {
        let (fast, fast_samples, _fast_rx) = counting(Duration::from_secs(1), false);
        let (slow, slow_samples, _slow_rx) = counting(Duration::from_secs(5), false);
        let fast = SourceHandle::spawn(Box::new(fast));
        let slow = SourceHandle::spawn(Box::new(slow));

        time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(fast_samples.load(Ordering::SeqCst), 11);
        assert_eq!(slow_samples.load(Ordering::SeqCst), 3);

        fast.shutdown().await;
        slow.shutdown().await;
    }
}
