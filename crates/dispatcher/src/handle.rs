//! SinkHandle - owns a sink's inbound queue and its consumer task
//!
//! The consumer task is the only owner of the sink and its batch. It blocks
//! on the inbound queue, converts each metric, appends it to the batch and
//! emits whenever the size or the time trigger holds after that append.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, trace};

use contracts::{metric_queue, Batch, EmitOutcome, Metric, MetricQueue, MetricReceiver, MetricSink};
use observability::FlushStatus;

use crate::metrics::{MetricsSnapshot, SinkMetrics};

/// Handle to a running sink worker
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Inbound queue (producer half)
    queue: MetricQueue,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Create the inbound queue and spawn the consumer task
    ///
    /// The queue bound comes from the sink's settings.
    pub fn spawn<S>(sink: S) -> Self
    where
        S: MetricSink + Send + 'static,
    {
        let name = sink.name().to_string();
        let (queue, inbound) = metric_queue(name.clone(), sink.settings().queue_capacity);
        let metrics = Arc::new(SinkMetrics::new());

        let worker = SinkWorker::new(sink, inbound, Arc::clone(&metrics));
        let worker_handle = tokio::spawn(worker.run());

        Self {
            name,
            queue,
            metrics,
            worker_handle,
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Producer half of the inbound queue
    pub fn inbound(&self) -> MetricQueue {
        self.queue.clone()
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Metrics snapshot including queue drops
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.queue.dropped_count())
    }

    /// Send a metric to the sink (non-blocking)
    ///
    /// Returns true if queued, false if dropped (queue full or closed)
    pub fn try_send(&self, metric: Metric) -> bool {
        match self.queue.push(metric) {
            Ok(()) => {
                self.metrics.set_queue_len(self.queue.len());
                true
            }
            Err(_) => {
                observability::record_metric_dropped(&self.name);
                false
            }
        }
    }

    /// Close the inbound queue and wait for the worker to drain
    ///
    /// Other producers (dispatcher forwarders) must be gone as well for the
    /// worker to observe the closure. Returns the final metrics.
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) -> MetricsSnapshot {
        let dropped = self.queue.dropped_count();
        drop(self.queue);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
        self.metrics.snapshot(dropped)
    }
}

/// Consumer side of one sink
pub struct SinkWorker<S: MetricSink> {
    name: String,
    sink: S,
    inbound: MetricReceiver,
    batch: Batch<S::Datapoint>,
    metrics: Arc<SinkMetrics>,
}

impl<S: MetricSink> SinkWorker<S> {
    /// Create a worker; the flush clock starts now
    pub fn new(sink: S, inbound: MetricReceiver, metrics: Arc<SinkMetrics>) -> Self {
        let settings = sink.settings();
        let batch = Batch::new(settings.max_batch_size, settings.flush_interval);
        Self {
            name: sink.name().to_string(),
            sink,
            inbound,
            batch,
            metrics,
        }
    }

    /// Datapoints currently held in the batch
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// One dequeue -> convert -> append -> check step
    ///
    /// Returns false once the inbound queue is closed and empty.
    pub async fn collect(&mut self) -> bool {
        let Some(metric) = self.inbound.recv().await else {
            return false;
        };
        self.metrics.inc_received_count();
        self.metrics.set_queue_len(self.inbound.len());
        observability::record_metric_received(&self.name);

        let datapoint = self.sink.convert(&metric);
        trace!(sink = %self.name, metric = metric.name(), "Datapoint appended");

        if let Some(batch) = self.batch.push(datapoint) {
            self.flush(batch).await;
        }
        true
    }

    async fn flush(&mut self, batch: Vec<S::Datapoint>) {
        let size = batch.len();
        let started = Instant::now();

        let outcome = self.sink.emit(batch).await;

        let finished = Instant::now();
        self.batch.restart_clock(finished);

        let status = match &outcome {
            EmitOutcome::Sent(_) => FlushStatus::Sent,
            EmitOutcome::Skipped(_) => FlushStatus::Skipped,
            EmitOutcome::Failed(_) => FlushStatus::Failed,
        };
        self.metrics.record_outcome(&outcome);
        observability::record_batch_flushed(&self.name, status, size);
        observability::record_emit_latency_ms(
            &self.name,
            finished.duration_since(started).as_secs_f64() * 1000.0,
        );
        debug!(sink = %self.name, size, outcome = ?outcome, "Batch flushed");
    }

    /// Run until the inbound queue closes
    ///
    /// Emission failures never stop the loop. The residual batch is emitted
    /// once when the queue closes.
    #[instrument(name = "sink_worker_loop", skip(self), fields(sink = %self.name))]
    pub async fn run(mut self) {
        info!(
            max_batch_size = self.batch.max_size(),
            flush_interval_secs = self.batch.flush_interval().as_secs_f64(),
            "Sink worker started"
        );

        while self.collect().await {}

        if !self.batch.is_empty() {
            let rest = self.batch.take(Instant::now());
            self.flush(rest).await;
        }

        info!("Sink worker stopped");
    }
}
