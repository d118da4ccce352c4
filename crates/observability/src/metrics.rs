//! Agent self-metrics
//!
//! Counters and histograms about the pipeline itself, exported through the
//! installed `metrics` recorder. Without a recorder every call is a no-op.

use metrics::{counter, histogram};

/// Outcome label of a flushed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushStatus {
    Sent,
    Skipped,
    Failed,
}

impl FlushStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// Record one sampling pass of a source
pub fn record_sample(source: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "telemetry_agent_samples_total",
        "source" => source.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record a metric taken off a sink's inbound queue
pub fn record_metric_received(sink: &str) {
    counter!("telemetry_agent_metrics_received_total", "sink" => sink.to_string()).increment(1);
}

/// Record a metric dropped on a full or closed queue
pub fn record_metric_dropped(queue: &str) {
    counter!("telemetry_agent_metrics_dropped_total", "queue" => queue.to_string()).increment(1);
}

/// Record one flush and the batch size it carried
pub fn record_batch_flushed(sink: &str, status: FlushStatus, batch_size: usize) {
    counter!(
        "telemetry_agent_batches_flushed_total",
        "sink" => sink.to_string(),
        "status" => status.as_str()
    )
    .increment(1);
    histogram!("telemetry_agent_batch_size", "sink" => sink.to_string()).record(batch_size as f64);
}

/// Record how long one emission blocked the sink
pub fn record_emit_latency_ms(sink: &str, latency_ms: f64) {
    histogram!("telemetry_agent_emit_latency_ms", "sink" => sink.to_string()).record(latency_ms);
}
