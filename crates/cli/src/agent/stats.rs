//! Agent run statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;

/// Statistics from one agent run
#[derive(Debug, Clone, Default)]
pub struct AgentStats {
    /// Total duration of the run
    pub duration: Duration,

    /// Number of collectors that were sampled
    pub active_sources: usize,

    /// Final per-handler metrics
    pub sinks: Vec<(String, MetricsSnapshot)>,
}

impl AgentStats {
    /// Metrics taken off handler queues, all handlers
    pub fn metrics_received(&self) -> u64 {
        self.sinks.iter().map(|(_, s)| s.received_count).sum()
    }

    /// Datapoints delivered, all handlers
    pub fn datapoints_sent(&self) -> u64 {
        self.sinks.iter().map(|(_, s)| s.sent_datapoints).sum()
    }

    /// Metrics dropped on full handler queues
    pub fn metrics_dropped(&self) -> u64 {
        self.sinks.iter().map(|(_, s)| s.dropped_count).sum()
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Agent Statistics ===\n");
        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Collectors: {}", self.active_sources);
        println!("   ├─ Handlers: {}", self.sinks.len());
        println!("   ├─ Metrics received: {}", self.metrics_received());
        println!("   ├─ Datapoints sent: {}", self.datapoints_sent());
        println!("   └─ Metrics dropped: {}", self.metrics_dropped());

        for (name, snapshot) in &self.sinks {
            println!("\nHandler {}", name);
            println!("   ├─ Batches sent: {}", snapshot.sent_batches);
            println!("   ├─ Batches skipped: {}", snapshot.skipped_batches);
            println!("   ├─ Batches failed: {}", snapshot.failed_batches);
            println!("   └─ Dropped: {}", snapshot.dropped_count);
        }

        println!();
    }
}
