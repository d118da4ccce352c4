//! Test collector
//!
//! Emits one random gauge per pass. Useful to check a sink end to end
//! without touching the host.

use std::time::Duration;

use contracts::{ContractError, Metric, MetricQueue, MetricSource, DEFAULT_INTERVAL_SECS};
use tracing::debug;

use crate::scheduler::publish;

/// Name of the emitted metric
pub const TEST_METRIC_NAME: &str = "test.metric";

/// Random-value source
pub struct TestCollector {
    interval: Duration,
    outbound: MetricQueue,
}

impl TestCollector {
    /// Create a test collector pushing onto `outbound`
    pub fn new(outbound: MetricQueue) -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            outbound,
        }
    }
}

impl MetricSource for TestCollector {
    fn name(&self) -> &str {
        "Test"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn sample(&mut self) -> Result<(), ContractError> {
        let value: f64 = rand::random();
        let metric = Metric::gauge(TEST_METRIC_NAME, value)?.with_dimension("collector", "Test");
        debug!(value, "Test collector sampled");
        publish(&self.outbound, metric);
        Ok(())
    }

    fn outbound(&self) -> &MetricQueue {
        &self.outbound
    }
}
