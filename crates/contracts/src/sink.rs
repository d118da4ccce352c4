//! MetricSink trait - backend output interface
//!
//! Every backend embeds a [`SinkSettings`] record and supplies the three
//! backend-specific steps: option parsing, per-metric conversion and batch
//! emission. The batching loop itself lives in the dispatcher.

use std::time::Duration;

use tracing::warn;

use crate::{
    AgentConfig, Dimensions, Metric, SinkOptions, DEFAULT_INTERVAL_SECS, DEFAULT_QUEUE_CAPACITY,
};

/// Default maximum datapoints per batch
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Option keys understood by every sink
pub const COMMON_OPTION_KEYS: &[&str] = &["interval", "maxBufferSize", "queueCapacity"];

/// Shared per-sink state
#[derive(Debug, Clone, PartialEq)]
pub struct SinkSettings {
    /// Sink name (registry key, used for logging/metrics)
    pub name: String,
    /// Prepended to every metric name
    pub prefix: String,
    /// Dimensions attached to every datapoint unless the metric overrides them
    pub default_dimensions: Dimensions,
    /// Size trigger
    pub max_batch_size: usize,
    /// Time trigger
    pub flush_interval: Duration,
    /// Inbound queue bound
    pub queue_capacity: usize,
}

impl SinkSettings {
    /// Settings with defaults for everything but the name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: String::new(),
            default_dimensions: Dimensions::new(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            flush_interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Settings seeded from the global configuration
    pub fn from_config(name: impl Into<String>, config: &AgentConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            default_dimensions: config.default_dimensions.clone(),
            flush_interval: Duration::from_secs(config.interval),
            queue_capacity: config.queue_capacity,
            ..Self::new(name)
        }
    }

    /// Apply the option keys shared by every sink
    ///
    /// Values that do not parse as positive integers are logged and ignored.
    pub fn apply_common_options(&mut self, options: &SinkOptions) {
        if let Some(secs) = parse_positive(&self.name, options, "interval") {
            self.flush_interval = Duration::from_secs(secs as u64);
        }
        if let Some(size) = parse_positive(&self.name, options, "maxBufferSize") {
            self.max_batch_size = size;
        }
        if let Some(capacity) = parse_positive(&self.name, options, "queueCapacity") {
            self.queue_capacity = capacity;
        }
    }
}

fn parse_positive(sink: &str, options: &SinkOptions, key: &str) -> Option<usize> {
    let raw = options.get(key)?;
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            warn!(sink, key, value = %raw, "Ignoring invalid sink option");
            None
        }
    }
}

/// Result of one emission attempt
///
/// Only consumed by the sink's own consumer task for accounting; a failed
/// batch is already logged and dropped when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Batch delivered (datapoint count)
    Sent(usize),
    /// Nothing attempted (empty batch or unconfigured sink)
    Skipped(String),
    /// Attempt made and failed; batch dropped
    Failed(String),
}

/// Metric output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(MetricSink: Send)]
pub trait LocalMetricSink {
    /// Backend wire representation of one metric
    type Datapoint: Send + 'static;

    /// Shared base state
    fn settings(&self) -> &SinkSettings;

    /// Shared base state (mutable)
    fn settings_mut(&mut self) -> &mut SinkSettings;

    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str {
        &self.settings().name
    }

    /// Flush interval
    fn interval(&self) -> Duration {
        self.settings().flush_interval
    }

    /// Override the flush interval
    fn set_interval(&mut self, interval: Duration) {
        self.settings_mut().flush_interval = interval;
    }

    /// Backend-specific option keys this sink recognises
    fn option_keys(&self) -> &'static [&'static str];

    /// Read backend-specific options
    ///
    /// Missing or unusable keys are logged, never rejected.
    fn configure(&mut self, options: &SinkOptions);

    /// Convert one metric into the backend datapoint
    fn convert(&self, metric: &Metric) -> Self::Datapoint;

    /// Deliver one batch
    ///
    /// Exactly one attempt; failures are logged inside and the batch dropped.
    async fn emit(&mut self, batch: Vec<Self::Datapoint>) -> EmitOutcome;
}
