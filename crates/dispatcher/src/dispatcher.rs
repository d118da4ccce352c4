//! Dispatcher - fan-out from source queues to sink queues

use std::collections::BTreeMap;

use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, instrument, warn};

use contracts::{
    AgentConfig, MetricQueue, MetricReceiver, MetricSink, SinkOptions, SinkSettings,
    COMMON_OPTION_KEYS,
};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{LogSink, SignalFxSink};

/// Sink names accepted by [`create_sink_handle`]
pub const KNOWN_SINKS: &[&str] = &["SignalFx", "Log"];

/// Dispatcher configuration
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Global settings every sink is seeded from
    pub agent: AgentConfig,
    /// Sink name -> options, started in name order
    pub sinks: BTreeMap<String, SinkOptions>,
}

impl From<&AgentConfig> for DispatcherConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            agent: config.clone(),
            sinks: config
                .handlers
                .iter()
                .map(|(name, options)| (name.clone(), options.clone()))
                .collect(),
        }
    }
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    sources: Vec<MetricReceiver>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            sources: Vec::new(),
        }
    }

    /// Attach a source's outbound queue
    pub fn add_source(mut self, receiver: MetricReceiver) -> Self {
        self.sources.push(receiver);
        self
    }

    /// Start every configured sink and build the dispatcher
    ///
    /// # Errors
    /// Returns `UnknownSink` for a handler name with no implementation;
    /// sinks started before the failure are shut down.
    #[instrument(name = "dispatcher_builder_build", skip(self), fields(sink_count = self.config.sinks.len()))]
    pub async fn build(self) -> Result<Dispatcher, DispatcherError> {
        let mut handles = Vec::with_capacity(self.config.sinks.len());
        for (name, options) in &self.config.sinks {
            match create_sink_handle(name, options, &self.config.agent) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    Dispatcher::shutdown_handles(handles).await;
                    return Err(e);
                }
            }
        }

        Ok(Dispatcher {
            handles,
            sources: self.sources,
        })
    }
}

/// Create and start a sink by name
///
/// Common options are applied first, then the sink's own keys. Unrecognized
/// keys are logged and ignored.
#[instrument(name = "dispatcher_create_sink_handle", skip(options, config))]
pub fn create_sink_handle(
    name: &str,
    options: &SinkOptions,
    config: &AgentConfig,
) -> Result<SinkHandle, DispatcherError> {
    let mut settings = SinkSettings::from_config(name, config);
    settings.apply_common_options(options);

    match name {
        "SignalFx" => Ok(SinkHandle::spawn(configured(
            SignalFxSink::new(settings),
            options,
        ))),
        "Log" => Ok(SinkHandle::spawn(configured(LogSink::new(settings), options))),
        other => Err(DispatcherError::unknown_sink(other, KNOWN_SINKS)),
    }
}

fn configured<S: MetricSink>(mut sink: S, options: &SinkOptions) -> S {
    sink.configure(options);

    let known = sink.option_keys();
    for key in options.keys() {
        if !COMMON_OPTION_KEYS.contains(&key.as_str()) && !known.contains(&key.as_str()) {
            warn!(sink = sink.name(), key = %key, "Ignoring unrecognized sink option");
        }
    }

    let settings = sink.settings();
    info!(
        sink = %settings.name,
        max_batch_size = settings.max_batch_size,
        flush_interval_secs = settings.flush_interval.as_secs(),
        queue_capacity = settings.queue_capacity,
        "Sink configured"
    );
    sink
}

/// Copies every metric from the source queues onto every sink queue
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    sources: Vec<MetricReceiver>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self {
            handles,
            sources: Vec::new(),
        }
    }

    /// Attach a source's outbound queue
    pub fn add_source(&mut self, receiver: MetricReceiver) {
        self.sources.push(receiver);
    }

    /// Names of the running sinks
    pub fn sink_names(&self) -> Vec<&str> {
        self.handles.iter().map(SinkHandle::name).collect()
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.snapshot()))
            .collect()
    }

    /// Run the dispatcher
    ///
    /// One forwarder per source queue. Returns the final per-sink metrics
    /// once every source queue is closed and every sink has flushed its
    /// residual batch.
    #[instrument(name = "dispatcher_run", skip(self), fields(sources = self.sources.len(), sinks = self.handles.len()))]
    pub async fn run(mut self) -> Vec<(String, MetricsSnapshot)> {
        info!("Dispatcher started");

        let targets: Vec<MetricQueue> = self.handles.iter().map(SinkHandle::inbound).collect();
        let mut forwarders = JoinSet::new();
        for receiver in self.sources.drain(..) {
            forwarders.spawn(forward(receiver, targets.clone()));
        }
        drop(targets);

        let mut forwarded: u64 = 0;
        while let Some(result) = forwarders.join_next().await {
            match result {
                Ok(count) => forwarded += count,
                Err(e) => warn!(error = %e, "Forwarder task failed"),
            }
        }

        info!(metrics = forwarded, "Source queues closed, shutting down sinks");
        let report = Self::shutdown_handles(self.handles).await;
        info!("Dispatcher shutdown complete");
        report
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<Vec<(String, MetricsSnapshot)>> {
        tokio::spawn(self.run())
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) -> Vec<(String, MetricsSnapshot)> {
        let mut report = Vec::with_capacity(handles.len());
        for handle in handles {
            let name = handle.name().to_string();
            report.push((name, handle.shutdown().await));
        }
        report
    }
}

/// Drain one source queue, cloning each metric onto every sink queue
async fn forward(mut receiver: MetricReceiver, targets: Vec<MetricQueue>) -> u64 {
    let mut count: u64 = 0;
    while let Some(metric) = receiver.recv().await {
        count += 1;
        for target in &targets {
            if target.push(metric.clone()).is_err() {
                observability::record_metric_dropped(target.name());
            }
        }
        if count.is_multiple_of(1000) {
            debug!(metrics = count, "Forwarder progress");
        }
    }
    count
}

/// Convenience function to create a dispatcher from the agent configuration
#[instrument(name = "dispatcher_create", skip(config, sources))]
pub async fn create_dispatcher(
    config: &AgentConfig,
    sources: Vec<MetricReceiver>,
) -> Result<Dispatcher, DispatcherError> {
    sources
        .into_iter()
        .fold(DispatcherBuilder::new(DispatcherConfig::from(config)), DispatcherBuilder::add_source)
        .build()
        .await
}
