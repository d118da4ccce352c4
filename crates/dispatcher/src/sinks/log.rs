//! LogSink - writes every batch through tracing

use serde::Serialize;
use tracing::{info, instrument};

use contracts::{Dimensions, EmitOutcome, Metric, MetricKind, MetricSink, SinkOptions, SinkSettings};

/// Datapoint as logged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogDatapoint {
    pub name: String,
    pub value: f64,
    pub kind: MetricKind,
    pub dimensions: Dimensions,
}

/// Sink that logs datapoints for debugging
pub struct LogSink {
    settings: SinkSettings,
}

impl LogSink {
    pub fn new(settings: SinkSettings) -> Self {
        Self { settings }
    }
}

impl MetricSink for LogSink {
    type Datapoint = LogDatapoint;

    fn settings(&self) -> &SinkSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SinkSettings {
        &mut self.settings
    }

    fn option_keys(&self) -> &'static [&'static str] {
        &[]
    }

    fn configure(&mut self, _options: &SinkOptions) {}

    fn convert(&self, metric: &Metric) -> LogDatapoint {
        LogDatapoint {
            name: format!("{}{}", self.settings.prefix, metric.name()),
            value: metric.value(),
            kind: metric.kind(),
            dimensions: metric.resolve_dimensions(&self.settings.default_dimensions),
        }
    }

    #[instrument(
        name = "log_sink_emit",
        skip(self, batch),
        fields(sink = %self.settings.name, datapoints = batch.len())
    )]
    async fn emit(&mut self, batch: Vec<LogDatapoint>) -> EmitOutcome {
        if batch.is_empty() {
            return EmitOutcome::Skipped("empty batch".into());
        }
        for datapoint in &batch {
            let dimensions = serde_json::to_string(&datapoint.dimensions).unwrap_or_default();
            info!(
                metric = %datapoint.name,
                value = datapoint.value,
                kind = ?datapoint.kind,
                dimensions = %dimensions,
                "Datapoint"
            );
        }
        EmitOutcome::Sent(batch.len())
    }
}
