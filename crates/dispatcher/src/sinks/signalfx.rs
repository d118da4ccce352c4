//! SignalFxSink - protobuf datapoints over HTTP POST

use prost::Message;
use tracing::{debug, error, info, instrument, warn};

use contracts::{ContractError, EmitOutcome, Metric, MetricSink, SinkOptions, SinkSettings};

use super::wire::{DataPoint, DataPointUploadMessage, Datum, Dimension, MetricType};
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};

/// Source tag carried by every datapoint
pub const SOURCE_IDENTITY: &str = "fullerite";

/// Backend-specific option keys
pub const SIGNALFX_OPTION_KEYS: &[&str] = &["authToken", "endpoint"];

const TOKEN_HEADER: &str = "X-SF-TOKEN";
const CONTENT_TYPE: &str = "application/x-protobuf";

/// Sink that uploads batches to a SignalFx ingest endpoint
///
/// Without both an auth token and an endpoint the sink still drains its
/// queue but never sends anything.
pub struct SignalFxSink<T = ReqwestTransport> {
    settings: SinkSettings,
    auth_token: Option<String>,
    endpoint: Option<String>,
    transport: T,
}

impl SignalFxSink<ReqwestTransport> {
    pub fn new(settings: SinkSettings) -> Self {
        Self::with_transport(settings, ReqwestTransport::new())
    }
}

impl<T> SignalFxSink<T> {
    /// Create a sink posting through a custom transport
    pub fn with_transport(settings: SinkSettings, transport: T) -> Self {
        Self {
            settings,
            auth_token: None,
            endpoint: None,
            transport,
        }
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn required_option(&self, options: &SinkOptions, key: &str) -> Option<String> {
        match options.get(key).map(|v| v.trim()) {
            Some(value) if !value.is_empty() => Some(value.to_string()),
            _ => {
                error!(
                    sink = %self.settings.name,
                    key,
                    "No value specified, there won't be any emissions"
                );
                None
            }
        }
    }
}

impl<T> MetricSink for SignalFxSink<T>
where
    T: HttpTransport + Send + Sync,
{
    type Datapoint = DataPoint;

    fn settings(&self) -> &SinkSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SinkSettings {
        &mut self.settings
    }

    fn option_keys(&self) -> &'static [&'static str] {
        SIGNALFX_OPTION_KEYS
    }

    fn configure(&mut self, options: &SinkOptions) {
        self.auth_token = self.required_option(options, "authToken");
        self.endpoint = self.required_option(options, "endpoint");
    }

    fn convert(&self, metric: &Metric) -> DataPoint {
        let dimensions = metric
            .resolve_dimensions(&self.settings.default_dimensions)
            .into_iter()
            .map(|(key, value)| Dimension {
                key: Some(key),
                value: Some(value),
            })
            .collect();

        DataPoint {
            source: Some(SOURCE_IDENTITY.to_string()),
            metric: Some(format!("{}{}", self.settings.prefix, metric.name())),
            timestamp: None,
            value: Some(Datum {
                double_value: Some(metric.value()),
                ..Default::default()
            }),
            metric_type: Some(MetricType::from(metric.kind()) as i32),
            dimensions,
        }
    }

    #[instrument(
        name = "signalfx_sink_emit",
        skip(self, batch),
        fields(sink = %self.settings.name, datapoints = batch.len())
    )]
    async fn emit(&mut self, batch: Vec<DataPoint>) -> EmitOutcome {
        if batch.is_empty() {
            warn!("Skipping send because of an empty payload");
            return EmitOutcome::Skipped("empty batch".into());
        }

        let (Some(token), Some(endpoint)) = (self.auth_token.as_deref(), self.endpoint.as_deref())
        else {
            warn!(
                dropped = batch.len(),
                "Skipping emission, auth token or endpoint missing"
            );
            return EmitOutcome::Skipped("missing auth token or endpoint".into());
        };

        let count = batch.len();
        let payload = DataPointUploadMessage { datapoints: batch };
        let mut body = Vec::with_capacity(payload.encoded_len());
        if let Err(e) = payload.encode(&mut body) {
            let err = ContractError::encode(&self.settings.name, e.to_string());
            error!(error = %err, "Failed to serialize payload");
            return EmitOutcome::Failed(err.to_string());
        }

        debug!(endpoint, bytes = body.len(), "Posting datapoints");
        let request = HttpRequest::new(endpoint, body)
            .header(TOKEN_HEADER, token)
            .header("Content-Type", CONTENT_TYPE);

        match self.transport.post(request).await {
            Ok(response) if response.is_success() => {
                info!(count, "Successfully sent datapoints to SignalFx");
                EmitOutcome::Sent(count)
            }
            Ok(response) => {
                error!(
                    endpoint,
                    status = %response.status,
                    body = %response.body,
                    "Failed to post to SignalFx"
                );
                EmitOutcome::Failed(response.status)
            }
            Err(e) => {
                error!(endpoint, error = %e, "Failed to complete POST");
                EmitOutcome::Failed(e.to_string())
            }
        }
    }
}
