//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - data model behaviour seen by every sink
//! - source -> dispatcher -> sink flows with a recording HTTP transport
//! - configuration file -> running dispatcher

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use contracts::ContractError;
    use dispatcher::sinks::wire::DataPointUploadMessage;
    use dispatcher::{HttpRequest, HttpResponse, HttpTransport};
    use prost::Message;
    use tokio::sync::mpsc;

    /// Transport that decodes and reports every upload
    #[derive(Clone)]
    pub struct RecordingTransport {
        pub requests: Arc<Mutex<Vec<HttpRequest>>>,
        uploads: mpsc::UnboundedSender<DataPointUploadMessage>,
        delay: Duration,
    }

    impl RecordingTransport {
        pub fn new() -> (Self, mpsc::UnboundedReceiver<DataPointUploadMessage>) {
            Self::with_delay(Duration::ZERO)
        }

        pub fn with_delay(delay: Duration) -> (Self, mpsc::UnboundedReceiver<DataPointUploadMessage>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let transport = Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                uploads: tx,
                delay,
            };
            (transport, rx)
        }
    }

    impl HttpTransport for RecordingTransport {
        async fn post(&self, request: HttpRequest) -> Result<HttpResponse, ContractError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let upload = DataPointUploadMessage::decode(request.body.as_ref())
                .map_err(|e| ContractError::transport("recording", e.to_string()))?;
            self.requests.lock().unwrap().push(request);
            let _ = self.uploads.send(upload);
            Ok(HttpResponse {
                status: "200 OK".into(),
                body: String::new(),
            })
        }
    }
}

#[cfg(test)]
mod contract_tests {
    use contracts::{AgentConfig, Dimensions, Metric, SinkSettings};

    #[test]
    fn test_metric_dimensions_win_over_defaults() {
        let defaults = Dimensions::from([
            ("host".to_string(), "default-host".to_string()),
            ("env".to_string(), "prod".to_string()),
        ]);
        let metric = Metric::gauge("cpu", 1.0).unwrap().with_dimension("host", "h1");

        let resolved = metric.resolve_dimensions(&defaults);
        assert_eq!(resolved["host"], "h1");
        assert_eq!(resolved["env"], "prod");
        // inputs untouched
        assert_eq!(defaults["host"], "default-host");
        assert_eq!(metric.dimensions().len(), 1);
    }

    #[test]
    fn test_empty_metric_name_is_rejected() {
        assert!(Metric::gauge("", 1.0).is_err());
    }

    #[test]
    fn test_sink_settings_follow_global_config() {
        let config = config_loader::ConfigLoader::load_from_str(
            r#"{ "prefix": "app.", "interval": 60, "collectors": ["Test"] }"#,
            config_loader::ConfigFormat::Json,
        )
        .unwrap();
        let settings = SinkSettings::from_config("SignalFx", &config);
        assert_eq!(settings.prefix, "app.");
        assert_eq!(settings.flush_interval.as_secs(), 60);
        assert_eq!(settings.queue_capacity, AgentConfig::default().queue_capacity);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use contracts::{metric_queue, Dimensions, Metric, SinkOptions, SinkSettings};
    use dispatcher::sinks::wire::{DataPoint, MetricType};
    use dispatcher::{Dispatcher, MetricSink, SignalFxSink, SinkHandle};

    use crate::support::RecordingTransport;

    fn signalfx_options() -> SinkOptions {
        SinkOptions::from([
            ("authToken".to_string(), "token".to_string()),
            ("endpoint".to_string(), "http://ingest.local/v2/datapoint".to_string()),
        ])
    }

    fn signalfx_sink(
        settings: SinkSettings,
        transport: RecordingTransport,
    ) -> SignalFxSink<RecordingTransport> {
        let mut sink = SignalFxSink::with_transport(settings, transport);
        sink.configure(&signalfx_options());
        sink
    }

    fn dimension_pairs(datapoint: &DataPoint) -> Vec<(&str, &str)> {
        datapoint
            .dimensions
            .iter()
            .map(|d| (d.key.as_deref().unwrap(), d.value.as_deref().unwrap()))
            .collect()
    }

    /// Two metrics, batch size 2, long interval: exactly one upload
    #[tokio::test]
    async fn test_e2e_size_triggered_upload() {
        let mut settings = SinkSettings::new("SignalFx");
        settings.prefix = "app.".into();
        settings.max_batch_size = 2;
        settings.flush_interval = Duration::from_secs(60);
        settings.default_dimensions = Dimensions::from([("env".to_string(), "p".to_string())]);

        let (transport, mut uploads) = RecordingTransport::new();
        let requests = transport.requests.clone();
        let handle = SinkHandle::spawn(signalfx_sink(settings, transport));

        let mut dispatcher = Dispatcher::with_handles(vec![handle]);
        let (source, receiver) = metric_queue("Test", 10);
        dispatcher.add_source(receiver);
        let task = dispatcher.spawn();

        source
            .push(Metric::gauge("cpu", 0.5).unwrap().with_dimension("host", "h1"))
            .unwrap();
        source
            .push(Metric::gauge("mem", 42.0).unwrap().with_dimension("host", "h1"))
            .unwrap();

        let upload = uploads.recv().await.unwrap();
        assert_eq!(upload.datapoints.len(), 2);

        for (datapoint, (name, value)) in upload
            .datapoints
            .iter()
            .zip([("app.cpu", 0.5), ("app.mem", 42.0)])
        {
            assert_eq!(datapoint.metric.as_deref(), Some(name));
            assert_eq!(datapoint.source.as_deref(), Some("fullerite"));
            assert_eq!(datapoint.metric_type, Some(MetricType::Gauge as i32));
            assert_eq!(datapoint.value.as_ref().unwrap().double_value, Some(value));
            assert_eq!(dimension_pairs(datapoint), vec![("env", "p"), ("host", "h1")]);
        }

        drop(source);
        let report = task.await.unwrap();
        assert_eq!(report[0].1.sent_batches, 1);
        assert_eq!(requests.lock().unwrap().len(), 1);
        assert!(uploads.try_recv().is_err());
    }

    /// A slow backend must not hold back a fast one
    #[tokio::test(start_paused = true)]
    async fn test_e2e_slow_sink_is_isolated() {
        let mut slow_settings = SinkSettings::new("slow");
        slow_settings.max_batch_size = 1;
        slow_settings.queue_capacity = 2;
        let (slow_transport, _slow_uploads) = RecordingTransport::with_delay(Duration::from_secs(30));

        let mut fast_settings = SinkSettings::new("fast");
        fast_settings.max_batch_size = 5;
        let (fast_transport, mut fast_uploads) = RecordingTransport::new();

        let slow = SinkHandle::spawn(signalfx_sink(slow_settings, slow_transport));
        let fast = SinkHandle::spawn(signalfx_sink(fast_settings, fast_transport));

        let mut dispatcher = Dispatcher::with_handles(vec![slow, fast]);
        let (source, receiver) = metric_queue("Test", 100);
        dispatcher.add_source(receiver);
        let task = dispatcher.spawn();

        for i in 0..10 {
            source.push(Metric::gauge(format!("m{i}"), i as f64).unwrap()).unwrap();
        }

        // fast sink delivers both batches while the slow one is stuck
        assert_eq!(fast_uploads.recv().await.unwrap().datapoints.len(), 5);
        assert_eq!(fast_uploads.recv().await.unwrap().datapoints.len(), 5);

        drop(source);
        let report = task.await.unwrap();
        let slow_report = report.iter().find(|(n, _)| n == "slow").unwrap().1;
        let fast_report = report.iter().find(|(n, _)| n == "fast").unwrap().1;
        assert_eq!(fast_report.sent_datapoints, 10);
        assert!(slow_report.dropped_count > 0);
        assert_eq!(
            slow_report.received_count + slow_report.dropped_count,
            10
        );
    }

    /// The built-in Test collector feeds a sink through the scheduler
    #[tokio::test]
    async fn test_e2e_test_collector_to_signalfx() {
        let mut settings = SinkSettings::new("SignalFx");
        settings.max_batch_size = 1;
        let (transport, mut uploads) = RecordingTransport::new();
        let handle = SinkHandle::spawn(signalfx_sink(settings, transport));

        let (mut source, receiver) = collectors::create_with_queue("Test", 10).unwrap();
        source.set_interval(Duration::from_secs(60));
        let source_handle = collectors::SourceHandle::spawn(source);

        let mut dispatcher = Dispatcher::with_handles(vec![handle]);
        dispatcher.add_source(receiver);
        let task = dispatcher.spawn();

        let upload = uploads.recv().await.unwrap();
        assert_eq!(upload.datapoints[0].metric.as_deref(), Some("test.metric"));

        source_handle.shutdown().await;
        task.await.unwrap();
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::ConfigLoader;
    use dispatcher::{create_dispatcher, DispatcherError};

    #[tokio::test]
    async fn test_config_file_to_dispatcher() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fullerite.conf");
        std::fs::write(
            &path,
            r#"{
                "prefix": "test.",
                "interval": 5,
                "defaultDimensions": { "application": "fullerite" },
                "collectors": ["Test", "CPU"],
                "handlers": {
                    "Log": { "maxBufferSize": "10" },
                    "SignalFx": { "authToken": "t", "endpoint": "http://127.0.0.1:1/v2" }
                }
            }"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        let dispatcher = create_dispatcher(&config, Vec::new()).await.unwrap();
        assert_eq!(dispatcher.sink_names(), vec!["Log", "SignalFx"]);

        // no sources: run returns immediately after shutting the sinks down
        let report = dispatcher.run().await;
        assert_eq!(report.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_handler_in_config() {
        let config = ConfigLoader::load_from_str(
            r#"{ "collectors": ["Test"], "handlers": { "Kairos": {} } }"#,
            config_loader::ConfigFormat::Json,
        )
        .unwrap();

        let result = create_dispatcher(&config, Vec::new()).await;
        assert!(matches!(result, Err(DispatcherError::UnknownSink { .. })));
    }

    #[test]
    fn test_unknown_collector_in_registry() {
        let Err(err) = collectors::create_with_queue("Diamond", 10) else {
            panic!("unknown collector accepted");
        };
        assert!(err.to_string().contains("Diamond"));
    }
}
