//! # Dispatcher
//!
//! Metric fan-out and sink execution.
//!
//! Responsibilities:
//! - copy every metric from the source queues onto every sink queue
//! - run one consumer task per sink (size/time batching)
//! - isolate slow or failing sinks from each other and from the sources

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;
pub mod transport;

pub use contracts::{EmitOutcome, MetricSink};
pub use dispatcher::{
    create_dispatcher, create_sink_handle, Dispatcher, DispatcherBuilder, DispatcherConfig,
    KNOWN_SINKS,
};
pub use error::DispatcherError;
pub use handle::{SinkHandle, SinkWorker};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{LogDatapoint, LogSink, SignalFxSink};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
