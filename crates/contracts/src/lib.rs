//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the agent: the metric
//! data model, the source and sink capabilities, the batching state and the
//! configuration schema. Business crates depend on this crate only, never on
//! each other's internals.
//!
//! ## Data flow
//! - A [`MetricSource`] samples on its own interval and pushes [`Metric`]s
//!   onto its [`MetricQueue`]
//! - The dispatcher copies every metric onto the inbound queue of each sink
//! - A [`MetricSink`] converts metrics into its wire datapoint, accumulates
//!   them in a [`Batch`] and emits when the size or time trigger fires

mod batch;
mod config;
mod error;
mod metric;
mod queue;
mod sink;
mod source;

pub use batch::Batch;
pub use config::*;
pub use error::*;
pub use metric::{Dimensions, Metric, MetricKind};
pub use queue::{metric_queue, MetricQueue, MetricReceiver, PushError};
pub use sink::*;
pub use source::MetricSource;
