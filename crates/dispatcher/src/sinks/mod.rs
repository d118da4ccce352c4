//! Sink implementations
//!
//! Contains SignalFxSink and LogSink.

mod log;
mod signalfx;
pub mod wire;

pub use self::log::{LogDatapoint, LogSink};
pub use self::signalfx::{SignalFxSink, SIGNALFX_OPTION_KEYS, SOURCE_IDENTITY};
