//! Layered error definitions
//!
//! Categorized by source: config / metric / source / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Metric Errors =====
    /// Metric rejected at construction
    #[error("invalid metric: {message}")]
    InvalidMetric { message: String },

    // ===== Source Errors =====
    /// Sampling pass failed
    #[error("source '{source_name}' sample error: {message}")]
    Sample {
        source_name: String,
        message: String,
    },

    // ===== Sink Errors =====
    /// Sink serialization error
    #[error("sink '{sink_name}' encode error: {message}")]
    Encode { sink_name: String, message: String },

    /// Sink transport error
    #[error("sink '{sink_name}' transport error: {message}")]
    Transport { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid metric error
    pub fn invalid_metric(message: impl Into<String>) -> Self {
        Self::InvalidMetric {
            message: message.into(),
        }
    }

    /// Create sampling error
    pub fn sample(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sample {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create sink encode error
    pub fn encode(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink transport error
    pub fn transport(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
