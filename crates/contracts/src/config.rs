//! AgentConfig - configuration schema
//!
//! Produced by `config_loader`, consumed at startup to build sources and sinks.
//! Keys follow the camelCase JSON format; snake_case aliases are accepted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Dimensions;

/// Default sampling / flush interval (seconds)
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Default bound for every metric queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Flat option map handed to a sink's `configure`
pub type SinkOptions = HashMap<String, String>;

/// Top-level agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Global metric name prefix
    #[serde(default)]
    pub prefix: String,

    /// Global interval in seconds (sources and sink flushes)
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Bound for every metric queue
    #[serde(default = "default_queue_capacity", alias = "queue_capacity")]
    pub queue_capacity: usize,

    /// Source names to activate (registry keys)
    #[serde(default)]
    pub collectors: Vec<String>,

    /// Dimensions attached to every datapoint
    #[serde(default, alias = "default_dimensions")]
    pub default_dimensions: Dimensions,

    /// Sink name -> sink options
    #[serde(default)]
    pub handlers: HashMap<String, SinkOptions>,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            interval: DEFAULT_INTERVAL_SECS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            collectors: Vec::new(),
            default_dimensions: Dimensions::new(),
            handlers: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_json_format() {
        let json = r#"{
            "prefix": "test.",
            "interval": 5,
            "defaultDimensions": { "application": "fullerite" },
            "collectors": ["Test", "CPU"],
            "handlers": {
                "SignalFx": { "authToken": "secret", "endpoint": "https://ingest.example/v2/datapoint" }
            }
        }"#;
        let config: AgentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.prefix, "test.");
        assert_eq!(config.interval, 5);
        assert_eq!(config.collectors, vec!["Test", "CPU"]);
        assert_eq!(config.default_dimensions["application"], "fullerite");
        assert_eq!(config.handlers["SignalFx"]["authToken"], "secret");
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_defaults_when_empty() {
        let config: AgentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AgentConfig::default());
    }

    #[test]
    fn test_snake_case_aliases() {
        let json = r#"{ "default_dimensions": { "env": "prod" }, "queue_capacity": 5 }"#;
        let config: AgentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.default_dimensions["env"], "prod");
        assert_eq!(config.queue_capacity, 5);
    }
}
