//! Metric - the value object flowing from sources to sinks
//!
//! Immutable once built; sinks receive their own copy on fan-out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Dimension labels (key -> value)
///
/// Ordered so that the wire order of dimension pairs is stable.
pub type Dimensions = BTreeMap<String, String>;

/// Metric kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Point-in-time value
    #[default]
    Gauge,
    /// Delta since the previous report
    Counter,
    /// Monotonic running total
    CumulativeCounter,
}

/// A single sampled metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    name: String,
    value: f64,
    kind: MetricKind,
    dimensions: Dimensions,
}

impl Metric {
    /// Create a metric without dimensions
    ///
    /// # Errors
    /// Returns `InvalidMetric` when `name` is empty
    pub fn new(name: impl Into<String>, value: f64, kind: MetricKind) -> Result<Self, ContractError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ContractError::invalid_metric("metric name cannot be empty"));
        }
        Ok(Self {
            name,
            value,
            kind,
            dimensions: Dimensions::new(),
        })
    }

    /// Create a gauge
    pub fn gauge(name: impl Into<String>, value: f64) -> Result<Self, ContractError> {
        Self::new(name, value, MetricKind::Gauge)
    }

    /// Create a counter
    pub fn counter(name: impl Into<String>, value: f64) -> Result<Self, ContractError> {
        Self::new(name, value, MetricKind::Counter)
    }

    /// Create a cumulative counter
    pub fn cumulative_counter(name: impl Into<String>, value: f64) -> Result<Self, ContractError> {
        Self::new(name, value, MetricKind::CumulativeCounter)
    }

    /// Attach one dimension (replaces an existing key)
    pub fn with_dimension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(key.into(), value.into());
        self
    }

    /// Attach several dimensions (replaces existing keys)
    pub fn with_dimensions<I, K, V>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.dimensions
            .extend(dimensions.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Dimensions attached by the producing source
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Merge sink defaults with the metric's own dimensions
    ///
    /// Starts from `defaults`, then every metric dimension overwrites the
    /// default of the same key. Computed per call, never cached.
    pub fn resolve_dimensions(&self, defaults: &Dimensions) -> Dimensions {
        let mut resolved = defaults.clone();
        for (key, value) in &self.dimensions {
            resolved.insert(key.clone(), value.clone());
        }
        resolved
    }
}
