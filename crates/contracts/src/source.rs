//! MetricSource trait - metric producer abstraction
//!
//! A source does not schedule itself: the scheduler calls [`MetricSource::sample`]
//! once per [`MetricSource::interval`], independently for every source.

use std::time::Duration;

use crate::{ContractError, MetricQueue};

/// Metric producer
///
/// Implemented by every collector known to the source registry.
///
/// # Example
///
/// ```ignore
/// let (queue, rx) = metric_queue("cpu", 100);
/// let mut source = collectors::create("CPU", queue)?;
/// source.set_interval(Duration::from_secs(10));
/// source.sample()?;
/// ```
pub trait MetricSource: Send {
    /// Stable identifier, also the registry key
    fn name(&self) -> &str;

    /// Sampling cadence
    fn interval(&self) -> Duration;

    /// Override the cadence (applied from configuration after construction)
    fn set_interval(&mut self, interval: Duration);

    /// Run one collection pass
    ///
    /// Pushes zero or more metrics onto [`MetricSource::outbound`].
    ///
    /// # Errors
    /// Returns a sample error when the underlying read fails; the scheduler
    /// logs it and tries again on the next tick.
    fn sample(&mut self) -> Result<(), ContractError>;

    /// Outbound queue drained by the dispatcher
    fn outbound(&self) -> &MetricQueue;
}
