//! Source registry
//!
//! Fixed name -> implementation table used at startup. An unknown name is an
//! error the caller is expected to treat as fatal: running with a silently
//! missing source is worse than not starting.

use contracts::{metric_queue, MetricQueue, MetricReceiver, MetricSource};
use tracing::{error, info};

use crate::error::{CollectorError, Result};
use crate::{CpuCollector, TestCollector};

/// Names accepted by [`create`]
pub const KNOWN_COLLECTORS: &[&str] = &["Test", "CPU"];

/// Create a source by registry name, pushing onto `outbound`
///
/// # Errors
/// `UnknownCollector` when `name` is not registered
pub fn create(name: &str, outbound: MetricQueue) -> Result<Box<dyn MetricSource>> {
    let source: Box<dyn MetricSource> = match name {
        "Test" => Box::new(TestCollector::new(outbound)),
        "CPU" => Box::new(CpuCollector::new(outbound)),
        _ => {
            error!(collector = name, "Cannot create collector");
            return Err(CollectorError::unknown(name, KNOWN_COLLECTORS));
        }
    };
    info!(collector = name, "Collector created");
    Ok(source)
}

/// Create a source together with a fresh outbound queue
///
/// Returns the source and the consumer half of its queue.
pub fn create_with_queue(
    name: &str,
    queue_capacity: usize,
) -> Result<(Box<dyn MetricSource>, MetricReceiver)> {
    let (queue, rx) = metric_queue(name, queue_capacity);
    let source = create(name, queue)?;
    Ok((source, rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_collectors() {
        for name in KNOWN_COLLECTORS {
            let (source, _rx) = create_with_queue(name, 10).unwrap();
            assert_eq!(source.name(), *name);
        }
    }

    #[test]
    fn test_unknown_collector_is_error() {
        let result = create_with_queue("Diamond", 10);
        match result {
            Err(CollectorError::UnknownCollector { name, known }) => {
                assert_eq!(name, "Diamond");
                assert!(known.contains("CPU"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("unknown collector must not produce a source"),
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert!(create_with_queue("cpu", 10).is_err());
    }
}
