//! CPU collector
//!
//! Reads the `cpu*` lines of `/proc/stat` and emits the busy percentage of
//! each line since the previous pass as `cpu.usage{cpu=<label>}`. The first
//! pass only primes the counters.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use contracts::{ContractError, Metric, MetricQueue, MetricSource, DEFAULT_INTERVAL_SECS};
use tracing::{debug, trace};

use crate::scheduler::publish;

/// Default counters file
pub const PROC_STAT_PATH: &str = "/proc/stat";

/// Name of the emitted metric
pub const CPU_USAGE_METRIC: &str = "cpu.usage";

/// Jiffy totals for one `cpu*` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTimes {
    pub busy: u64,
    pub total: u64,
}

/// Parse the `cpu*` lines of a `/proc/stat` dump
///
/// Fields: user nice system idle iowait irq softirq steal ...
/// idle and iowait count as idle time.
pub fn parse_proc_stat(content: &str) -> Vec<(String, CpuTimes)> {
    content
        .lines()
        .filter(|line| line.starts_with("cpu"))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let label = fields.next()?.to_string();
            let values: Vec<u64> = fields.filter_map(|f| f.parse().ok()).collect();
            if values.len() < 4 {
                return None;
            }
            let total: u64 = values.iter().sum();
            let idle = values[3] + values.get(4).copied().unwrap_or(0);
            Some((
                label,
                CpuTimes {
                    busy: total.saturating_sub(idle),
                    total,
                },
            ))
        })
        .collect()
}

/// Host CPU usage source
pub struct CpuCollector {
    interval: Duration,
    outbound: MetricQueue,
    stat_path: PathBuf,
    previous: HashMap<String, CpuTimes>,
}

impl CpuCollector {
    /// Create a CPU collector reading `/proc/stat`
    pub fn new(outbound: MetricQueue) -> Self {
        Self::with_stat_path(outbound, PROC_STAT_PATH)
    }

    /// Create a CPU collector reading counters from `path`
    pub fn with_stat_path(outbound: MetricQueue, path: impl Into<PathBuf>) -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            outbound,
            stat_path: path.into(),
            previous: HashMap::new(),
        }
    }

    fn read_counters(&self) -> Result<Vec<(String, CpuTimes)>, ContractError> {
        let content = std::fs::read_to_string(&self.stat_path).map_err(|e| {
            ContractError::sample(
                "CPU",
                format!("failed to read {}: {e}", self.stat_path.display()),
            )
        })?;
        let counters = parse_proc_stat(&content);
        if counters.is_empty() {
            return Err(ContractError::sample(
                "CPU",
                format!("no cpu lines in {}", self.stat_path.display()),
            ));
        }
        Ok(counters)
    }
}

impl MetricSource for CpuCollector {
    fn name(&self) -> &str {
        "CPU"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn sample(&mut self) -> Result<(), ContractError> {
        let counters = self.read_counters()?;
        let mut emitted = 0usize;

        for (label, now) in counters {
            if let Some(prev) = self.previous.get(&label) {
                let total = now.total.saturating_sub(prev.total);
                if total > 0 {
                    let busy = now.busy.saturating_sub(prev.busy);
                    let usage = busy as f64 * 100.0 / total as f64;
                    let metric =
                        Metric::gauge(CPU_USAGE_METRIC, usage)?.with_dimension("cpu", label.as_str());
                    if publish(&self.outbound, metric) {
                        emitted += 1;
                    }
                } else {
                    trace!(cpu = %label, "No jiffies elapsed, skipping");
                }
            }
            self.previous.insert(label, now);
        }

        debug!(emitted, "CPU collector sampled");
        Ok(())
    }

    fn outbound(&self) -> &MetricQueue {
        &self.outbound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::metric_queue;
    use std::io::Write;

    const STAT_T0: &str = "cpu  100 0 100 800 0 0 0 0 0 0
cpu0 50 0 50 400 0 0 0 0 0 0
cpu1 50 0 50 400 0 0 0 0 0 0
intr 12345
ctxt 999
";

    const STAT_T1: &str = "cpu  200 0 200 1000 0 0 0 0 0 0
cpu0 150 0 50 400 0 0 0 0 0 0
cpu1 50 0 150 600 0 0 0 0 0 0
intr 12400
";

    #[test]
    fn test_parse_proc_stat() {
        let parsed = parse_proc_stat(STAT_T0);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].0, "cpu");
        assert_eq!(parsed[0].1, CpuTimes { busy: 200, total: 1000 });
        assert_eq!(parsed[1].0, "cpu0");
    }

    #[test]
    fn test_parse_counts_iowait_as_idle() {
        let parsed = parse_proc_stat("cpu 10 0 10 70 10 0 0 0");
        assert_eq!(parsed[0].1, CpuTimes { busy: 20, total: 100 });
    }

    #[test]
    fn test_parse_skips_short_lines() {
        assert!(parse_proc_stat("cpu 1 2\n").is_empty());
    }

    #[tokio::test]
    async fn test_first_sample_primes_second_emits() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(STAT_T0.as_bytes()).unwrap();

        let (queue, mut rx) = metric_queue("CPU", 10);
        let mut collector = CpuCollector::with_stat_path(queue, file.path());

        collector.sample().unwrap();
        assert!(rx.try_recv().is_none());

        std::fs::write(file.path(), STAT_T1).unwrap();
        collector.sample().unwrap();

        let mut usage = HashMap::new();
        while let Some(metric) = rx.try_recv() {
            assert_eq!(metric.name(), CPU_USAGE_METRIC);
            usage.insert(metric.dimensions()["cpu"].clone(), metric.value());
        }
        assert_eq!(usage.len(), 3);
        // aggregate: busy +200 of total +400
        assert!((usage["cpu"] - 50.0).abs() < 1e-9);
        // cpu0: busy +100 of total +100
        assert!((usage["cpu0"] - 100.0).abs() < 1e-9);
        // cpu1: busy +100 of total +300
        assert!((usage["cpu1"] - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file_is_sample_error() {
        let (queue, _rx) = metric_queue("CPU", 10);
        let mut collector = CpuCollector::with_stat_path(queue, "/nonexistent/stat");
        let result = collector.sample();
        assert!(matches!(result, Err(ContractError::Sample { .. })));
    }
}
