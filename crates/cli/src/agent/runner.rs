//! Agent runner - wires collectors, dispatcher and handlers together.

use std::future::Future;
use std::time::{Duration, Instant};

use collectors::SourceHandle;
use contracts::AgentConfig;
use tracing::{info, warn};

use super::AgentStats;
use crate::error::{CliError, Result};

/// Time allowed for handlers to flush their residual batches
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Agent run configuration
#[derive(Debug, Clone)]
pub struct AgentRunConfig {
    /// Loaded agent configuration (CLI overrides applied)
    pub agent: AgentConfig,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main agent orchestrator
pub struct Agent {
    config: AgentRunConfig,
}

impl Agent {
    /// Create a new agent with the given configuration
    pub fn new(config: AgentRunConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves
    ///
    /// Every collector is created before anything starts, so an unknown
    /// collector or handler name aborts startup with nothing running.
    pub async fn run<F>(self, shutdown: F) -> Result<AgentStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let config = &self.config.agent;

        if config.collectors.is_empty() {
            return Err(CliError::NoCollectors);
        }

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Collectors
        let interval = Duration::from_secs(config.interval);
        let mut sources = Vec::with_capacity(config.collectors.len());
        let mut receivers = Vec::with_capacity(config.collectors.len());
        for name in &config.collectors {
            let (mut source, receiver) =
                collectors::create_with_queue(name, config.queue_capacity)?;
            source.set_interval(interval);
            sources.push(source);
            receivers.push(receiver);
        }
        info!(collectors = sources.len(), interval_secs = config.interval, "Collectors created");

        // Handlers
        if config.handlers.is_empty() {
            warn!("No handlers configured - metrics will be discarded");
        }
        let dispatcher = dispatcher::create_dispatcher(config, receivers).await?;
        info!(handlers = ?dispatcher.sink_names(), "Dispatcher started");
        let dispatcher_task = dispatcher.spawn();

        let active_sources = sources.len();
        let handles: Vec<SourceHandle> = sources.into_iter().map(SourceHandle::spawn).collect();
        info!(active_sources, "Agent running");

        shutdown.await;

        info!("Shutting down agent...");
        for handle in handles {
            handle.shutdown().await;
        }

        let sinks = match tokio::time::timeout(SHUTDOWN_GRACE, dispatcher_task).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                warn!(error = %e, "Dispatcher task failed");
                Vec::new()
            }
            Err(_) => {
                warn!(grace_secs = SHUTDOWN_GRACE.as_secs(), "Handlers did not finish flushing");
                Vec::new()
            }
        };

        let stats = AgentStats {
            duration: start_time.elapsed(),
            active_sources,
            sinks,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            received = stats.metrics_received(),
            sent = stats.datapoints_sent(),
            "Agent shutdown complete"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn run_config(collectors: &[&str], handlers: &[&str]) -> AgentRunConfig {
        AgentRunConfig {
            agent: AgentConfig {
                interval: 1,
                collectors: collectors.iter().map(|c| c.to_string()).collect(),
                handlers: handlers
                    .iter()
                    .map(|h| (h.to_string(), HashMap::new()))
                    .collect(),
                ..AgentConfig::default()
            },
            metrics_port: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_collector_aborts_startup() {
        let agent = Agent::new(run_config(&["Test", "Diamond"], &["Log"]));
        let result = agent.run(std::future::ready(())).await;
        assert!(matches!(result, Err(CliError::Collector(_))));
    }

    #[tokio::test]
    async fn test_unknown_handler_aborts_startup() {
        let agent = Agent::new(run_config(&["Test"], &["Graphite"]));
        let result = agent.run(std::future::ready(())).await;
        assert!(matches!(result, Err(CliError::Handler(_))));
    }

    #[tokio::test]
    async fn test_no_collectors_is_error() {
        let agent = Agent::new(run_config(&[], &["Log"]));
        let result = agent.run(std::future::ready(())).await;
        assert!(matches!(result, Err(CliError::NoCollectors)));
    }

    #[tokio::test]
    async fn test_test_collector_reaches_log_handler() {
        let agent = Agent::new(run_config(&["Test"], &["Log"]));
        let stats = agent
            .run(tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();

        assert_eq!(stats.active_sources, 1);
        assert_eq!(stats.sinks.len(), 1);
        // first tick samples immediately
        assert!(stats.metrics_received() >= 1);
        assert_eq!(stats.datapoints_sent(), stats.metrics_received());
    }
}
