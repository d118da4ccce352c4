//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use contracts::AgentConfig;

use crate::agent::{Agent, AgentRunConfig};
use crate::cli::RunArgs;
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_agent(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut config, args);

    info!(
        collectors = ?config.collectors,
        handlers = config.handlers.len(),
        interval_secs = config.interval,
        prefix = %config.prefix,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let agent = Agent::new(AgentRunConfig {
        agent: config,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    let duration = (args.duration != 0).then(|| Duration::from_secs(args.duration));
    let stats = agent
        .run(shutdown_signal(duration))
        .await
        .context("Agent execution failed")?;

    stats.print_summary();
    info!("Telemetry agent finished");
    Ok(())
}

/// Apply CLI overrides on top of the file configuration
fn apply_overrides(config: &mut AgentConfig, args: &RunArgs) {
    if let Some(interval) = args.interval {
        if interval == 0 {
            warn!("Ignoring --interval 0");
        } else {
            info!(interval_secs = interval, "Overriding interval from CLI");
            config.interval = interval;
        }
    }
    if let Some(ref prefix) = args.prefix {
        info!(prefix = %prefix, "Overriding prefix from CLI");
        config.prefix = prefix.clone();
    }
}

/// Resolve on Ctrl+C, SIGTERM or after `duration`
async fn shutdown_signal(duration: Option<Duration>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C"),
        _ = terminate => warn!("Received SIGTERM"),
        _ = deadline => info!("Run duration elapsed"),
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &AgentConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Interval: {}s", config.interval);
    if !config.prefix.is_empty() {
        println!("Prefix: {}", config.prefix);
    }
    println!("Queue capacity: {}", config.queue_capacity);

    println!("\nCollectors ({}):", config.collectors.len());
    for collector in &config.collectors {
        println!("  - {}", collector);
    }

    let mut handlers: Vec<_> = config.handlers.keys().collect();
    handlers.sort();
    println!("\nHandlers ({}):", handlers.len());
    for handler in handlers {
        println!("  - {}", handler);
    }

    if !config.default_dimensions.is_empty() {
        println!("\nDefault dimensions:");
        for (key, value) in &config.default_dimensions {
            println!("  {} = {}", key, value);
        }
    }

    println!();
}
