//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{AgentConfig, Dimensions};

use crate::cli::InfoArgs;

/// Option keys whose values are never printed
const SECRET_KEYS: &[&str] = &["authToken"];

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    interval_secs: u64,
    prefix: String,
    queue_capacity: usize,
    collectors: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    default_dimensions: Dimensions,
    handlers: Vec<HandlerInfo>,
}

#[derive(Serialize)]
struct HandlerInfo {
    name: String,
    known: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    options: BTreeMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&config, args.handlers);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(config: &AgentConfig, with_options: bool) -> ConfigInfo {
    let mut handlers: Vec<HandlerInfo> = config
        .handlers
        .iter()
        .map(|(name, options)| HandlerInfo {
            name: name.clone(),
            known: dispatcher::KNOWN_SINKS.contains(&name.as_str()),
            options: if with_options {
                options
                    .iter()
                    .map(|(k, v)| (k.clone(), mask(k, v)))
                    .collect()
            } else {
                BTreeMap::new()
            },
        })
        .collect();
    handlers.sort_by(|a, b| a.name.cmp(&b.name));

    ConfigInfo {
        interval_secs: config.interval,
        prefix: config.prefix.clone(),
        queue_capacity: config.queue_capacity,
        collectors: config.collectors.clone(),
        default_dimensions: config.default_dimensions.clone(),
        handlers,
    }
}

fn mask(key: &str, value: &str) -> String {
    if SECRET_KEYS.contains(&key) && !value.is_empty() {
        "********".to_string()
    } else {
        value.to_string()
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("=== Telemetry Agent Configuration ===\n");

    println!("Global");
    println!("   ├─ Interval: {}s", info.interval_secs);
    println!("   ├─ Prefix: {}", if info.prefix.is_empty() { "(none)" } else { &info.prefix });
    println!("   └─ Queue capacity: {}", info.queue_capacity);

    println!("\nCollectors ({})", info.collectors.len());
    for (i, collector) in info.collectors.iter().enumerate() {
        let prefix = if i == info.collectors.len() - 1 { "└─" } else { "├─" };
        println!("   {} {}", prefix, collector);
    }

    if !info.default_dimensions.is_empty() {
        println!("\nDefault dimensions");
        for (key, value) in &info.default_dimensions {
            println!("   - {} = {}", key, value);
        }
    }

    println!("\nHandlers ({})", info.handlers.len());
    for (i, handler) in info.handlers.iter().enumerate() {
        let is_last = i == info.handlers.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };
        let marker = if handler.known { "" } else { " (unknown)" };
        println!("   {} {}{}", prefix, handler.name, marker);
        for (key, value) in &handler.options {
            println!("   {}   {} = {}", child_prefix, key, value);
        }
    }

    println!();
}
