//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::AgentConfig;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    interval_secs: u64,
    collector_count: usize,
    handler_count: usize,
    default_dimension_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    interval_secs: config.interval,
                    collector_count: config.collectors.len(),
                    handler_count: config.handlers.len(),
                    default_dimension_count: config.default_dimensions.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
///
/// Unknown collector or handler names are reported here; `run` refuses to
/// start with them.
fn collect_warnings(config: &AgentConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.collectors.is_empty() {
        warnings.push("No collectors configured - nothing will be sampled".to_string());
    }
    for collector in &config.collectors {
        if !collectors::KNOWN_COLLECTORS.contains(&collector.as_str()) {
            warnings.push(format!("Unknown collector '{}'", collector));
        }
    }

    if config.handlers.is_empty() {
        warnings.push("No handlers configured - metrics will be discarded".to_string());
    }
    let mut handlers: Vec<_> = config.handlers.iter().collect();
    handlers.sort_by(|a, b| a.0.cmp(b.0));
    for (name, options) in handlers {
        if !dispatcher::KNOWN_SINKS.contains(&name.as_str()) {
            warnings.push(format!("Unknown handler '{}'", name));
        }
        if name == "SignalFx" {
            for key in dispatcher::sinks::SIGNALFX_OPTION_KEYS {
                if options.get(*key).is_none_or(|v| v.trim().is_empty()) {
                    warnings.push(format!(
                        "Handler 'SignalFx' has no '{}' - there won't be any emissions",
                        key
                    ));
                }
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Interval: {}s", summary.interval_secs);
            println!("  Collectors: {}", summary.collector_count);
            println!("  Handlers: {}", summary.handler_count);
            println!("  Default dimensions: {}", summary.default_dimension_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
