//! Configuration validation
//!
//! Rules:
//! - interval > 0
//! - queueCapacity > 0
//! - collector names non-empty and unique
//! - handler names non-empty
//! - default dimension keys non-empty

use std::collections::HashSet;

use contracts::{AgentConfig, ContractError};

/// Validate AgentConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &AgentConfig) -> Result<(), ContractError> {
    validate_interval(config)?;
    validate_queue_capacity(config)?;
    validate_collectors(config)?;
    validate_handlers(config)?;
    validate_default_dimensions(config)?;
    Ok(())
}

fn validate_interval(config: &AgentConfig) -> Result<(), ContractError> {
    if config.interval == 0 {
        return Err(ContractError::config_validation(
            "interval",
            "interval must be > 0",
        ));
    }
    Ok(())
}

fn validate_queue_capacity(config: &AgentConfig) -> Result<(), ContractError> {
    if config.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "queueCapacity",
            "queueCapacity must be > 0",
        ));
    }
    Ok(())
}

fn validate_collectors(config: &AgentConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, name) in config.collectors.iter().enumerate() {
        if name.is_empty() {
            return Err(ContractError::config_validation(
                format!("collectors[{idx}]"),
                "collector name cannot be empty",
            ));
        }
        if !seen.insert(name) {
            return Err(ContractError::config_validation(
                format!("collectors[{idx}]"),
                format!("duplicate collector '{name}'"),
            ));
        }
    }
    Ok(())
}

fn validate_handlers(config: &AgentConfig) -> Result<(), ContractError> {
    if config.handlers.keys().any(String::is_empty) {
        return Err(ContractError::config_validation(
            "handlers",
            "handler name cannot be empty",
        ));
    }
    Ok(())
}

fn validate_default_dimensions(config: &AgentConfig) -> Result<(), ContractError> {
    if config.default_dimensions.keys().any(String::is_empty) {
        return Err(ContractError::config_validation(
            "defaultDimensions",
            "dimension key cannot be empty",
        ));
    }
    Ok(())
}
