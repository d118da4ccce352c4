//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or failed validation
    #[error("Failed to load configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// A configured collector could not be created
    #[error("Collector startup failed: {0}")]
    Collector(#[from] collectors::CollectorError),

    /// A configured handler could not be created
    #[error("Handler startup failed: {0}")]
    Handler(#[from] dispatcher::DispatcherError),

    /// Nothing would be collected
    #[error("No collectors configured")]
    NoCollectors,

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
