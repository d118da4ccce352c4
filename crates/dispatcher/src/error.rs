//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink name not present in the registry
    #[error("cannot create sink '{name}': unknown name (known: {known})")]
    UnknownSink { name: String, known: String },

    /// Sink error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create an unknown sink error
    pub fn unknown_sink(name: impl Into<String>, known: &[&str]) -> Self {
        Self::UnknownSink {
            name: name.into(),
            known: known.join(", "),
        }
    }
}
