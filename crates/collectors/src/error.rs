//! Collector error types

use contracts::ContractError;
use thiserror::Error;

/// Collector specific error
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Name not present in the registry
    #[error("cannot create collector '{name}': unknown name (known: {known})")]
    UnknownCollector { name: String, known: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl CollectorError {
    /// Create unknown collector error
    pub fn unknown(name: impl Into<String>, known: &[&str]) -> Self {
        Self::UnknownCollector {
            name: name.into(),
            known: known.join(", "),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, CollectorError>;
