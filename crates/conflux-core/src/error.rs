//! Error type for the Conflux context
//!
//! Wraps the errors of every lower crate so hosts can use a single type.

use conflux_migrate::MigrationError;
use conflux_node::{NodeError, PathError};
use conflux_ops::OpsError;
use conflux_symbol::SymbolError;

/// Main Conflux error type
#[derive(Debug, thiserror::Error)]
pub enum ConfluxError {
    #[error("node error: {0}")]
    Node(#[from] NodeError),

    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    #[error("symbol error: {0}")]
    Symbol(#[from] SymbolError),

    #[error("ops error: {0}")]
    Ops(#[from] OpsError),

    #[error("migration failed: {0}")]
    Migration(#[from] MigrationError),

    /// Configuration text could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("configuration could not be written: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Configuration parsed but holds an unusable value
    #[error("invalid configuration value for {field}: {message}")]
    InvalidConfig { field: &'static str, message: String },
}

impl ConfluxError {
    /// True if the failure may go away once the host publishes more registries
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Symbol(err) => err.is_retryable(),
            Self::Node(err) => err
                .source_as::<SymbolError>()
                .is_some_and(SymbolError::is_retryable),
            _ => false,
        }
    }
}

/// Result alias for context operations
pub type Result<T> = std::result::Result<T, ConfluxError>;
