//! Error types for identifiers, registries and reference sets

use crate::identifier::Identifier;
use conflux_node::{NodeError, NodePath};

/// Errors raised while parsing identifiers or resolving registry references
#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    /// Malformed namespace or path
    #[error("invalid identifier '{input}': {reason}")]
    InvalidIdentifier { input: String, reason: String },

    /// A node did not have any of the accepted shapes
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A required entry could not be found in its registry
    #[error("unresolved reference {reference} in registry {registry}")]
    UnresolvedReference {
        registry: Identifier,
        reference: String,
    },

    /// The registry has not been supplied by the host yet
    #[error("no registry {registry} present in the current context")]
    RegistryUnavailable { registry: Identifier },

    /// A key or value has no counterpart in the registry
    #[error("{what} not found in registry {registry}")]
    NotFound { registry: Identifier, what: String },

    /// A registry reference points into a different registry than expected
    #[error("reference belongs to registry {actual}, expected {expected}")]
    RegistryMismatch {
        expected: Identifier,
        actual: Identifier,
    },

    /// Underlying node failure
    #[error(transparent)]
    Node(#[from] NodeError),
}

impl SymbolError {
    /// True if retrying once the host supplies more registries may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RegistryUnavailable { .. })
    }

    pub(crate) fn invalid_identifier(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Convert into a node serialization error located at `path`
    #[must_use]
    pub fn into_node_error(self, path: NodePath) -> NodeError {
        match self {
            Self::Node(inner) => inner,
            other => NodeError::with_source(path, other.to_string(), other),
        }
    }
}

impl From<SymbolError> for NodeError {
    fn from(err: SymbolError) -> Self {
        err.into_node_error(NodePath::root())
    }
}
