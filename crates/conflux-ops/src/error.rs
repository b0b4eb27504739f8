//! Error types for value operations

use conflux_node::NodeError;

/// Errors raised by [`DynamicOps`](crate::DynamicOps) implementations
#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error("not a map: {0}")]
    NotAMap(String),

    #[error("not a list: {0}")]
    NotAList(String),

    #[error("not a scalar: {0}")]
    NotAScalar(String),

    #[error("not a number: {0}")]
    NotANumber(String),

    #[error("not a string: {0}")]
    NotAString(String),

    #[error("not a boolean: {0}")]
    NotABoolean(String),

    /// Lookup of a key that has no value
    #[error("no element {key} in the map {input}")]
    KeyAbsent { key: String, input: String },

    /// A merge was attempted on a value of the wrong shape
    #[error("{operation} called on a value of the wrong shape: {input}")]
    TypeMismatch {
        operation: &'static str,
        input: String,
    },

    /// A scalar outside the supported kinds
    #[error("scalar value '{value}' has an unsupported type: {kind}")]
    UnsupportedScalarType { value: String, kind: String },

    /// Codec-level failure
    #[error("codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Node(#[from] NodeError),
}

impl OpsError {
    #[must_use]
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }
}
