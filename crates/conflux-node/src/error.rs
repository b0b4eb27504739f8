//! Error types for node access and serialization

use crate::path::NodePath;
use crate::scalar::ScalarKind;

/// Boxed error used as the source of serialization failures raised by
/// serializers living in other crates
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while reading, writing or converting nodes
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// A value could not be (de)serialized at a node
    #[error("{message} (at {path})")]
    Serialization {
        path: NodePath,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A scalar outside the supported kinds was encountered at a format boundary
    #[error("scalar '{value}' has an unsupported type: {kind}")]
    UnsupportedScalarType { value: String, kind: String },

    /// A scalar was expected
    #[error("expected a scalar of kind {expected} at {path}")]
    NotAScalar { path: NodePath, expected: ScalarKind },

    /// No serializer registered for the requested type
    #[error("no serializer registered for type {type_name}")]
    NoSerializer { type_name: &'static str },

    /// Format adapter failure (JSON/YAML text)
    #[error("format error: {0}")]
    Format(String),
}

impl NodeError {
    /// Serialization failure without an underlying cause
    #[must_use]
    pub fn serialization(path: NodePath, message: impl Into<String>) -> Self {
        Self::Serialization {
            path,
            message: message.into(),
            source: None,
        }
    }

    /// Serialization failure wrapping a lower-level error
    #[must_use]
    pub fn with_source(
        path: NodePath,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Serialization {
            path,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Path at which the failure happened, if known
    #[must_use]
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            Self::Serialization { path, .. } | Self::NotAScalar { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Replace the path of a serialization failure
    ///
    /// Used when a child's error is re-raised by its parent, which knows the
    /// child's absolute position.
    #[must_use]
    pub fn at(mut self, new_path: NodePath) -> Self {
        if let Self::Serialization { path, .. } | Self::NotAScalar { path, .. } = &mut self {
            *path = new_path;
        }
        self
    }

    /// Downcast the underlying cause of a serialization failure
    #[must_use]
    pub fn source_as<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Serialization {
                source: Some(source),
                ..
            } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

impl From<serde_yaml::Error> for NodeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Format(err.to_string())
    }
}
