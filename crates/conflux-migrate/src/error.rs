//! Error types for transformations and migrations

use crate::engine::SchemaRef;
use conflux_node::{NodeError, NodePath, PathError};
use conflux_ops::OpsError;

/// Errors raised while building or applying transformations
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// An action failed on the node at `path`
    #[error("transformation action failed at {path}: {source}")]
    Action {
        path: NodePath,
        #[source]
        source: Box<MigrationError>,
    },

    /// The migration engine rejected a value
    #[error("migration engine failed for schema {schema}: {message}")]
    Engine { schema: SchemaRef, message: String },

    #[error(transparent)]
    Ops(#[from] OpsError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("invalid path pattern: {0}")]
    Pattern(#[from] PathError),

    /// The version marker at `path` is not a whole number
    #[error("version marker at {path} is not a whole number: found {found}")]
    InvalidVersion { path: NodePath, found: String },

    /// Builder used without a migration engine
    #[error("a migration engine must be provided")]
    MissingEngine,

    /// No explicit target and the engine knows no versions
    #[error("no target version: engine reports latest version {latest}")]
    NoTargetVersion { latest: i32 },
}

impl MigrationError {
    /// Engine failure for `schema`
    #[must_use]
    pub fn engine(schema: &SchemaRef, message: impl Into<String>) -> Self {
        Self::Engine {
            schema: schema.clone(),
            message: message.into(),
        }
    }

    /// Path of the failing node, for action failures
    #[must_use]
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            Self::Action { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Innermost error, unwrapping action failures
    #[must_use]
    pub fn root_cause(&self) -> &MigrationError {
        match self {
            Self::Action { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
