//! Boundary to the external migration rule engine

use crate::error::MigrationError;
use crate::transformation::{MigrationScope, TransformAction};
use crate::versioned::read_version;
use conflux_node::{Node, NodePath};
use conflux_ops::{Dynamic, NodeOps};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Opaque name of the rule set an engine applies to a value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaRef(Arc<str>);

impl SchemaRef {
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for SchemaRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Upgrades values between schema versions
///
/// The engine only sees values through [`Dynamic`]; when and where it runs
/// is decided by the transformation driving it.
pub trait MigrationEngine: Send + Sync {
    /// Upgrade `input` from version `from` to version `to`
    ///
    /// # Errors
    /// Returns [`MigrationError::Engine`] if the value cannot be upgraded
    fn update(
        &self,
        schema: &SchemaRef,
        input: Dynamic<NodeOps>,
        from: i32,
        to: i32,
    ) -> Result<Dynamic<NodeOps>, MigrationError>;

    /// Highest version this engine has rules for
    fn latest_version(&self) -> i32;
}

/// Run `engine` on `node` and replace its value with the result
///
/// The node is left untouched if the engine fails.
pub(crate) fn run_engine(
    engine: &dyn MigrationEngine,
    schema: &SchemaRef,
    node: &mut Node,
    from: i32,
    to: i32,
) -> Result<(), MigrationError> {
    let upgraded = engine.update(schema, NodeOps::wrap(node.copy()), from, to)?;
    node.set(upgraded.into_value());
    Ok(())
}

/// Action upgrading each matched node by the version stored inside it
///
/// The version is read from `version_key` relative to the matched node, the
/// same way [`VersionedTransformation`](crate::VersionedTransformation) reads
/// its marker (`-1` if absent). Nodes already at or above `target` are left
/// alone.
#[must_use]
pub fn engine_action(
    engine: Arc<dyn MigrationEngine>,
    schema: SchemaRef,
    target: i32,
    version_key: NodePath,
) -> TransformAction {
    Arc::new(move |path: &NodePath, node: &mut Node, _scope: &MigrationScope| {
        let current = read_version(node, &version_key)?;
        if current >= target {
            tracing::trace!(%path, current, target, "node already current");
            return Ok(());
        }
        run_engine(engine.as_ref(), &schema, node, current, target)
    })
}
