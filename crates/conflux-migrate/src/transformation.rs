//! Path-scoped tree transformations
//!
//! A [`NodeTransformation`] is an ordered list of `(pattern, action)` pairs.
//! Applying it runs each action on every node its pattern selects.

use crate::error::MigrationError;
use crate::pattern::PathPattern;
use conflux_node::{Node, NodePath};
use std::fmt;
use std::sync::Arc;

/// Per-call migration state handed to every action
///
/// Each `apply` call builds its own scope, so concurrent applications of one
/// transformation never share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationScope {
    current_version: i32,
    target_version: i32,
}

impl MigrationScope {
    #[inline]
    #[must_use]
    pub fn new(current_version: i32, target_version: i32) -> Self {
        Self {
            current_version,
            target_version,
        }
    }

    /// Scope for transformations that are not version-gated
    #[inline]
    #[must_use]
    pub fn unversioned() -> Self {
        Self::new(-1, -1)
    }

    /// Version of the tree before this migration
    #[inline]
    #[must_use]
    pub fn current_version(&self) -> i32 {
        self.current_version
    }

    #[inline]
    #[must_use]
    pub fn target_version(&self) -> i32 {
        self.target_version
    }
}

impl Default for MigrationScope {
    fn default() -> Self {
        Self::unversioned()
    }
}

/// Rewrites the node at a matched path in place
pub type TransformAction =
    Arc<dyn Fn(&NodePath, &mut Node, &MigrationScope) -> Result<(), MigrationError> + Send + Sync>;

/// Something that rewrites a tree
pub trait Transformation: Send + Sync {
    /// Apply with an explicit scope
    ///
    /// # Errors
    /// Returns the first action failure; earlier actions stay applied
    fn apply_in(&self, node: &mut Node, scope: &MigrationScope) -> Result<(), MigrationError>;

    /// Apply to `node`
    ///
    /// # Errors
    /// Returns the first action failure
    fn apply(&self, node: &mut Node) -> Result<(), MigrationError> {
        self.apply_in(node, &MigrationScope::unversioned())
    }
}

/// Ordered `(pattern, action)` pairs
#[derive(Clone, Default)]
pub struct NodeTransformation {
    actions: Vec<(PathPattern, TransformAction)>,
}

impl NodeTransformation {
    #[inline]
    #[must_use]
    pub fn builder() -> NodeTransformationBuilder {
        NodeTransformationBuilder::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Patterns in application order
    pub fn patterns(&self) -> impl Iterator<Item = &PathPattern> {
        self.actions.iter().map(|(pattern, _)| pattern)
    }
}

impl Transformation for NodeTransformation {
    fn apply_in(&self, node: &mut Node, scope: &MigrationScope) -> Result<(), MigrationError> {
        for (pattern, action) in &self.actions {
            for path in pattern.matches(node) {
                let Some(target) = node.at_mut(&path) else {
                    continue;
                };
                action(&path, target, scope).map_err(|source| MigrationError::Action {
                    path: path.clone(),
                    source: Box::new(source),
                })?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for NodeTransformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTransformation")
            .field("patterns", &self.patterns().map(ToString::to_string).collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`NodeTransformation`]
#[derive(Default)]
pub struct NodeTransformationBuilder {
    actions: Vec<(PathPattern, TransformAction)>,
}

impl NodeTransformationBuilder {
    /// Add an action; actions run in the order they were added
    #[must_use]
    pub fn add_action(mut self, pattern: impl Into<PathPattern>, action: TransformAction) -> Self {
        self.actions.push((pattern.into(), action));
        self
    }

    /// Add an action from a closure
    #[must_use]
    pub fn add_fn<F>(self, pattern: impl Into<PathPattern>, action: F) -> Self
    where
        F: Fn(&NodePath, &mut Node, &MigrationScope) -> Result<(), MigrationError>
            + Send
            + Sync
            + 'static,
    {
        self.add_action(pattern, Arc::new(action))
    }

    #[must_use]
    pub fn build(self) -> NodeTransformation {
        NodeTransformation {
            actions: self.actions,
        }
    }
}
