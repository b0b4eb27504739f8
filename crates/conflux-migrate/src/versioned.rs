//! Version-gated migrations
//!
//! A [`VersionedTransformation`] reads the version stored at its version path,
//! runs its path rules only when that version is older than the target, and
//! writes the target version once every rule has succeeded. Running it again
//! on a migrated tree does nothing.

use crate::engine::{run_engine, MigrationEngine, SchemaRef};
use crate::error::MigrationError;
use crate::pattern::PathPattern;
use crate::transformation::{MigrationScope, NodeTransformation, Transformation};
use conflux_node::{Node, NodePath};
use std::fmt;
use std::sync::Arc;

/// Version path used when none is configured
pub const DEFAULT_VERSION_KEY: &str = "dfu-version";

/// Version of a tree without a version marker
pub const UNVERSIONED: i32 = -1;

/// What [`VersionedTransformation::migrate`] did to a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Rules ran and the version marker now holds `to`
    Migrated { from: i32, to: i32 },
    /// Tree was already at the target version
    Current,
    /// Tree is newer than the target and was left untouched
    Future { version: i32 },
}

impl MigrationOutcome {
    #[inline]
    #[must_use]
    pub fn is_migrated(&self) -> bool {
        matches!(self, Self::Migrated { .. })
    }
}

pub struct VersionedTransformation {
    version_path: NodePath,
    target_version: i32,
    wrapped: NodeTransformation,
}

impl VersionedTransformation {
    #[inline]
    #[must_use]
    pub fn builder() -> VersionedTransformationBuilder {
        VersionedTransformationBuilder::default()
    }

    #[inline]
    #[must_use]
    pub fn version_path(&self) -> &NodePath {
        &self.version_path
    }

    #[inline]
    #[must_use]
    pub fn target_version(&self) -> i32 {
        self.target_version
    }

    /// Version stored in `node`, or [`UNVERSIONED`] if it has no marker
    ///
    /// # Errors
    /// Returns [`MigrationError::InvalidVersion`] if the marker is not a
    /// whole number
    pub fn version(&self, node: &Node) -> Result<i32, MigrationError> {
        read_version(node, &self.version_path)
    }

    /// Upgrade `node` in place
    ///
    /// # Errors
    /// Returns [`MigrationError::InvalidVersion`] for an unreadable marker,
    /// leaving the tree untouched. Otherwise returns the first rule failure;
    /// the version marker is not written in that case, but rules that
    /// already ran stay applied.
    pub fn migrate(&self, node: &mut Node) -> Result<MigrationOutcome, MigrationError> {
        let current = self.version(node)?;
        let target = self.target_version;

        if current > target {
            tracing::warn!(
                current,
                target,
                "tree is newer than the migration target; downgrades are not supported"
            );
            return Ok(MigrationOutcome::Future { version: current });
        }
        if current == target {
            return Ok(MigrationOutcome::Current);
        }

        let scope = MigrationScope::new(current, target);
        self.wrapped.apply_in(node, &scope)?;
        node.at_or_insert(&self.version_path).set(target);

        tracing::debug!(from = current, to = target, "migrated tree");
        Ok(MigrationOutcome::Migrated {
            from: current,
            to: target,
        })
    }
}

/// Version marker at `path` below `node`
///
/// A missing or empty marker reads as [`UNVERSIONED`]. Floats are accepted
/// when they hold a whole number, and values outside the `i32` range
/// saturate, so an oversized marker still reads as newer than any target.
pub(crate) fn read_version(node: &Node, path: &NodePath) -> Result<i32, MigrationError> {
    let Some(marker) = node.at(path).filter(|marker| !marker.is_virtual()) else {
        return Ok(UNVERSIONED);
    };
    let invalid = || MigrationError::InvalidVersion {
        path: path.clone(),
        found: describe_marker(marker),
    };

    let number = marker.as_number().ok_or_else(invalid)?;
    if !number.is_integral() {
        let value = number.as_f64();
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(invalid());
        }
    }
    let version = number.as_i64();
    Ok(i32::try_from(version).unwrap_or(if version < 0 { i32::MIN } else { i32::MAX }))
}

fn describe_marker(marker: &Node) -> String {
    match marker.scalar() {
        Some(scalar) => format!("{} `{scalar}`", scalar.kind()),
        None if marker.is_map() => "map".to_string(),
        None => "list".to_string(),
    }
}

impl Transformation for VersionedTransformation {
    /// The scope is derived from `node`; the one passed in is ignored
    fn apply_in(&self, node: &mut Node, _scope: &MigrationScope) -> Result<(), MigrationError> {
        self.migrate(node).map(|_| ())
    }
}

impl fmt::Debug for VersionedTransformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedTransformation")
            .field("version_path", &self.version_path.to_string())
            .field("target_version", &self.target_version)
            .field("rules", &self.wrapped.len())
            .finish()
    }
}

/// Builder for [`VersionedTransformation`]
pub struct VersionedTransformationBuilder {
    version_path: NodePath,
    target_version: Option<i32>,
    engine: Option<Arc<dyn MigrationEngine>>,
    rules: Vec<(SchemaRef, PathPattern)>,
}

impl Default for VersionedTransformationBuilder {
    fn default() -> Self {
        Self {
            version_path: NodePath::single(DEFAULT_VERSION_KEY),
            target_version: None,
            engine: None,
            rules: Vec::new(),
        }
    }
}

impl VersionedTransformationBuilder {
    /// Where the version marker lives, relative to the root
    #[must_use]
    pub fn version_path(mut self, path: NodePath) -> Self {
        self.version_path = path;
        self
    }

    /// Explicit target; defaults to the engine's latest version
    #[must_use]
    pub fn target_version(mut self, version: i32) -> Self {
        self.target_version = Some(version);
        self
    }

    #[must_use]
    pub fn engine(mut self, engine: Arc<dyn MigrationEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Upgrade every node matching `pattern` with the engine rules for `schema`
    #[must_use]
    pub fn add_path_rule(
        mut self,
        schema: impl Into<SchemaRef>,
        pattern: impl Into<PathPattern>,
    ) -> Self {
        self.rules.push((schema.into(), pattern.into()));
        self
    }

    /// # Errors
    /// Returns [`MigrationError::MissingEngine`] without an engine, and
    /// [`MigrationError::NoTargetVersion`] if no target is set and the engine
    /// knows no versions
    pub fn build(self) -> Result<VersionedTransformation, MigrationError> {
        let engine = self.engine.ok_or(MigrationError::MissingEngine)?;
        let target_version = match self.target_version {
            Some(version) => version,
            None => {
                let latest = engine.latest_version();
                if latest < 0 {
                    return Err(MigrationError::NoTargetVersion { latest });
                }
                latest
            }
        };

        let mut builder = NodeTransformation::builder();
        for (schema, pattern) in self.rules {
            let engine = Arc::clone(&engine);
            builder = builder.add_fn(pattern, move |_path, node, scope| {
                run_engine(
                    engine.as_ref(),
                    &schema,
                    node,
                    scope.current_version(),
                    scope.target_version(),
                )
            });
        }
        let wrapped = builder.build();

        Ok(VersionedTransformation {
            version_path: self.version_path,
            target_version,
            wrapped,
        })
    }
}
