//! Conflux Migrate
//!
//! Path-scoped transformations over configuration trees and the
//! version-gated migration pipeline built on top of them.
//!
//! # Core Concepts
//!
//! - [`PathPattern`]: dotted path with `*` wildcards selecting nodes
//! - [`NodeTransformation`]: ordered `(pattern, action)` pairs
//! - [`MigrationEngine`]: external rule engine upgrading values between versions
//! - [`VersionedTransformation`]: runs engine rules only on stale trees, then
//!   records the new version
//!
//! # Example
//!
//! ```rust
//! use conflux_migrate::{NodeTransformation, Transformation};
//! use conflux_node::Node;
//!
//! let double = NodeTransformation::builder()
//!     .add_fn(["items", "*", "Count"], |_, node, _| {
//!         let count = node.as_i32().unwrap_or(0);
//!         node.set(count * 2);
//!         Ok(())
//!     })
//!     .build();
//!
//! let mut tree = Node::from_json_str(r#"{"items": [{"Count": 3}]}"#).unwrap();
//! double.apply(&mut tree).unwrap();
//! assert_eq!(tree.to_json().unwrap(), serde_json::json!({"items": [{"Count": 6}]}));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod engine;
mod error;
mod pattern;
mod transformation;
mod versioned;

pub use engine::{engine_action, MigrationEngine, SchemaRef};
pub use error::MigrationError;
pub use pattern::PathPattern;
pub use transformation::{
    MigrationScope, NodeTransformation, NodeTransformationBuilder, TransformAction,
    Transformation,
};
pub use versioned::{
    MigrationOutcome, VersionedTransformation, VersionedTransformationBuilder,
    DEFAULT_VERSION_KEY, UNVERSIONED,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
