//! Conflux Node
//!
//! Mutable configuration trees shared by format adapters, serializers and
//! the migration pipeline.
//!
//! # Core Concepts
//!
//! - [`Node`]: a null, scalar, list or map value with copy-on-write semantics
//! - [`Scalar`]: closed set of leaf value kinds
//! - [`NodePath`]: hierarchical addressing within a tree
//! - [`NodeOptions`]: per-tree options inherited by children and copies
//! - [`TypeSerializer`]: typed conversion to and from nodes
//!
//! # Example
//!
//! ```rust
//! use conflux_node::{Node, NodePath};
//!
//! let mut root = Node::empty();
//! root.at_or_insert(&"server.port".parse::<NodePath>().unwrap()).set(25565);
//!
//! let copy = root.copy();
//! assert_eq!(copy.at(&"server.port".parse().unwrap()).and_then(Node::as_i32), Some(25565));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod json;
mod node;
mod path;
mod scalar;
mod serializer;

pub use error::{BoxError, NodeError};
pub use node::{Node, NodeOptions, NodeValue};
pub use path::{NodePath, PathError};
pub use scalar::{Number, Scalar, ScalarKind};
pub use serializer::{SerializerCollection, SerializerCollectionBuilder, TypeSerializer};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
