//! Conflux Ops
//!
//! A generic algebraic value contract ([`DynamicOps`]) and its
//! implementations over configuration trees ([`NodeOps`]) and JSON
//! ([`JsonOps`]).
//!
//! # Overview
//!
//! Migration engines and codecs are written against [`DynamicOps`] only.
//! [`NodeOps`] lets them run directly on configuration trees without ever
//! mutating the trees they are given; [`DynamicOps::convert_to`] moves a
//! value into another model, passing it through untouched when the target
//! is the same kind of ops.
//!
//! # Example
//!
//! ```rust
//! use conflux_ops::{DynamicOps, JsonOps, NodeOps};
//! use conflux_node::Node;
//!
//! let ops = NodeOps::new();
//! let tree = Node::from_json_str(r#"{"Count": 3}"#).unwrap();
//! let doubled = ops.update(&tree, "Count", |v| ops.create_int(v.as_i32().unwrap_or(0) * 2));
//!
//! let json = ops.convert_to(&JsonOps, doubled).unwrap();
//! assert_eq!(json, serde_json::json!({"Count": 6}));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod codec;
mod dynamic;
mod error;
mod json_ops;
mod node_ops;
mod ops;

pub use codec::{BoolCodec, Codec, CodecSerializer, IntCodec, ListCodec, StringCodec};
pub use dynamic::Dynamic;
pub use error::OpsError;
pub use json_ops::JsonOps;
pub use node_ops::{MapView, NodeOps, NodeOpsBuilder};
pub use ops::DynamicOps;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
