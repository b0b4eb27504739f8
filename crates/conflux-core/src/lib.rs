//! Conflux Core
//!
//! The host-facing entry point: a [`Conflux`] context built once at startup
//! from an explicit registry manifest, its [`ConfluxConfig`], and tracing
//! setup.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Conflux context               │
//! │  manifest │ serializers │ registries │ config │
//! └──────┬──────────────┬──────────────┬─────────┘
//!        │              │              │
//!   conflux-symbol  conflux-ops   conflux-migrate
//!        └──────────────┴──────────────┘
//!                 conflux-node
//! ```
//!
//! # Example
//!
//! ```rust
//! use conflux_core::{Conflux, ConfluxConfig};
//! use conflux_symbol::{Identifier, MemoryRegistry, RegistryKey};
//! use std::sync::Arc;
//!
//! let key: RegistryKey<u16> = RegistryKey::new(Identifier::parse("item").unwrap());
//! let items = MemoryRegistry::builder(key.clone())
//!     .register(Identifier::parse("stick").unwrap(), 280)
//!     .build();
//!
//! let conflux = Conflux::builder()
//!     .config(ConfluxConfig::new())
//!     .with_registry::<u16>(Arc::new(items))
//!     .build()
//!     .unwrap();
//!
//! let node = conflux.parse_json(r#""minecraft:stick""#).unwrap();
//! assert_eq!(node.get_as::<u16>().unwrap(), 280);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod context;
mod error;
pub mod logging;

pub use config::ConfluxConfig;
pub use context::{Conflux, ConfluxBuilder, ManifestEntry};
pub use error::{ConfluxError, Result};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
