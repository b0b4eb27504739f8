//! Conflux Symbol
//!
//! Symbolic references into host-supplied registries.
//!
//! # Overview
//!
//! - **Identifier**: namespaced `namespace:path` keys
//! - **Registry / RegistryAccess**: registry snapshots and the deferred table
//!   hosts publish them into
//! - **ReferenceSet**: lazily resolved unions of registry values that keep
//!   their serialized shape
//! - **Serializers**: `TypeSerializer` implementations for all of the above
//!
//! # Example
//!
//! ```rust
//! use conflux_symbol::{Identifier, MemoryRegistry, Registry, RegistryKey};
//!
//! let key = RegistryKey::new(Identifier::parse("item").unwrap());
//! let items = MemoryRegistry::builder(key)
//!     .register(Identifier::parse("stick").unwrap(), 280u16)
//!     .build();
//!
//! assert_eq!(items.get(&"minecraft:stick".parse().unwrap()), Some(280));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod access;
mod error;
mod identifier;
mod reference_set;
mod registry;
mod serializers;
mod tag_entry;

pub use access::{RegistryAccess, RegistryResolver};
pub use error::SymbolError;
pub use identifier::{Identifier, DEFAULT_NAMESPACE};
pub use reference_set::ReferenceSet;
pub use registry::{MemoryRegistry, MemoryRegistryBuilder, Registry, RegistryKey, RegistryRef, TagMember};
pub use serializers::{
    IdentifierSerializer, ReferenceSetSerializer, RegistryRefSerializer, RegistrySerializer,
};
pub use tag_entry::TagEntry;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
