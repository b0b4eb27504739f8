//! Testing utilities for the Conflux workspace
//!
//! Sample registries, stub migration engines and tree builders.

#![allow(missing_docs)]

use conflux_core::Conflux;
use conflux_migrate::{MigrationEngine, MigrationError, SchemaRef};
use conflux_node::{Node, NodeOptions};
use conflux_ops::{Dynamic, DynamicOps, NodeOps};
use conflux_symbol::{Identifier, MemoryRegistry, RegistryKey, TagMember};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block(pub u16);

pub fn id(text: &str) -> Identifier {
    Identifier::parse(text).unwrap()
}

pub fn item_key() -> RegistryKey<Item> {
    RegistryKey::new(id("item"))
}

pub fn block_key() -> RegistryKey<Block> {
    RegistryKey::new(id("block"))
}

/// Items: stick, oak_log, birch_log, coal
///
/// Tags: `logs` = oak and birch logs, `fuel` = `#logs` + coal
pub fn sample_items() -> MemoryRegistry<Item> {
    MemoryRegistry::builder(item_key())
        .register(id("stick"), Item(280))
        .register(id("oak_log"), Item(17))
        .register(id("birch_log"), Item(18))
        .register(id("coal"), Item(263))
        .tag(
            id("logs"),
            [TagMember::Element(id("oak_log")), TagMember::Element(id("birch_log"))],
        )
        .tag(id("fuel"), [TagMember::Tag(id("logs")), TagMember::Element(id("coal"))])
        .build()
}

pub fn sample_blocks() -> MemoryRegistry<Block> {
    MemoryRegistry::builder(block_key())
        .register(id("stone"), Block(1))
        .register(id("dirt"), Block(3))
        .build()
}

/// Context with tagged `item` and plain `block` registries, both published
pub fn sample_conflux() -> Conflux {
    let conflux = Conflux::builder()
        .with_registry::<Item>(Arc::new(sample_items()))
        .register_registry(block_key())
        .build()
        .unwrap();
    conflux.publish::<Block>(Arc::new(sample_blocks()));
    conflux
}

pub fn tree(value: serde_json::Value) -> Node {
    Node::from_json(NodeOptions::default(), &value).unwrap()
}

/// Engine rebuilding item stacks as `{id, Count * 2}`
///
/// Items whose id is `bad` are rejected. Every call is counted.
#[derive(Debug, Default)]
pub struct DoublingEngine {
    latest: i32,
    calls: AtomicUsize,
}

impl DoublingEngine {
    pub fn new(latest: i32) -> Self {
        Self {
            latest,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MigrationEngine for DoublingEngine {
    fn update(
        &self,
        schema: &SchemaRef,
        input: Dynamic<NodeOps>,
        _from: i32,
        _to: i32,
    ) -> Result<Dynamic<NodeOps>, MigrationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let ops = input.ops().clone();
        let id = ops.get(input.value(), "id")?;
        if ops.get_string_value(&id)? == "bad" {
            return Err(MigrationError::engine(schema, "item cannot be upgraded"));
        }
        let count = ops.get_number_value(&ops.get(input.value(), "Count")?)?.as_i64();
        let count = i32::try_from(count * 2)
            .map_err(|_| MigrationError::engine(schema, "count overflow"))?;
        let upgraded = ops.create_map(vec![
            (ops.create_string("id"), id),
            (ops.create_string("Count"), ops.create_int(count)),
        ])?;
        Ok(input.with_value(upgraded))
    }

    fn latest_version(&self) -> i32 {
        self.latest
    }
}
