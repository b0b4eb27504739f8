//! Codecs and the serializer adapter that runs them over nodes

use crate::error::OpsError;
use crate::node_ops::NodeOps;
use crate::ops::DynamicOps;
use conflux_node::{Node, NodeError, NodePath, TypeSerializer};
use std::marker::PhantomData;

/// Encodes and decodes `T` through any [`DynamicOps`]
pub trait Codec<T>: Send + Sync {
    /// # Errors
    /// Returns error if `value` cannot be represented
    fn encode<O: DynamicOps>(&self, ops: &O, value: &T) -> Result<O::Value, OpsError>;

    /// # Errors
    /// Returns error if `input` does not have the expected shape
    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> Result<T, OpsError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCodec;

impl Codec<bool> for BoolCodec {
    fn encode<O: DynamicOps>(&self, ops: &O, value: &bool) -> Result<O::Value, OpsError> {
        Ok(ops.create_boolean(*value))
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> Result<bool, OpsError> {
        ops.get_boolean_value(input)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntCodec;

impl Codec<i32> for IntCodec {
    fn encode<O: DynamicOps>(&self, ops: &O, value: &i32) -> Result<O::Value, OpsError> {
        Ok(ops.create_int(*value))
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> Result<i32, OpsError> {
        let number = ops.get_number_value(input)?;
        if !number.is_integral() {
            return Err(OpsError::codec(format!("{number:?} is not an integer")));
        }
        i32::try_from(number.as_i64())
            .map_err(|_| OpsError::codec(format!("{number:?} does not fit in 32 bits")))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Codec<String> for StringCodec {
    fn encode<O: DynamicOps>(&self, ops: &O, value: &String) -> Result<O::Value, OpsError> {
        Ok(ops.create_string(value))
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> Result<String, OpsError> {
        ops.get_string_value(input)
    }
}

/// Codec for lists of values handled by an element codec
#[derive(Debug, Clone, Copy, Default)]
pub struct ListCodec<C> {
    element: C,
}

impl<C> ListCodec<C> {
    #[must_use]
    pub fn new(element: C) -> Self {
        Self { element }
    }
}

impl<T, C: Codec<T>> Codec<Vec<T>> for ListCodec<C> {
    fn encode<O: DynamicOps>(&self, ops: &O, value: &Vec<T>) -> Result<O::Value, OpsError> {
        let items = value
            .iter()
            .map(|item| self.element.encode(ops, item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ops.create_list(items))
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> Result<Vec<T>, OpsError> {
        ops.get_stream(input)?
            .iter()
            .map(|item| self.element.decode(ops, item))
            .collect()
    }
}

/// [`TypeSerializer`] backed by a [`Codec`]
///
/// Nodes are handled through a [`NodeOps`] whose factory produces nodes with
/// the options of the node being read or written.
pub struct CodecSerializer<T, C> {
    codec: C,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C: Codec<T>> CodecSerializer<T, C> {
    #[must_use]
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            _marker: PhantomData,
        }
    }
}

impl<T, C: Codec<T>> TypeSerializer<T> for CodecSerializer<T, C> {
    fn deserialize(&self, node: &Node) -> Result<T, NodeError> {
        let ops = NodeOps::builder().factory_from_node(node).build();
        self.codec.decode(&ops, node).map_err(|err| {
            tracing::trace!(error = %err, "codec failed to decode value");
            NodeError::with_source(NodePath::root(), "codec failed to decode value", err)
        })
    }

    fn serialize(&self, value: &T, node: &mut Node) -> Result<(), NodeError> {
        let ops = NodeOps::builder().factory_from_node(node).build();
        let encoded = self.codec.encode(&ops, value).map_err(|err| {
            tracing::trace!(error = %err, "codec failed to encode value");
            NodeError::with_source(NodePath::root(), "codec failed to encode value", err)
        })?;
        node.set(encoded);
        Ok(())
    }
}
