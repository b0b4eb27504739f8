//! [`DynamicOps`] over configuration tree nodes
//!
//! Every operation works on copies; a node handed to [`NodeOps`] is never
//! modified. New nodes come from a factory so they carry the serializers of
//! the tree they will end up in.

use crate::dynamic::Dynamic;
use crate::error::OpsError;
use crate::ops::{pass_through, DynamicOps};
use conflux_node::{Node, NodeOptions, NodeValue, Number, Scalar, SerializerCollection};
use std::fmt;
use std::sync::Arc;

type NodeFactory = dyn Fn() -> Node + Send + Sync;

/// The node bridge
#[derive(Clone)]
pub struct NodeOps {
    factory: Arc<NodeFactory>,
    compressed: bool,
}

impl NodeOps {
    /// Bridge producing nodes with default options
    #[must_use]
    pub fn new() -> Self {
        NodeOpsBuilder::default().build()
    }

    #[inline]
    #[must_use]
    pub fn builder() -> NodeOpsBuilder {
        NodeOpsBuilder::default()
    }

    /// Bridge producing nodes with `options`
    #[must_use]
    pub fn with_options(options: NodeOptions) -> Self {
        Self::builder().factory_from_options(options).build()
    }

    /// Pair `node` with a bridge whose nodes share its options
    #[must_use]
    pub fn wrap(node: Node) -> Dynamic<NodeOps> {
        Self::builder().factory_from_node(&node).build_wrapping(node)
    }

    /// Read-only view of a map node
    ///
    /// # Errors
    /// Returns [`OpsError::NotAMap`] for non-map nodes
    pub fn get_map<'a>(&'a self, input: &'a Node) -> Result<MapView<'a>, OpsError> {
        if input.is_map() {
            Ok(MapView { ops: self, node: input })
        } else {
            Err(OpsError::NotAMap(describe(input)))
        }
    }
}

impl Default for NodeOps {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodeOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeOps")
            .field("compressed", &self.compressed)
            .finish_non_exhaustive()
    }
}

impl DynamicOps for NodeOps {
    type Value = Node;

    fn empty(&self) -> Node {
        (self.factory)()
    }

    fn create_numeric(&self, value: Number) -> Node {
        let mut node = self.empty();
        node.set(value);
        node
    }

    fn create_boolean(&self, value: bool) -> Node {
        let mut node = self.empty();
        node.set(value);
        node
    }

    fn create_string(&self, value: &str) -> Node {
        let mut node = self.empty();
        node.set(value);
        node
    }

    fn get_number_value(&self, input: &Node) -> Result<Number, OpsError> {
        match input.scalar() {
            Some(Scalar::Boolean(b)) => Ok(Number::Int(i32::from(*b))),
            Some(scalar) => scalar
                .as_number()
                .ok_or_else(|| OpsError::NotANumber(describe(input))),
            None => Err(OpsError::NotANumber(describe(input))),
        }
    }

    fn get_boolean_value(&self, input: &Node) -> Result<bool, OpsError> {
        match input.scalar() {
            Some(Scalar::Boolean(b)) => Ok(*b),
            Some(scalar) => scalar
                .as_number()
                .map(|n| n.as_f64() != 0.0)
                .ok_or_else(|| OpsError::NotABoolean(describe(input))),
            None => Err(OpsError::NotABoolean(describe(input))),
        }
    }

    fn get_string_value(&self, input: &Node) -> Result<String, OpsError> {
        input
            .scalar()
            .map(Scalar::to_key)
            .ok_or_else(|| OpsError::NotAString(describe(input)))
    }

    fn merge_to_list(&self, list: &Node, value: Node) -> Result<Node, OpsError> {
        if !(list.is_list() || list.is_virtual()) {
            return Err(OpsError::TypeMismatch {
                operation: "merge_to_list",
                input: describe(list),
            });
        }
        let mut merged = list.copy();
        merged.append(value);
        Ok(merged)
    }

    fn merge_to_map(&self, map: &Node, key: &Node, value: Node) -> Result<Node, OpsError> {
        if !(map.is_map() || map.is_virtual()) {
            return Err(OpsError::TypeMismatch {
                operation: "merge_to_map",
                input: describe(map),
            });
        }
        let key = key_of(key)?;
        let mut merged = map.copy();
        if merged.is_virtual() {
            merged.set(NodeValue::Map(Default::default()));
        }
        merged.set_child(&key, value);
        Ok(merged)
    }

    fn get_map_values(&self, input: &Node) -> Result<Vec<(Node, Node)>, OpsError> {
        let map = input
            .children_map()
            .ok_or_else(|| OpsError::NotAMap(describe(input)))?;
        Ok(map
            .iter()
            .map(|(key, value)| (self.create_string(key), value.copy()))
            .collect())
    }

    fn create_map(&self, entries: Vec<(Node, Node)>) -> Result<Node, OpsError> {
        let mut map = self.empty();
        map.set(NodeValue::Map(Default::default()));
        for (key, value) in entries {
            map.set_child(&key_of(&key)?, value);
        }
        Ok(map)
    }

    fn get_stream(&self, input: &Node) -> Result<Vec<Node>, OpsError> {
        if !input.is_list() {
            return Err(OpsError::NotAList(describe(input)));
        }
        Ok(input.children_list().to_vec())
    }

    fn create_list(&self, items: Vec<Node>) -> Node {
        let mut list = self.empty();
        list.set(items);
        list
    }

    fn remove(&self, input: &Node, key: &str) -> Node {
        let mut copy = input.copy();
        if copy.is_map() {
            copy.remove_child(key);
        }
        copy
    }

    fn get(&self, input: &Node, key: &str) -> Result<Node, OpsError> {
        input
            .child(key)
            .filter(|child| !child.is_virtual())
            .map(Node::copy)
            .ok_or_else(|| OpsError::KeyAbsent {
                key: key.to_string(),
                input: describe(input),
            })
    }

    fn set(&self, input: &Node, key: &str, value: Node) -> Node {
        let mut copy = input.copy();
        copy.set_child(key, value);
        copy
    }

    fn update<F>(&self, input: &Node, key: &str, f: F) -> Node
    where
        F: FnOnce(Node) -> Node,
    {
        let mut copy = input.copy();
        if let Some(child) = copy.child_mut(key).filter(|child| !child.is_virtual()) {
            let updated = f(child.copy());
            child.set(updated);
        }
        copy
    }

    fn compress_maps(&self) -> bool {
        self.compressed
    }

    fn convert_to<O: DynamicOps>(&self, out: &O, input: Node) -> Result<O::Value, OpsError> {
        let input = match pass_through::<Self, O>(input) {
            Ok(same) => return Ok(same),
            Err(input) => input,
        };
        match input.into_value() {
            NodeValue::Null => Ok(out.empty()),
            NodeValue::Scalar(scalar) => Ok(match scalar {
                Scalar::String(s) => out.create_string(&s),
                Scalar::Boolean(b) => out.create_boolean(b),
                Scalar::Byte(v) => out.create_byte(v),
                Scalar::Short(v) => out.create_short(v),
                Scalar::Int(v) => out.create_int(v),
                Scalar::Long(v) => out.create_long(v),
                Scalar::Float(v) => out.create_float(v),
                Scalar::Double(v) => out.create_double(v),
            }),
            NodeValue::List(items) => {
                let converted = items
                    .into_iter()
                    .map(|item| self.convert_to(out, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(out.create_list(converted))
            }
            NodeValue::Map(map) => {
                let entries = map
                    .into_iter()
                    .map(|(key, value)| Ok((out.create_string(&key), self.convert_to(out, value)?)))
                    .collect::<Result<Vec<_>, OpsError>>()?;
                out.create_map(entries)
            }
        }
    }
}

fn key_of(key: &Node) -> Result<String, OpsError> {
    key.scalar()
        .map(Scalar::to_key)
        .ok_or_else(|| OpsError::NotAScalar(describe(key)))
}

/// Short rendering of a node for error messages
pub(crate) fn describe(node: &Node) -> String {
    match node.to_json() {
        Ok(json) => json.to_string(),
        Err(_) => format!("{:?}", node.value()),
    }
}

/// Read-only view of a map node
///
/// Values are returned as copies.
#[derive(Debug, Clone, Copy)]
pub struct MapView<'a> {
    ops: &'a NodeOps,
    node: &'a Node,
}

impl MapView<'_> {
    /// Copy of the value under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Node> {
        self.node.child(key).filter(|n| !n.is_virtual()).map(Node::copy)
    }

    /// Copy of the value under a scalar key node
    #[must_use]
    pub fn get_node(&self, key: &Node) -> Option<Node> {
        key_of(key).ok().and_then(|key| self.get(&key))
    }

    /// Entries as `(key, value)` copies in map order
    #[must_use]
    pub fn entries(&self) -> Vec<(Node, Node)> {
        self.node
            .children_map()
            .map(|map| {
                map.iter()
                    .map(|(key, value)| (self.ops.create_string(key), value.copy()))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.node.children_map().map_or(0, |map| map.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builder for [`NodeOps`]
pub struct NodeOpsBuilder {
    factory: Arc<NodeFactory>,
    compressed: bool,
}

impl Default for NodeOpsBuilder {
    fn default() -> Self {
        Self {
            factory: Arc::new(Node::empty),
            compressed: false,
        }
    }
}

impl NodeOpsBuilder {
    /// Produce new nodes with `factory`
    #[must_use]
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Node + Send + Sync + 'static,
    {
        self.factory = Arc::new(factory);
        self
    }

    /// Produce root nodes carrying `collection`
    #[must_use]
    pub fn factory_from_serializers(self, collection: Arc<SerializerCollection>) -> Self {
        self.factory_from_options(NodeOptions::from_serializers(collection))
    }

    /// Produce root nodes with the options of `node`
    #[must_use]
    pub fn factory_from_node(self, node: &Node) -> Self {
        self.factory_from_options(node.options().clone())
    }

    #[must_use]
    pub fn factory_from_options(self, options: NodeOptions) -> Self {
        self.factory(move || Node::root(options.clone()))
    }

    #[must_use]
    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    #[must_use]
    pub fn build(self) -> NodeOps {
        NodeOps {
            factory: self.factory,
            compressed: self.compressed,
        }
    }

    /// Build and pair the bridge with `node`
    #[must_use]
    pub fn build_wrapping(self, node: Node) -> Dynamic<NodeOps> {
        Dynamic::new(self.build(), node)
    }
}
