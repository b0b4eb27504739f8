//! Configuration tree nodes
//!
//! A [`Node`] is exactly one of null, scalar, list or map. Its discriminant
//! is mutable: writing a list into a scalar node turns it into a list node.
//! Cloning a node (see [`Node::copy`]) produces a deep, independent tree
//! that keeps the same [`NodeOptions`].

use crate::path::NodePath;
use crate::scalar::{Number, Scalar};
use crate::serializer::SerializerCollection;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Options shared by every node of a tree
///
/// Children and copies inherit the options of the node they were created
/// from. Options are cheap to clone.
#[derive(Clone, Default)]
pub struct NodeOptions {
    serializers: Arc<SerializerCollection>,
}

impl NodeOptions {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying a specific serializer collection
    #[inline]
    #[must_use]
    pub fn with_serializers(mut self, serializers: Arc<SerializerCollection>) -> Self {
        self.serializers = serializers;
        self
    }

    #[inline]
    #[must_use]
    pub fn serializers(&self) -> &Arc<SerializerCollection> {
        &self.serializers
    }

    /// True if both options point at the same serializer collection
    #[inline]
    #[must_use]
    pub fn shares_serializers(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.serializers, &other.serializers)
    }
}

impl fmt::Debug for NodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeOptions")
            .field("serializers", &self.serializers.len())
            .finish()
    }
}

/// The value held by a node
///
/// Map equality ignores insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeValue {
    /// Absent / not yet typed
    #[default]
    Null,
    Scalar(Scalar),
    List(Vec<Node>),
    Map(IndexMap<String, Node>),
}

/// A mutable configuration tree node
#[derive(Debug, Clone)]
pub struct Node {
    value: NodeValue,
    options: NodeOptions,
}

impl Node {
    /// Create an empty (null) root node with the given options
    #[inline]
    #[must_use]
    pub fn root(options: NodeOptions) -> Self {
        Self {
            value: NodeValue::Null,
            options,
        }
    }

    /// Create an empty root node with default options
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::root(NodeOptions::default())
    }

    /// Create a root node holding `value`
    #[must_use]
    pub fn with_value(options: NodeOptions, value: impl Into<NodeValue>) -> Self {
        let mut node = Self::root(options);
        node.set(value);
        node
    }

    /// Create an empty node sharing this node's options
    #[inline]
    #[must_use]
    pub fn sibling(&self) -> Self {
        Self::root(self.options.clone())
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &NodeOptions {
        &self.options
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    #[inline]
    #[must_use]
    pub fn into_value(self) -> NodeValue {
        self.value
    }

    /// Deep copy of this node
    #[inline]
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// True if this node holds no value
    #[inline]
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        matches!(self.value, NodeValue::Null)
    }

    #[inline]
    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self.value, NodeValue::Map(_))
    }

    #[inline]
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self.value, NodeValue::List(_))
    }

    #[inline]
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self.value, NodeValue::Scalar(_))
    }

    #[inline]
    #[must_use]
    pub fn scalar(&self) -> Option<&Scalar> {
        match &self.value {
            NodeValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.scalar().and_then(Scalar::as_str)
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.scalar().and_then(Scalar::as_bool)
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        self.scalar().and_then(Scalar::as_number)
    }

    /// Integral value of this node; floats and strings are rejected
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number()
            .filter(|n| n.is_integral())
            .map(Number::as_i64)
    }

    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    /// Replace the value of this node
    ///
    /// Nested nodes adopt this node's options.
    pub fn set(&mut self, value: impl Into<NodeValue>) -> &mut Self {
        let mut value = value.into();
        adopt_options(&mut value, &self.options);
        self.value = value;
        self
    }

    /// Reset this node to null, returning the previous value
    pub fn take(&mut self) -> NodeValue {
        std::mem::take(&mut self.value)
    }

    /// Child by map key or list index
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Node> {
        match &self.value {
            NodeValue::Map(map) => map.get(key),
            NodeValue::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    #[must_use]
    pub fn child_mut(&mut self, key: &str) -> Option<&mut Node> {
        match &mut self.value {
            NodeValue::Map(map) => map.get_mut(key),
            NodeValue::List(items) => key
                .parse::<usize>()
                .ok()
                .and_then(move |i| items.get_mut(i)),
            _ => None,
        }
    }

    /// Child by key, creating it (as null) if absent
    ///
    /// On a list node, an index up to the list length addresses (or appends)
    /// an element. Any other key turns this node into a map.
    pub fn child_or_insert(&mut self, key: &str) -> &mut Node {
        let list_index = match &self.value {
            NodeValue::List(items) => key.parse::<usize>().ok().filter(|i| *i <= items.len()),
            _ => None,
        };
        let options = self.options.clone();

        if let Some(index) = list_index {
            let items = self.ensure_list();
            if index == items.len() {
                items.push(Node::root(options));
            }
            return &mut items[index];
        }

        self.ensure_map()
            .entry(key.to_string())
            .or_insert_with(|| Node::root(options))
    }

    /// Descendant at `path`
    #[must_use]
    pub fn at(&self, path: &NodePath) -> Option<&Node> {
        path.iter().try_fold(self, |node, key| node.child(key))
    }

    #[must_use]
    pub fn at_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        path.iter().try_fold(self, |node, key| node.child_mut(key))
    }

    /// Descendant at `path`, creating intermediate maps as needed
    pub fn at_or_insert(&mut self, path: &NodePath) -> &mut Node {
        path.iter().fold(self, |node, key| node.child_or_insert(key))
    }

    /// Set a child value; a null value removes the key
    pub fn set_child(&mut self, key: &str, value: impl Into<NodeValue>) -> &mut Self {
        let value = value.into();
        if matches!(value, NodeValue::Null) {
            self.remove_child(key);
        } else {
            self.child_or_insert(key).set(value);
        }
        self
    }

    /// Remove a child by map key or list index
    pub fn remove_child(&mut self, key: &str) -> Option<Node> {
        match &mut self.value {
            NodeValue::Map(map) => map.shift_remove(key),
            NodeValue::List(items) => match key.parse::<usize>() {
                Ok(i) if i < items.len() => Some(items.remove(i)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Append a new element, turning this node into a list if needed
    pub fn append(&mut self, value: impl Into<NodeValue>) -> &mut Node {
        let child = Node::with_value(self.options.clone(), value);
        let items = self.ensure_list();
        items.push(child);
        let last = items.len() - 1;
        &mut items[last]
    }

    /// List children; empty for non-list nodes
    #[inline]
    #[must_use]
    pub fn children_list(&self) -> &[Node] {
        match &self.value {
            NodeValue::List(items) => items,
            _ => &[],
        }
    }

    #[inline]
    #[must_use]
    pub fn children_map(&self) -> Option<&IndexMap<String, Node>> {
        match &self.value {
            NodeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Visit this node and every descendant, depth first
    pub fn walk(&self, visitor: &mut impl FnMut(&NodePath, &Node)) {
        self.walk_from(&NodePath::root(), visitor);
    }

    fn walk_from(&self, path: &NodePath, visitor: &mut impl FnMut(&NodePath, &Node)) {
        visitor(path, self);
        match &self.value {
            NodeValue::Map(map) => {
                for (key, child) in map {
                    child.walk_from(&path.child(key.as_str()), visitor);
                }
            }
            NodeValue::List(items) => {
                for (i, child) in items.iter().enumerate() {
                    child.walk_from(&path.index(i), visitor);
                }
            }
            NodeValue::Null | NodeValue::Scalar(_) => {}
        }
    }

    fn ensure_list(&mut self) -> &mut Vec<Node> {
        if !self.is_list() {
            self.value = NodeValue::List(Vec::new());
        }
        match &mut self.value {
            NodeValue::List(items) => items,
            _ => unreachable!("value was just made a list"),
        }
    }

    fn ensure_map(&mut self) -> &mut IndexMap<String, Node> {
        if !self.is_map() {
            self.value = NodeValue::Map(IndexMap::new());
        }
        match &mut self.value {
            NodeValue::Map(map) => map,
            _ => unreachable!("value was just made a map"),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::empty()
    }
}

fn adopt_options(value: &mut NodeValue, options: &NodeOptions) {
    match value {
        NodeValue::List(items) => {
            for child in items {
                child.adopt(options);
            }
        }
        NodeValue::Map(map) => {
            for child in map.values_mut() {
                child.adopt(options);
            }
        }
        NodeValue::Null | NodeValue::Scalar(_) => {}
    }
}

impl Node {
    fn adopt(&mut self, options: &NodeOptions) {
        if !self.options.shares_serializers(options) {
            self.options = options.clone();
        }
        adopt_options(&mut self.value, options);
    }
}

impl From<Scalar> for NodeValue {
    #[inline]
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<Node> for NodeValue {
    #[inline]
    fn from(node: Node) -> Self {
        node.value
    }
}

impl From<&Node> for NodeValue {
    #[inline]
    fn from(node: &Node) -> Self {
        node.value.clone()
    }
}

impl From<Vec<Node>> for NodeValue {
    #[inline]
    fn from(items: Vec<Node>) -> Self {
        Self::List(items)
    }
}

impl From<IndexMap<String, Node>> for NodeValue {
    #[inline]
    fn from(map: IndexMap<String, Node>) -> Self {
        Self::Map(map)
    }
}

impl From<Number> for NodeValue {
    #[inline]
    fn from(number: Number) -> Self {
        Self::Scalar(number.into())
    }
}

macro_rules! node_value_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for NodeValue {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

node_value_from_scalar!(String, &str, bool, i8, i16, i32, i64, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_changes_discriminant() {
        let mut node = Node::empty();
        assert!(node.is_virtual());

        node.set(5);
        assert!(node.is_scalar());
        assert_eq!(node.as_i32(), Some(5));

        node.append("a");
        assert!(node.is_list());
        assert_eq!(node.children_list().len(), 1);

        node.child_or_insert("key").set(true);
        assert!(node.is_map());
        assert_eq!(node.child("key").and_then(Node::as_bool), Some(true));
    }

    #[test]
    fn child_or_insert_addresses_list_indices() {
        let mut node = Node::empty();
        node.append(1);
        node.append(2);

        node.child_or_insert("1").set(20);
        node.child_or_insert("2").set(30);

        let values: Vec<_> = node.children_list().iter().filter_map(Node::as_i32).collect();
        assert_eq!(values, vec![1, 20, 30]);
    }

    #[test]
    fn at_or_insert_builds_maps() {
        let mut node = Node::empty();
        node.at_or_insert(&"a.b.c".parse().unwrap()).set("deep");

        assert_eq!(
            node.at(&"a.b.c".parse().unwrap()).and_then(Node::as_str),
            Some("deep")
        );
        assert!(node.at(&"a.x".parse().unwrap()).is_none());
    }

    #[test]
    fn set_child_null_removes() {
        let mut node = Node::empty();
        node.set_child("a", 1).set_child("b", 2);
        node.set_child("a", NodeValue::Null);

        assert!(node.child("a").is_none());
        assert_eq!(node.children_map().map(IndexMap::len), Some(1));
    }

    #[test]
    fn copy_is_independent() {
        let mut original = Node::empty();
        original.child_or_insert("count").set(3);

        let mut copy = original.copy();
        copy.child_or_insert("count").set(6);
        copy.child_or_insert("extra").set("x");

        assert_eq!(original.child("count").and_then(Node::as_i32), Some(3));
        assert!(original.child("extra").is_none());
    }

    #[test]
    fn children_adopt_parent_options() {
        let collection = Arc::new(SerializerCollection::builder().build());
        let options = NodeOptions::new().with_serializers(collection);
        let mut parent = Node::root(options.clone());

        let mut foreign = Node::empty();
        foreign.child_or_insert("x").set(1);
        parent.child_or_insert("inner").set(foreign);

        let inner = parent.child("inner").unwrap();
        assert!(inner.options().shares_serializers(&options));
        assert!(inner.child("x").unwrap().options().shares_serializers(&options));
    }

    #[test]
    fn map_equality_ignores_order() {
        let mut a = Node::empty();
        a.set_child("x", 1).set_child("y", 2);
        let mut b = Node::empty();
        b.set_child("y", 2).set_child("x", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn integral_access_rejects_floats() {
        let node = Node::with_value(NodeOptions::new(), 1.5f64);
        assert_eq!(node.as_i64(), None);
        assert_eq!(node.as_f64(), Some(1.5));
    }

    #[test]
    fn walk_visits_all_paths() {
        let mut node = Node::empty();
        node.set_child("a", 1);
        node.child_or_insert("l").append("x");

        let mut paths = Vec::new();
        node.walk(&mut |path, _| paths.push(path.to_string()));
        assert_eq!(paths, vec!["<root>", "a", "l", "l.0"]);
    }
}
