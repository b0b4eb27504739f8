//! Type serializers and the collection nodes carry in their options
//!
//! A [`TypeSerializer<T>`] converts between a node and a typed value. A
//! [`SerializerCollection`] maps value types to serializers; it is built once
//! by the host and then shared read-only through [`NodeOptions`].

use crate::error::NodeError;
use crate::node::{Node, NodeOptions};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Converts a value of type `T` to and from a node
pub trait TypeSerializer<T>: Send + Sync {
    /// Read a value from `node`
    ///
    /// # Errors
    /// Returns error if the node does not have an accepted shape
    fn deserialize(&self, node: &Node) -> Result<T, NodeError>;

    /// Write `value` into `node`, replacing its previous contents
    ///
    /// # Errors
    /// Returns error if the value cannot be represented
    fn serialize(&self, value: &T, node: &mut Node) -> Result<(), NodeError>;

    /// Value used when reading a virtual (absent) node
    fn empty_value(&self) -> Option<T> {
        None
    }
}

/// Type-indexed set of serializers
///
/// Lookups fall back to the parent collection, so a child collection can
/// override or extend a shared base set.
#[derive(Default)]
pub struct SerializerCollection {
    parent: Option<Arc<SerializerCollection>>,
    entries: HashMap<TypeId, Entry>,
}

struct Entry {
    type_name: &'static str,
    serializer: Box<dyn Any + Send + Sync>,
}

impl SerializerCollection {
    #[inline]
    #[must_use]
    pub fn builder() -> SerializerCollectionBuilder {
        SerializerCollectionBuilder::default()
    }

    /// Builder for a collection that falls back to `parent`
    #[inline]
    #[must_use]
    pub fn child_of(parent: Arc<Self>) -> SerializerCollectionBuilder {
        SerializerCollectionBuilder {
            parent: Some(parent),
            entries: HashMap::new(),
        }
    }

    /// Serializer registered for `T`, searching parents
    #[must_use]
    pub fn get<T: 'static>(&self) -> Option<Arc<dyn TypeSerializer<T>>> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.serializer.downcast_ref::<Arc<dyn TypeSerializer<T>>>())
            .cloned()
            .or_else(|| self.parent.as_ref().and_then(|p| p.get::<T>()))
    }

    #[inline]
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Number of serializers registered directly in this collection
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the types registered directly in this collection
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for SerializerCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerCollection")
            .field("types", &self.type_names())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// Builder for [`SerializerCollection`]
#[derive(Default)]
pub struct SerializerCollectionBuilder {
    parent: Option<Arc<SerializerCollection>>,
    entries: HashMap<TypeId, Entry>,
}

impl SerializerCollectionBuilder {
    /// Register a serializer for `T`, replacing any earlier registration
    #[must_use]
    pub fn register<T: 'static>(mut self, serializer: impl TypeSerializer<T> + 'static) -> Self {
        self.insert::<T>(Arc::new(serializer));
        self
    }

    /// Register an already shared serializer for `T`
    pub fn insert<T: 'static>(&mut self, serializer: Arc<dyn TypeSerializer<T>>) {
        self.entries.insert(
            TypeId::of::<T>(),
            Entry {
                type_name: std::any::type_name::<T>(),
                serializer: Box::new(serializer),
            },
        );
    }

    #[inline]
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    #[must_use]
    pub fn build(self) -> SerializerCollection {
        SerializerCollection {
            parent: self.parent,
            entries: self.entries,
        }
    }
}

impl Node {
    /// Read this node as a `T` using the serializers in its options
    ///
    /// # Errors
    /// Returns [`NodeError::NoSerializer`] if no serializer for `T` is known,
    /// or the serializer's own error.
    pub fn get_as<T: 'static>(&self) -> Result<T, NodeError> {
        let serializer = self.serializer_for::<T>()?;
        if self.is_virtual() {
            if let Some(empty) = serializer.empty_value() {
                return Ok(empty);
            }
        }
        serializer.deserialize(self)
    }

    /// Write `value` into this node using the serializers in its options
    ///
    /// # Errors
    /// Returns [`NodeError::NoSerializer`] if no serializer for `T` is known,
    /// or the serializer's own error.
    pub fn set_as<T: 'static>(&mut self, value: &T) -> Result<(), NodeError> {
        let serializer = self.serializer_for::<T>()?;
        serializer.serialize(value, self)
    }

    fn serializer_for<T: 'static>(&self) -> Result<Arc<dyn TypeSerializer<T>>, NodeError> {
        self.options()
            .serializers()
            .get::<T>()
            .ok_or(NodeError::NoSerializer {
                type_name: std::any::type_name::<T>(),
            })
    }
}

impl NodeOptions {
    /// Options whose serializers are `collection`
    #[inline]
    #[must_use]
    pub fn from_serializers(collection: Arc<SerializerCollection>) -> Self {
        Self::new().with_serializers(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::NodePath;

    #[derive(Debug, PartialEq)]
    struct Celsius(i32);

    struct CelsiusSerializer;

    impl TypeSerializer<Celsius> for CelsiusSerializer {
        fn deserialize(&self, node: &Node) -> Result<Celsius, NodeError> {
            node.as_i32()
                .map(Celsius)
                .ok_or_else(|| NodeError::serialization(NodePath::root(), "not a temperature"))
        }

        fn serialize(&self, value: &Celsius, node: &mut Node) -> Result<(), NodeError> {
            node.set(value.0);
            Ok(())
        }

        fn empty_value(&self) -> Option<Celsius> {
            Some(Celsius(0))
        }
    }

    fn options() -> NodeOptions {
        let collection = SerializerCollection::builder()
            .register::<Celsius>(CelsiusSerializer)
            .build();
        NodeOptions::from_serializers(Arc::new(collection))
    }

    #[test]
    fn typed_round_trip() {
        let mut node = Node::root(options());
        node.set_as(&Celsius(21)).unwrap();
        assert_eq!(node.as_i32(), Some(21));
        assert_eq!(node.get_as::<Celsius>().unwrap(), Celsius(21));
    }

    #[test]
    fn virtual_node_uses_empty_value() {
        let node = Node::root(options());
        assert_eq!(node.get_as::<Celsius>().unwrap(), Celsius(0));
    }

    #[test]
    fn missing_serializer_is_reported() {
        let node = Node::empty();
        let err = node.get_as::<Celsius>().unwrap_err();
        assert!(matches!(err, NodeError::NoSerializer { .. }));
    }

    #[test]
    fn child_collection_falls_back_to_parent() {
        let parent = Arc::new(
            SerializerCollection::builder()
                .register::<Celsius>(CelsiusSerializer)
                .build(),
        );
        let child = SerializerCollection::child_of(parent).build();
        assert!(child.is_empty());
        assert!(child.contains::<Celsius>());
    }

    #[test]
    fn children_inherit_serializers() {
        let mut root = Node::root(options());
        let child = root.child_or_insert("temp");
        child.set_as(&Celsius(-4)).unwrap();
        assert_eq!(
            root.child("temp").unwrap().get_as::<Celsius>().unwrap(),
            Celsius(-4)
        );
    }
}
