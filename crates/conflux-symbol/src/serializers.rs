//! Type serializers for identifiers and registry-backed values

use crate::access::{RegistryAccess, RegistryResolver};
use crate::error::SymbolError;
use crate::identifier::Identifier;
use crate::reference_set::ReferenceSet;
use crate::registry::{RegistryKey, RegistryRef};
use conflux_node::{Node, NodeError, NodePath, TypeSerializer};
use std::sync::Arc;

fn at_root(err: SymbolError) -> NodeError {
    err.into_node_error(NodePath::root())
}

/// Serializer for [`Identifier`]
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierSerializer;

impl TypeSerializer<Identifier> for IdentifierSerializer {
    fn deserialize(&self, node: &Node) -> Result<Identifier, NodeError> {
        Identifier::from_node(node).map_err(at_root)
    }

    fn serialize(&self, value: &Identifier, node: &mut Node) -> Result<(), NodeError> {
        value.to_node(node);
        Ok(())
    }
}

/// Serializer for raw registry values, written as their identifier
pub struct RegistrySerializer<T> {
    access: Arc<RegistryAccess>,
    key: RegistryKey<T>,
}

impl<T> RegistrySerializer<T> {
    #[must_use]
    pub fn new(access: Arc<RegistryAccess>, key: RegistryKey<T>) -> Self {
        Self { access, key }
    }
}

impl<T: 'static> TypeSerializer<T> for RegistrySerializer<T> {
    fn deserialize(&self, node: &Node) -> Result<T, NodeError> {
        let id = Identifier::from_node(node).map_err(at_root)?;
        self.access.get(&self.key, &id).map_err(at_root)
    }

    fn serialize(&self, value: &T, node: &mut Node) -> Result<(), NodeError> {
        let id = self.access.get_key(&self.key, value).map_err(at_root)?;
        id.to_node(node);
        Ok(())
    }
}

/// Serializer for [`RegistryRef`] values of one registry
///
/// Reading checks that the referenced entry exists; writing rejects
/// references into other registries.
pub struct RegistryRefSerializer<T> {
    access: Arc<RegistryAccess>,
    key: RegistryKey<T>,
}

impl<T> RegistryRefSerializer<T> {
    #[must_use]
    pub fn new(access: Arc<RegistryAccess>, key: RegistryKey<T>) -> Self {
        Self { access, key }
    }
}

impl<T: 'static> TypeSerializer<RegistryRef<T>> for RegistryRefSerializer<T> {
    fn deserialize(&self, node: &Node) -> Result<RegistryRef<T>, NodeError> {
        let id = Identifier::from_node(node).map_err(at_root)?;
        let registry = self.access.registry(&self.key).map_err(at_root)?;
        if !registry.contains_key(&id) {
            return Err(at_root(SymbolError::NotFound {
                registry: self.key.id().clone(),
                what: format!("key {id}"),
            }));
        }
        Ok(RegistryRef::new(self.key.clone(), id))
    }

    fn serialize(&self, value: &RegistryRef<T>, node: &mut Node) -> Result<(), NodeError> {
        if value.registry() != &self.key {
            return Err(at_root(SymbolError::RegistryMismatch {
                expected: self.key.id().clone(),
                actual: value.registry().id().clone(),
            }));
        }
        value.id().to_node(node);
        Ok(())
    }
}

/// Serializer for [`ReferenceSet`] values of one registry
///
/// An absent node reads as an empty set.
pub struct ReferenceSetSerializer<T> {
    resolver: RegistryResolver<T>,
}

impl<T: 'static> ReferenceSetSerializer<T> {
    #[must_use]
    pub fn new(resolver: RegistryResolver<T>) -> Self {
        Self { resolver }
    }

    #[must_use]
    pub fn from_access(access: Arc<RegistryAccess>, key: RegistryKey<T>) -> Self {
        Self::new(RegistryResolver::from_access(access, key))
    }
}

impl<T> TypeSerializer<ReferenceSet<T>> for ReferenceSetSerializer<T>
where
    T: Clone + PartialEq + 'static,
{
    fn deserialize(&self, node: &Node) -> Result<ReferenceSet<T>, NodeError> {
        ReferenceSet::from_node(node, self.resolver.clone()).map_err(at_root)
    }

    fn serialize(&self, value: &ReferenceSet<T>, node: &mut Node) -> Result<(), NodeError> {
        value.to_node(node)
    }

    fn empty_value(&self) -> Option<ReferenceSet<T>> {
        Some(ReferenceSet::direct(Vec::new(), self.resolver.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MemoryRegistry, Registry};
    use conflux_node::{NodeOptions, SerializerCollection};
    use serde_json::json;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    fn access() -> Arc<RegistryAccess> {
        let access = Arc::new(RegistryAccess::new());
        let items: Arc<dyn Registry<u16>> = Arc::new(
            MemoryRegistry::builder(RegistryKey::new(id("item")))
                .register(id("stick"), 280)
                .register(id("stone"), 1)
                .build(),
        );
        access.insert(items);
        access
    }

    fn item_key() -> RegistryKey<u16> {
        RegistryKey::new(id("item"))
    }

    #[test]
    fn registry_values_round_trip_through_ids() {
        let serializer = RegistrySerializer::new(access(), item_key());
        let node = Node::with_value(NodeOptions::default(), "minecraft:stick");
        assert_eq!(serializer.deserialize(&node).unwrap(), 280);

        let mut out = Node::empty();
        serializer.serialize(&1, &mut out).unwrap();
        assert_eq!(out.as_str(), Some("minecraft:stone"));

        let err = serializer.serialize(&7, &mut out).unwrap_err();
        assert!(matches!(
            err.source_as::<SymbolError>(),
            Some(SymbolError::NotFound { .. })
        ));
    }

    #[test]
    fn construction_does_not_need_registry() {
        let empty = Arc::new(RegistryAccess::new());
        let serializer = RegistrySerializer::new(Arc::clone(&empty), item_key());
        let node = Node::with_value(NodeOptions::default(), "stick");

        let err = serializer.deserialize(&node).unwrap_err();
        assert!(matches!(
            err.source_as::<SymbolError>(),
            Some(SymbolError::RegistryUnavailable { .. })
        ));

        let items: Arc<dyn Registry<u16>> = Arc::new(
            MemoryRegistry::builder(item_key())
                .register(id("stick"), 280)
                .build(),
        );
        empty.insert(items);
        assert_eq!(serializer.deserialize(&node).unwrap(), 280);
    }

    #[test]
    fn registry_ref_checks_registry() {
        let serializer = RegistryRefSerializer::new(access(), item_key());
        let node = Node::with_value(NodeOptions::default(), "stick");
        let reference = serializer.deserialize(&node).unwrap();
        assert_eq!(reference.id(), &id("stick"));

        let missing = Node::with_value(NodeOptions::default(), "lava");
        assert!(serializer.deserialize(&missing).is_err());

        let foreign = RegistryRef::new(RegistryKey::<u16>::new(id("block")), id("stick"));
        let err = serializer.serialize(&foreign, &mut Node::empty()).unwrap_err();
        assert!(matches!(
            err.source_as::<SymbolError>(),
            Some(SymbolError::RegistryMismatch { .. })
        ));
    }

    #[test]
    fn reference_set_through_collection() {
        let collection = SerializerCollection::builder()
            .register::<ReferenceSet<u16>>(ReferenceSetSerializer::from_access(access(), item_key()))
            .register::<Identifier>(IdentifierSerializer)
            .build();
        let options = NodeOptions::from_serializers(Arc::new(collection));

        let node = Node::from_json(options.clone(), &json!(["stick", "stone"])).unwrap();
        let set = node.get_as::<ReferenceSet<u16>>().unwrap();
        assert_eq!(set.resolve().unwrap(), &[280, 1]);

        let absent = Node::root(options.clone());
        let empty = absent.get_as::<ReferenceSet<u16>>().unwrap();
        assert!(empty.is_direct());
        assert!(empty.resolve().unwrap().is_empty());

        let id_node = Node::with_value(options, "ns:thing");
        assert_eq!(id_node.get_as::<Identifier>().unwrap(), id("ns:thing"));
    }

    #[test]
    fn identifier_errors_keep_cause() {
        let node = Node::with_value(NodeOptions::default(), "Bad:Id");
        let err = IdentifierSerializer.deserialize(&node).unwrap_err();
        assert!(matches!(
            err.source_as::<SymbolError>(),
            Some(SymbolError::InvalidIdentifier { .. })
        ));
    }
}
