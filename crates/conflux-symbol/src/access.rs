//! Deferred registry access
//!
//! Registries may be published by the host after serializers referencing
//! them were built. [`RegistryAccess`] is the shared lookup table hosts
//! publish into; [`RegistryResolver`] is the deferred handle serializers
//! keep, re-resolved on every use.

use crate::error::SymbolError;
use crate::identifier::Identifier;
use crate::registry::{Registry, RegistryKey, RegistryRef};
use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type RegistrySupplier<T> = dyn Fn() -> Result<Arc<dyn Registry<T>>, SymbolError> + Send + Sync;

/// Concurrent table of published registries
///
/// Each entry stores an `Arc<dyn Registry<T>>` for the registry's value type.
#[derive(Default)]
pub struct RegistryAccess {
    registries: DashMap<Identifier, Box<dyn Any + Send + Sync>>,
}

impl RegistryAccess {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a registry under its own key
    ///
    /// Returns true if a registry with the same key was replaced.
    pub fn insert<T: 'static>(&self, registry: Arc<dyn Registry<T>>) -> bool {
        let id = registry.key().id().clone();
        tracing::debug!(registry = %id, entries = registry.len(), "registry published");
        self.registries.insert(id, Box::new(registry)).is_some()
    }

    /// Withdraw a registry
    pub fn remove(&self, id: &Identifier) -> bool {
        self.registries.remove(id).is_some()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &Identifier) -> bool {
        self.registries.contains_key(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.registries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }

    /// Published registry keys, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<Identifier> {
        let mut keys: Vec<_> = self.registries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Current snapshot of registry `key`
    ///
    /// # Errors
    /// Returns [`SymbolError::RegistryUnavailable`] if no registry of that
    /// key and value type has been published
    pub fn registry<T: 'static>(
        &self,
        key: &RegistryKey<T>,
    ) -> Result<Arc<dyn Registry<T>>, SymbolError> {
        self.registries
            .get(key.id())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn Registry<T>>>().cloned())
            .ok_or_else(|| SymbolError::RegistryUnavailable {
                registry: key.id().clone(),
            })
    }

    /// Value registered under `id`
    ///
    /// # Errors
    /// Returns [`SymbolError::RegistryUnavailable`] or [`SymbolError::NotFound`]
    pub fn get<T: 'static>(&self, key: &RegistryKey<T>, id: &Identifier) -> Result<T, SymbolError> {
        self.registry(key)?
            .get(id)
            .ok_or_else(|| SymbolError::NotFound {
                registry: key.id().clone(),
                what: format!("key {id}"),
            })
    }

    /// Identifier `value` is registered under
    ///
    /// # Errors
    /// Returns [`SymbolError::RegistryUnavailable`] or [`SymbolError::NotFound`]
    pub fn get_key<T: 'static>(
        &self,
        key: &RegistryKey<T>,
        value: &T,
    ) -> Result<Identifier, SymbolError> {
        self.registry(key)?
            .get_key(value)
            .ok_or_else(|| SymbolError::NotFound {
                registry: key.id().clone(),
                what: "value".to_string(),
            })
    }

    /// Resolve a registry reference to its value
    ///
    /// # Errors
    /// Returns [`SymbolError::RegistryUnavailable`] or [`SymbolError::NotFound`]
    pub fn resolve_ref<T: 'static>(&self, reference: &RegistryRef<T>) -> Result<T, SymbolError> {
        self.get(reference.registry(), reference.id())
    }
}

impl fmt::Debug for RegistryAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryAccess")
            .field("registries", &self.keys())
            .finish()
    }
}

/// Deferred handle to one registry
///
/// Building a resolver never fails; [`RegistryResolver::resolve`] looks the
/// registry up again on every call.
pub struct RegistryResolver<T> {
    key: RegistryKey<T>,
    supplier: Arc<RegistrySupplier<T>>,
}

impl<T: 'static> RegistryResolver<T> {
    /// Resolve through a shared access table
    #[must_use]
    pub fn from_access(access: Arc<RegistryAccess>, key: RegistryKey<T>) -> Self {
        let lookup = key.clone();
        Self {
            key,
            supplier: Arc::new(move || access.registry(&lookup)),
        }
    }

    /// Always resolve to `registry`
    #[must_use]
    pub fn fixed(registry: Arc<dyn Registry<T>>) -> Self {
        Self {
            key: registry.key().clone(),
            supplier: Arc::new(move || Ok(Arc::clone(&registry))),
        }
    }

    /// Resolve through an arbitrary supplier
    #[must_use]
    pub fn from_fn<F>(key: RegistryKey<T>, supplier: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Registry<T>>, SymbolError> + Send + Sync + 'static,
    {
        Self {
            key,
            supplier: Arc::new(supplier),
        }
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &RegistryKey<T> {
        &self.key
    }

    /// Current registry snapshot
    ///
    /// # Errors
    /// Returns [`SymbolError::RegistryUnavailable`] if the registry is not
    /// published yet
    #[inline]
    pub fn resolve(&self) -> Result<Arc<dyn Registry<T>>, SymbolError> {
        (self.supplier)()
    }
}

impl<T> Clone for RegistryResolver<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            supplier: Arc::clone(&self.supplier),
        }
    }
}

impl<T> fmt::Debug for RegistryResolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryResolver")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    fn blocks() -> Arc<dyn Registry<u32>> {
        Arc::new(
            MemoryRegistry::builder(RegistryKey::new(id("block")))
                .register(id("stone"), 1)
                .register(id("dirt"), 3)
                .build(),
        )
    }

    #[test]
    fn lookup_through_access() {
        let access = RegistryAccess::new();
        access.insert(blocks());
        let key = RegistryKey::<u32>::new(id("block"));

        assert_eq!(access.get(&key, &id("dirt")).unwrap(), 3);
        assert_eq!(access.get_key(&key, &1).unwrap(), id("stone"));
        assert!(matches!(
            access.get(&key, &id("lava")),
            Err(SymbolError::NotFound { .. })
        ));
        assert_eq!(
            access
                .resolve_ref(&RegistryRef::new(key, id("stone")))
                .unwrap(),
            1
        );
    }

    #[test]
    fn wrong_value_type_is_unavailable() {
        let access = RegistryAccess::new();
        access.insert(blocks());
        let key = RegistryKey::<String>::new(id("block"));
        assert!(matches!(
            access.registry(&key),
            Err(SymbolError::RegistryUnavailable { .. })
        ));
    }

    #[test]
    fn resolver_defers_until_published() {
        let access = Arc::new(RegistryAccess::new());
        let resolver = RegistryResolver::from_access(
            Arc::clone(&access),
            RegistryKey::<u32>::new(id("block")),
        );

        let err = resolver.resolve().err().unwrap();
        assert!(err.is_retryable());

        access.insert(blocks());
        assert_eq!(resolver.resolve().unwrap().len(), 2);

        access.remove(&id("block"));
        assert!(resolver.resolve().is_err());
    }

    #[test]
    fn fixed_resolver_uses_registry_key() {
        let resolver = RegistryResolver::fixed(blocks());
        assert_eq!(resolver.key().id(), &id("block"));
        assert!(resolver.resolve().is_ok());
    }
}
