//! Registry snapshots
//!
//! A [`Registry`] is an externally owned map from [`Identifier`] to value
//! with reverse lookup and named tags. [`MemoryRegistry`] is the in-process
//! implementation hosts populate at startup.

use crate::identifier::Identifier;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed name of a registry
///
/// The type parameter only ties the key to the registry's value type; two
/// keys are equal when their identifiers are.
pub struct RegistryKey<T> {
    id: Identifier,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RegistryKey<T> {
    #[inline]
    #[must_use]
    pub fn new(id: Identifier) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.id
    }
}

impl<T> Clone for RegistryKey<T> {
    fn clone(&self) -> Self {
        Self::new(self.id.clone())
    }
}

impl<T> PartialEq for RegistryKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for RegistryKey<T> {}

impl<T> Hash for RegistryKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> Debug for RegistryKey<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RegistryKey({})", self.id)
    }
}

impl<T> Display for RegistryKey<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.id, f)
    }
}

/// Read-only view of one registry
pub trait Registry<T>: Send + Sync {
    /// Key this registry is published under
    fn key(&self) -> &RegistryKey<T>;

    /// Value registered under `id`
    fn get(&self, id: &Identifier) -> Option<T>;

    /// Identifier `value` is registered under
    fn get_key(&self, value: &T) -> Option<Identifier>;

    /// Members of tag `tag` in registry order, nested tags expanded
    ///
    /// Returns `None` if the tag is not defined.
    fn tag(&self, tag: &Identifier) -> Option<Vec<T>>;

    /// Number of registered values
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains_key(&self, id: &Identifier) -> bool {
        self.get(id).is_some()
    }
}

/// One member of a tag definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagMember {
    /// A registered value
    Element(Identifier),
    /// Every member of another tag
    Tag(Identifier),
}

/// Registry backed by insertion-ordered maps
#[derive(Clone)]
pub struct MemoryRegistry<T> {
    key: RegistryKey<T>,
    entries: IndexMap<Identifier, T>,
    reverse: HashMap<T, Identifier>,
    tags: IndexMap<Identifier, Vec<TagMember>>,
}

impl<T> MemoryRegistry<T>
where
    T: Clone + Eq + Hash + Send + Sync,
{
    #[inline]
    #[must_use]
    pub fn builder(key: RegistryKey<T>) -> MemoryRegistryBuilder<T> {
        MemoryRegistryBuilder {
            key,
            entries: IndexMap::new(),
            tags: IndexMap::new(),
        }
    }

    /// Registered identifiers in registration order
    pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
        self.entries.keys()
    }

    /// Names of all defined tags
    pub fn tag_ids(&self) -> impl Iterator<Item = &Identifier> {
        self.tags.keys()
    }

    fn collect_tag(
        &self,
        tag: &Identifier,
        visiting: &mut HashSet<Identifier>,
        out: &mut BTreeSet<usize>,
    ) {
        if !visiting.insert(tag.clone()) {
            tracing::debug!(registry = %self.key, %tag, "tag cycle skipped");
            return;
        }
        let Some(members) = self.tags.get(tag) else {
            return;
        };
        for member in members {
            match member {
                TagMember::Element(id) => {
                    if let Some(index) = self.entries.get_index_of(id) {
                        out.insert(index);
                    }
                }
                TagMember::Tag(nested) => self.collect_tag(nested, visiting, out),
            }
        }
    }
}

impl<T> Registry<T> for MemoryRegistry<T>
where
    T: Clone + Eq + Hash + Send + Sync,
{
    #[inline]
    fn key(&self) -> &RegistryKey<T> {
        &self.key
    }

    fn get(&self, id: &Identifier) -> Option<T> {
        self.entries.get(id).cloned()
    }

    fn get_key(&self, value: &T) -> Option<Identifier> {
        self.reverse.get(value).cloned()
    }

    fn tag(&self, tag: &Identifier) -> Option<Vec<T>> {
        if !self.tags.contains_key(tag) {
            return None;
        }
        let mut indices = BTreeSet::new();
        self.collect_tag(tag, &mut HashSet::new(), &mut indices);
        Some(
            indices
                .into_iter()
                .filter_map(|i| self.entries.get_index(i).map(|(_, v)| v.clone()))
                .collect(),
        )
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<T> Debug for MemoryRegistry<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRegistry")
            .field("key", &self.key)
            .field("entries", &self.entries.len())
            .field("tags", &self.tags.len())
            .finish()
    }
}

/// Builder for [`MemoryRegistry`]
pub struct MemoryRegistryBuilder<T> {
    key: RegistryKey<T>,
    entries: IndexMap<Identifier, T>,
    tags: IndexMap<Identifier, Vec<TagMember>>,
}

impl<T> MemoryRegistryBuilder<T>
where
    T: Clone + Eq + Hash + Send + Sync,
{
    /// Register `value` under `id`, replacing an earlier value
    #[must_use]
    pub fn register(mut self, id: Identifier, value: T) -> Self {
        self.entries.insert(id, value);
        self
    }

    /// Define (or extend) tag `tag`
    #[must_use]
    pub fn tag(mut self, tag: Identifier, members: impl IntoIterator<Item = TagMember>) -> Self {
        self.tags.entry(tag).or_default().extend(members);
        self
    }

    #[must_use]
    pub fn build(self) -> MemoryRegistry<T> {
        let reverse = self
            .entries
            .iter()
            .map(|(id, value)| (value.clone(), id.clone()))
            .collect();
        MemoryRegistry {
            key: self.key,
            entries: self.entries,
            reverse,
            tags: self.tags,
        }
    }
}

/// Reference to a single entry of a specific registry
pub struct RegistryRef<T> {
    registry: RegistryKey<T>,
    id: Identifier,
}

impl<T> RegistryRef<T> {
    #[inline]
    #[must_use]
    pub fn new(registry: RegistryKey<T>, id: Identifier) -> Self {
        Self { registry, id }
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &RegistryKey<T> {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.id
    }
}

impl<T> Clone for RegistryRef<T> {
    fn clone(&self) -> Self {
        Self::new(self.registry.clone(), self.id.clone())
    }
}

impl<T> PartialEq for RegistryRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.registry == other.registry && self.id == other.id
    }
}

impl<T> Eq for RegistryRef<T> {}

impl<T> Hash for RegistryRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.registry.hash(state);
        self.id.hash(state);
    }
}

impl<T> Debug for RegistryRef<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RegistryRef({} / {})", self.registry.id, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    fn items() -> MemoryRegistry<String> {
        MemoryRegistry::builder(RegistryKey::new(id("item")))
            .register(id("stick"), "Stick".to_string())
            .register(id("stone"), "Stone".to_string())
            .register(id("dirt"), "Dirt".to_string())
            .tag(
                id("ground"),
                [TagMember::Element(id("dirt")), TagMember::Element(id("stone"))],
            )
            .tag(
                id("all"),
                [
                    TagMember::Tag(id("ground")),
                    TagMember::Element(id("stick")),
                    TagMember::Element(id("stone")),
                    TagMember::Element(id("missing")),
                ],
            )
            .tag(id("loop_a"), [TagMember::Tag(id("loop_b"))])
            .tag(
                id("loop_b"),
                [TagMember::Tag(id("loop_a")), TagMember::Element(id("dirt"))],
            )
            .build()
    }

    #[test]
    fn forward_and_reverse_lookup() {
        let registry = items();
        assert_eq!(registry.get(&id("stick")), Some("Stick".to_string()));
        assert_eq!(registry.get_key(&"Dirt".to_string()), Some(id("dirt")));
        assert_eq!(registry.get(&id("missing")), None);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn tags_follow_registry_order() {
        let registry = items();
        assert_eq!(
            registry.tag(&id("ground")).unwrap(),
            vec!["Stone".to_string(), "Dirt".to_string()]
        );
    }

    #[test]
    fn nested_tags_are_flattened_once() {
        let registry = items();
        assert_eq!(
            registry.tag(&id("all")).unwrap(),
            vec!["Stick".to_string(), "Stone".to_string(), "Dirt".to_string()]
        );
    }

    #[test]
    fn tag_cycles_terminate() {
        let registry = items();
        assert_eq!(registry.tag(&id("loop_a")).unwrap(), vec!["Dirt".to_string()]);
    }

    #[test]
    fn undefined_tag_is_none() {
        assert!(items().tag(&id("nope")).is_none());
    }

    #[test]
    fn keys_compare_by_identifier() {
        let a: RegistryKey<String> = RegistryKey::new(id("item"));
        let b: RegistryKey<String> = RegistryKey::new(id("minecraft:item"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "minecraft:item");
    }
}
