//! Lazily resolved reference sets
//!
//! A [`ReferenceSet`] is either a named tag, a user-written list of
//! [`TagEntry`] values, or a set of values built directly in code. Members
//! are resolved against the registry on first access and cached; the
//! serialized form is kept so writing the set back reproduces what the user
//! wrote.

use crate::access::RegistryResolver;
use crate::error::SymbolError;
use crate::identifier::Identifier;
use crate::registry::RegistryKey;
use crate::tag_entry::TagEntry;
use conflux_node::{Node, NodeError, NodePath, NodeValue};
use once_cell::sync::OnceCell;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Origin {
    Named(Identifier),
    Serialized(Vec<TagEntry>),
    Direct,
}

/// A deduplicated set of registry values
pub struct ReferenceSet<T> {
    origin: Origin,
    resolver: RegistryResolver<T>,
    resolved: OnceCell<Vec<T>>,
}

impl<T> ReferenceSet<T>
where
    T: Clone + PartialEq + 'static,
{
    /// All members of tag `tag`
    #[must_use]
    pub fn named(tag: Identifier, resolver: RegistryResolver<T>) -> Self {
        Self::with_origin(Origin::Named(tag), resolver)
    }

    /// Union of user-written entries
    #[must_use]
    pub fn from_entries(entries: Vec<TagEntry>, resolver: RegistryResolver<T>) -> Self {
        Self::with_origin(Origin::Serialized(entries), resolver)
    }

    /// Set of already known values
    #[must_use]
    pub fn direct(members: Vec<T>, resolver: RegistryResolver<T>) -> Self {
        let mut unique = Vec::with_capacity(members.len());
        for member in members {
            if !unique.contains(&member) {
                unique.push(member);
            }
        }
        Self {
            origin: Origin::Direct,
            resolver,
            resolved: OnceCell::with_value(unique),
        }
    }

    fn with_origin(origin: Origin, resolver: RegistryResolver<T>) -> Self {
        Self {
            origin,
            resolver,
            resolved: OnceCell::new(),
        }
    }

    /// Parse a reference set from a node
    ///
    /// Accepted shapes:
    /// - a list of entries (anonymous union)
    /// - a `#ns:tag` string (named tag)
    /// - a plain `ns:path` string (one required value)
    /// - an `{id, required}` map; a required `#` id names a tag, anything
    ///   else is a one-entry union
    ///
    /// Nothing is resolved here.
    ///
    /// # Errors
    /// Returns [`SymbolError::InvalidFormat`] or
    /// [`SymbolError::InvalidIdentifier`] for malformed input
    pub fn from_node(node: &Node, resolver: RegistryResolver<T>) -> Result<Self, SymbolError> {
        match node.value() {
            NodeValue::List(items) => {
                let entries = items
                    .iter()
                    .map(TagEntry::from_node)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::from_entries(entries, resolver))
            }
            NodeValue::Scalar(_) => {
                let raw = node.as_str().ok_or_else(|| {
                    SymbolError::InvalidFormat("reference set must be a string, list or map".to_string())
                })?;
                match TagEntry::parse(raw)? {
                    TagEntry::Union { tag, .. } => Ok(Self::named(tag, resolver)),
                    single => Ok(Self::from_entries(vec![single], resolver)),
                }
            }
            NodeValue::Map(_) => match TagEntry::from_node(node)? {
                TagEntry::Union {
                    tag,
                    required: true,
                } => Ok(Self::named(tag, resolver)),
                entry => Ok(Self::from_entries(vec![entry], resolver)),
            },
            NodeValue::Null => Err(SymbolError::InvalidFormat(
                "reference set must be a string, list or map".to_string(),
            )),
        }
    }

    /// Resolved members, in entry order
    ///
    /// The first successful resolution is cached. A missing required entry
    /// fails the whole call and caches nothing.
    ///
    /// # Errors
    /// Returns [`SymbolError::RegistryUnavailable`] or
    /// [`SymbolError::UnresolvedReference`]
    pub fn resolve(&self) -> Result<&[T], SymbolError> {
        self.resolved
            .get_or_try_init(|| {
                let registry = self.resolver.resolve()?;
                let mut members = Vec::new();
                match &self.origin {
                    Origin::Named(tag) => TagEntry::union(tag.clone())
                        .collect_into(registry.as_ref(), &mut members)?,
                    Origin::Serialized(entries) => {
                        for entry in entries {
                            entry.collect_into(registry.as_ref(), &mut members)?;
                        }
                    }
                    Origin::Direct => {}
                }
                Ok(members)
            })
            .map(Vec::as_slice)
    }

    /// True if `value` is a member
    ///
    /// # Errors
    /// Returns error if the set cannot be resolved
    pub fn contains(&self, value: &T) -> Result<bool, SymbolError> {
        Ok(self.resolve()?.contains(value))
    }

    /// Tag name, if this set is a named tag
    #[inline]
    #[must_use]
    pub fn tag_key(&self) -> Option<&Identifier> {
        match &self.origin {
            Origin::Named(tag) => Some(tag),
            _ => None,
        }
    }

    /// Entries as written by the user, if parsed from a list or entry map
    #[inline]
    #[must_use]
    pub fn serialized_form(&self) -> Option<&[TagEntry]> {
        match &self.origin {
            Origin::Serialized(entries) => Some(entries),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.origin == Origin::Direct
    }

    #[inline]
    #[must_use]
    pub fn registry_key(&self) -> &RegistryKey<T> {
        self.resolver.key()
    }

    /// Write this set into `target`
    ///
    /// Named tags become `#ns:tag`. Parsed entry lists are rewritten element
    /// by element when `target` is a list of the same length, otherwise
    /// replaced by a fresh list. Direct sets become a list of identifiers.
    ///
    /// # Errors
    /// Returns a serialization error if the registry is unavailable or a
    /// direct member has no identifier
    pub fn to_node(&self, target: &mut Node) -> Result<(), NodeError> {
        match &self.origin {
            Origin::Named(tag) => {
                target.set(format!("#{tag}"));
            }
            Origin::Serialized(entries) => {
                if target.children_list().len() == entries.len() && target.is_list() {
                    for (index, entry) in entries.iter().enumerate() {
                        let child = target.child_mut(&index.to_string()).ok_or_else(|| {
                            NodeError::serialization(
                                NodePath::root().index(index),
                                "list element disappeared during rewrite",
                            )
                        })?;
                        entry.to_node(child);
                    }
                } else {
                    target.set(NodeValue::List(Vec::new()));
                    for entry in entries {
                        entry.to_node(target.append(NodeValue::Null));
                    }
                }
            }
            Origin::Direct => {
                let registry = self
                    .resolver
                    .resolve()
                    .map_err(|e| e.into_node_error(NodePath::root()))?;
                let members = self.resolved.get().map_or(&[][..], Vec::as_slice);
                let mut ids = Vec::with_capacity(members.len());
                for (index, member) in members.iter().enumerate() {
                    let id = registry.get_key(member).ok_or_else(|| {
                        SymbolError::NotFound {
                            registry: self.registry_key().id().clone(),
                            what: format!("member #{index}"),
                        }
                        .into_node_error(NodePath::root().index(index))
                    })?;
                    ids.push(id);
                }
                target.set(NodeValue::List(Vec::new()));
                for id in ids {
                    target.append(id.to_string());
                }
            }
        }
        Ok(())
    }
}

impl<T: Clone> Clone for ReferenceSet<T> {
    fn clone(&self) -> Self {
        Self {
            origin: self.origin.clone(),
            resolver: self.resolver.clone(),
            resolved: self.resolved.clone(),
        }
    }
}

impl<T: 'static> fmt::Debug for ReferenceSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceSet")
            .field("registry", self.resolver.key())
            .field("origin", &self.origin)
            .field("resolved", &self.resolved.get().map(Vec::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MemoryRegistry, Registry, TagMember};
    use conflux_node::NodeOptions;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    fn resolver() -> RegistryResolver<&'static str> {
        let registry: Arc<dyn Registry<&'static str>> = Arc::new(
            MemoryRegistry::builder(RegistryKey::new(id("item")))
                .register(id("a:b"), "ab")
                .register(id("a:c"), "ac")
                .register(id("a:d"), "ad")
                .tag(
                    id("a:tag"),
                    [TagMember::Element(id("a:d")), TagMember::Element(id("a:c"))],
                )
                .build(),
        );
        RegistryResolver::fixed(registry)
    }

    fn node(value: serde_json::Value) -> Node {
        Node::from_json(NodeOptions::default(), &value).unwrap()
    }

    #[test]
    fn hash_string_is_named() {
        let set = ReferenceSet::from_node(&node(json!("#a:tag")), resolver()).unwrap();
        assert_eq!(set.tag_key(), Some(&id("a:tag")));
        assert_eq!(set.resolve().unwrap(), &["ac", "ad"]);
    }

    #[test]
    fn plain_string_is_single_required_value() {
        let set = ReferenceSet::from_node(&node(json!("a:b")), resolver()).unwrap();
        assert_eq!(set.serialized_form(), Some(&[TagEntry::single(id("a:b"))][..]));
        assert_eq!(set.resolve().unwrap(), &["ab"]);
    }

    #[test]
    fn required_hash_map_is_named() {
        let set = ReferenceSet::from_node(
            &node(json!({"id": "#a:tag", "required": true})),
            resolver(),
        )
        .unwrap();
        assert!(set.tag_key().is_some());
    }

    #[test]
    fn optional_map_is_wrapped() {
        let set =
            ReferenceSet::from_node(&node(json!({"id": "#a:tag"})), resolver()).unwrap();
        assert!(set.tag_key().is_none());
        assert_eq!(set.serialized_form().map(<[_]>::len), Some(1));
    }

    #[test]
    fn list_members_are_deduplicated_in_order() {
        let set =
            ReferenceSet::from_node(&node(json!(["a:c", "#a:tag", "a:b"])), resolver()).unwrap();
        assert_eq!(set.resolve().unwrap(), &["ac", "ad", "ab"]);
        assert!(set.contains(&"ad").unwrap());
    }

    #[test]
    fn optional_missing_is_dropped() {
        let set = ReferenceSet::from_node(
            &node(json!([{"id": "#ns:missing", "required": false}])),
            resolver(),
        )
        .unwrap();
        assert!(set.resolve().unwrap().is_empty());
    }

    #[test]
    fn required_missing_fails_without_partial_result() {
        let set = ReferenceSet::from_node(
            &node(json!(["a:b", {"id": "#ns:missing", "required": true}])),
            resolver(),
        )
        .unwrap();
        assert!(matches!(
            set.resolve(),
            Err(SymbolError::UnresolvedReference { .. })
        ));
        assert!(set.resolved.get().is_none());
    }

    #[test]
    fn shape_is_preserved_on_write() {
        let source = json!(["a:b", {"id": "#a:tag", "required": false}]);
        let set = ReferenceSet::from_node(&node(source.clone()), resolver()).unwrap();
        set.resolve().unwrap();

        let mut fresh = Node::empty();
        set.to_node(&mut fresh).unwrap();
        assert_eq!(fresh.to_json().unwrap(), source);

        let mut existing = node(source.clone());
        set.to_node(&mut existing).unwrap();
        assert_eq!(existing.to_json().unwrap(), source);
    }

    #[test]
    fn named_writes_hash_string() {
        let set = ReferenceSet::named(id("a:tag"), resolver());
        let mut target = Node::empty();
        set.to_node(&mut target).unwrap();
        assert_eq!(target.as_str(), Some("#a:tag"));
    }

    #[test]
    fn direct_writes_identifiers() {
        let set = ReferenceSet::direct(vec!["ad", "ab", "ad"], resolver());
        assert_eq!(set.resolve().unwrap(), &["ad", "ab"]);

        let mut target = Node::empty();
        set.to_node(&mut target).unwrap();
        assert_eq!(target.to_json().unwrap(), json!(["a:d", "a:b"]));
    }

    #[test]
    fn direct_unknown_member_reports_index() {
        let set = ReferenceSet::direct(vec!["ab", "zz"], resolver());
        let err = set.to_node(&mut Node::empty()).unwrap_err();
        assert_eq!(err.path().map(ToString::to_string), Some("1".to_string()));
        assert!(matches!(
            err.source_as::<SymbolError>(),
            Some(SymbolError::NotFound { .. })
        ));
    }

    #[test]
    fn null_node_is_rejected() {
        assert!(matches!(
            ReferenceSet::from_node(&Node::empty(), resolver()),
            Err(SymbolError::InvalidFormat(_))
        ));
    }
}
