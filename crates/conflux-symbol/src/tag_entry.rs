//! Entries of a serialized reference set

use crate::error::SymbolError;
use crate::identifier::Identifier;
use crate::registry::Registry;
use conflux_node::{Node, NodeValue};
use std::fmt::{self, Display, Formatter};

const ID_KEY: &str = "id";
const REQUIRED_KEY: &str = "required";

/// One element of a reference set as written by a user
///
/// Strings are required entries; the map form `{id, required}` can mark an
/// entry optional. A `#` prefix names a tag instead of a single value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagEntry {
    /// A single registry value
    Single { id: Identifier, required: bool },
    /// Every member of a tag
    Union { tag: Identifier, required: bool },
}

impl TagEntry {
    #[inline]
    #[must_use]
    pub fn single(id: Identifier) -> Self {
        Self::Single { id, required: true }
    }

    #[inline]
    #[must_use]
    pub fn union(tag: Identifier) -> Self {
        Self::Union { tag, required: true }
    }

    /// Same entry with a different `required` flag
    #[must_use]
    pub fn with_required(self, required: bool) -> Self {
        match self {
            Self::Single { id, .. } => Self::Single { id, required },
            Self::Union { tag, .. } => Self::Union { tag, required },
        }
    }

    /// Parse `"ns:path"`, `"#ns:tag"` or a `{id, required}` map
    ///
    /// # Errors
    /// Returns [`SymbolError::InvalidFormat`] for other shapes and
    /// [`SymbolError::InvalidIdentifier`] for malformed identifiers
    pub fn from_node(node: &Node) -> Result<Self, SymbolError> {
        match node.value() {
            NodeValue::Map(_) => {
                let raw = node
                    .child(ID_KEY)
                    .and_then(Node::as_str)
                    .ok_or_else(|| {
                        SymbolError::InvalidFormat(format!("entry map requires a string '{ID_KEY}'"))
                    })?;
                let required = match node.child(REQUIRED_KEY) {
                    None => false,
                    Some(flag) => flag.as_bool().ok_or_else(|| {
                        SymbolError::InvalidFormat(format!("'{REQUIRED_KEY}' must be a boolean"))
                    })?,
                };
                Ok(Self::parse(raw)?.with_required(required))
            }
            NodeValue::Scalar(_) => node
                .as_str()
                .ok_or_else(|| SymbolError::InvalidFormat("entry must be a string".to_string()))
                .and_then(Self::parse),
            NodeValue::List(_) | NodeValue::Null => Err(SymbolError::InvalidFormat(
                "entry must be a string or an {id, required} map".to_string(),
            )),
        }
    }

    /// Parse a required entry from its string form
    ///
    /// # Errors
    /// Returns [`SymbolError::InvalidIdentifier`] for malformed identifiers
    pub fn parse(raw: &str) -> Result<Self, SymbolError> {
        match raw.strip_prefix('#') {
            Some(tag) => Identifier::parse(tag).map(Self::union),
            None => Identifier::parse(raw).map(Self::single),
        }
    }

    /// Write this entry into `node`
    ///
    /// Required entries become plain strings. Optional entries keep (or
    /// create) a map and overwrite its `id` and `required` keys, leaving
    /// other keys untouched.
    pub fn to_node(&self, node: &mut Node) {
        if self.required() {
            node.set(self.to_string());
        } else {
            if !node.is_map() {
                node.take();
            }
            node.set_child(ID_KEY, self.to_string())
                .set_child(REQUIRED_KEY, false);
        }
    }

    #[inline]
    #[must_use]
    pub fn required(&self) -> bool {
        match self {
            Self::Single { required, .. } | Self::Union { required, .. } => *required,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_union(&self) -> bool {
        matches!(self, Self::Union { .. })
    }

    /// Identifier of the value or tag
    #[inline]
    #[must_use]
    pub fn key(&self) -> &Identifier {
        match self {
            Self::Single { id, .. } => id,
            Self::Union { tag, .. } => tag,
        }
    }

    /// Append the values this entry resolves to
    ///
    /// Missing optional entries contribute nothing. Values already in `out`
    /// are skipped.
    ///
    /// # Errors
    /// Returns [`SymbolError::UnresolvedReference`] for a missing required
    /// entry
    pub fn collect_into<T: PartialEq>(
        &self,
        registry: &dyn Registry<T>,
        out: &mut Vec<T>,
    ) -> Result<(), SymbolError> {
        let found = match self {
            Self::Single { id, .. } => registry.get(id).map(|v| vec![v]),
            Self::Union { tag, .. } => registry.tag(tag),
        };
        match found {
            Some(values) => {
                for value in values {
                    if !out.contains(&value) {
                        out.push(value);
                    }
                }
                Ok(())
            }
            None if self.required() => Err(SymbolError::UnresolvedReference {
                registry: registry.key().id().clone(),
                reference: self.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Display for TagEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single { id, .. } => Display::fmt(id, f),
            Self::Union { tag, .. } => write!(f, "#{tag}"),
        }
    }
}
