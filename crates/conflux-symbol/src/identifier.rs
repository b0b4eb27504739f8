//! Namespaced identifiers
//!
//! Provides [`Identifier`], a `namespace:path` key used to address registry
//! entries and tags.

use crate::error::SymbolError;
use conflux_node::{Node, NodeValue};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::iter;
use std::str::FromStr;

/// Namespace assumed when an identifier is written without one
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A two-part namespaced key
///
/// Both parts are restricted to lowercase ASCII letters, digits, `_`, `-`
/// and `.`; the path may additionally contain `/`. The canonical form is
/// always `namespace:path`, even for the default namespace.
///
/// # Example
/// ```
/// use conflux_symbol::Identifier;
///
/// let id: Identifier = "stone".parse().unwrap();
/// assert_eq!(id.to_string(), "minecraft:stone");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    namespace: String,
    path: String,
}

impl Identifier {
    /// Create an identifier from its parts
    ///
    /// # Errors
    /// Returns [`SymbolError::InvalidIdentifier`] if either part contains a
    /// disallowed character or the path is empty
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Result<Self, SymbolError> {
        let namespace = namespace.into();
        let path = path.into();

        if let Some(c) = namespace.chars().find(|c| !is_namespace_char(*c)) {
            return Err(SymbolError::invalid_identifier(
                &format!("{namespace}:{path}"),
                format!("non [a-z0-9_.-] character '{c}' in namespace"),
            ));
        }
        if path.is_empty() {
            return Err(SymbolError::invalid_identifier(
                &format!("{namespace}:"),
                "path is empty",
            ));
        }
        if let Some(c) = path.chars().find(|c| !is_path_char(*c)) {
            return Err(SymbolError::invalid_identifier(
                &format!("{namespace}:{path}"),
                format!("non [a-z0-9/._-] character '{c}' in path"),
            ));
        }

        let namespace = if namespace.is_empty() {
            DEFAULT_NAMESPACE.to_string()
        } else {
            namespace
        };
        Ok(Self { namespace, path })
    }

    /// Identifier in the default namespace
    ///
    /// # Errors
    /// Returns error if `path` is not a valid path
    #[inline]
    pub fn with_default_namespace(path: impl Into<String>) -> Result<Self, SymbolError> {
        Self::new(DEFAULT_NAMESPACE, path)
    }

    /// Parse `[namespace:]path`
    ///
    /// # Errors
    /// Returns [`SymbolError::InvalidIdentifier`] on malformed input
    pub fn parse(input: &str) -> Result<Self, SymbolError> {
        match input.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, input),
        }
    }

    /// Read an identifier from a node
    ///
    /// Accepted shapes:
    /// - a string in `[namespace:]path` form
    /// - a two element list `[namespace, path]`
    /// - a one element list wrapping a string in `[namespace:]path` form
    ///
    /// # Errors
    /// Returns [`SymbolError::InvalidFormat`] for any other shape and
    /// [`SymbolError::InvalidIdentifier`] for malformed strings
    pub fn from_node(node: &Node) -> Result<Self, SymbolError> {
        match node.value() {
            NodeValue::List(items) => match items.as_slice() {
                [namespace, path] => match (namespace.as_str(), path.as_str()) {
                    (Some(namespace), Some(path)) => Self::new(namespace, path),
                    _ => Err(accepted_formats()),
                },
                [combined] => combined.as_str().map_or_else(|| Err(accepted_formats()), Self::parse),
                _ => Err(accepted_formats()),
            },
            NodeValue::Scalar(_) => node
                .as_str()
                .map_or_else(|| Err(accepted_formats()), Self::parse),
            NodeValue::Map(_) | NodeValue::Null => Err(accepted_formats()),
        }
    }

    /// Write the canonical string form into `node`
    #[inline]
    pub fn to_node(&self, node: &mut Node) {
        node.set(self.to_string());
    }

    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `namespace:path`
    #[inline]
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }

    fn canonical_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.namespace
            .bytes()
            .chain(iter::once(b':'))
            .chain(self.path.bytes())
    }
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

fn accepted_formats() -> SymbolError {
    SymbolError::InvalidFormat("the provided item must be in [<namespace>:]<path> format".to_string())
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for Identifier {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_bytes().cmp(other.canonical_bytes())
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
