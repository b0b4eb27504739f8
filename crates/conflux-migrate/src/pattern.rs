//! Path patterns selecting nodes in a tree
//!
//! A pattern is a dotted path where a `*` segment matches every child of a
//! map or list.

use conflux_node::{Node, NodePath, NodeValue, PathError};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Key(String),
    Wildcard,
}

/// Dotted path with `*` wildcards
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Pattern matching only the node it is applied to
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn has_wildcards(&self) -> bool {
        self.segments.contains(&Segment::Wildcard)
    }

    /// Paths of every non-virtual node in `root` this pattern selects
    ///
    /// Map children are visited in insertion order, list children by index.
    #[must_use]
    pub fn matches(&self, root: &Node) -> Vec<NodePath> {
        let mut found = Vec::new();
        Self::collect(&self.segments, root, NodePath::root(), &mut found);
        found
    }

    fn collect(segments: &[Segment], node: &Node, path: NodePath, found: &mut Vec<NodePath>) {
        let Some((head, rest)) = segments.split_first() else {
            if !node.is_virtual() {
                found.push(path);
            }
            return;
        };
        match head {
            Segment::Key(key) => {
                if let Some(child) = node.child(key) {
                    Self::collect(rest, child, path.child(key.as_str()), found);
                }
            }
            Segment::Wildcard => match node.value() {
                NodeValue::Map(map) => {
                    for (key, child) in map {
                        Self::collect(rest, child, path.child(key.as_str()), found);
                    }
                }
                NodeValue::List(items) => {
                    for (index, child) in items.iter().enumerate() {
                        Self::collect(rest, child, path.index(index), found);
                    }
                }
                NodeValue::Null | NodeValue::Scalar(_) => {}
            },
        }
    }
}

impl Display for PathPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Key(key) => f.write_str(key)?,
                Segment::Wildcard => f.write_str(WILDCARD)?,
            }
        }
        Ok(())
    }
}

impl FromStr for PathPattern {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path: NodePath = s.parse()?;
        Ok(Self::from(&path))
    }
}

impl From<&NodePath> for PathPattern {
    fn from(path: &NodePath) -> Self {
        Self {
            segments: path
                .iter()
                .map(|segment| {
                    if segment == WILDCARD {
                        Segment::Wildcard
                    } else {
                        Segment::Key(segment.to_string())
                    }
                })
                .collect(),
        }
    }
}

impl From<NodePath> for PathPattern {
    fn from(path: NodePath) -> Self {
        Self::from(&path)
    }
}

impl<const N: usize> From<[&str; N]> for PathPattern {
    fn from(segments: [&str; N]) -> Self {
        Self::from(NodePath::from(segments))
    }
}
