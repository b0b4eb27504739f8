//! JSON and YAML adapters
//!
//! Loads text or `serde_json::Value` trees into nodes and back. Integers
//! that fit 32 bits become `Int` scalars, larger ones `Long`; all other
//! numbers become `Double`.

use crate::error::NodeError;
use crate::node::{Node, NodeOptions, NodeValue};
use crate::scalar::Scalar;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

impl Node {
    /// Build a tree from a JSON value
    ///
    /// # Errors
    /// Returns [`NodeError::UnsupportedScalarType`] for integers above
    /// `i64::MAX`.
    pub fn from_json(options: NodeOptions, value: &JsonValue) -> Result<Self, NodeError> {
        let mut node = Node::root(options);
        let converted = json_to_value(&node, value)?;
        node.set(converted);
        Ok(node)
    }

    /// Parse JSON text into a tree with default options
    ///
    /// # Errors
    /// Returns error if the text is not valid JSON or holds unsupported numbers
    pub fn from_json_str(text: &str) -> Result<Self, NodeError> {
        let value: JsonValue = serde_json::from_str(text)?;
        Self::from_json(NodeOptions::default(), &value)
    }

    /// Parse YAML text into a tree with default options
    ///
    /// # Errors
    /// Returns error if the text is not valid YAML or holds unsupported numbers
    pub fn from_yaml_str(text: &str) -> Result<Self, NodeError> {
        let value: JsonValue = serde_yaml::from_str(text)?;
        Self::from_json(NodeOptions::default(), &value)
    }

    /// Convert this tree to a JSON value
    ///
    /// # Errors
    /// Returns error for non-finite floating point scalars
    pub fn to_json(&self) -> Result<JsonValue, NodeError> {
        Ok(match self.value() {
            NodeValue::Null => JsonValue::Null,
            NodeValue::Scalar(scalar) => scalar_to_json(scalar)?,
            NodeValue::List(items) => JsonValue::Array(
                items
                    .iter()
                    .map(Node::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            NodeValue::Map(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), child.to_json()?);
                }
                JsonValue::Object(out)
            }
        })
    }

    /// Pretty-printed JSON text of this tree
    ///
    /// # Errors
    /// Returns error for non-finite floating point scalars
    pub fn to_json_string(&self) -> Result<String, NodeError> {
        Ok(serde_json::to_string_pretty(&self.to_json()?)?)
    }
}

fn json_to_value(parent: &Node, value: &JsonValue) -> Result<NodeValue, NodeError> {
    Ok(match value {
        JsonValue::Null => NodeValue::Null,
        JsonValue::Bool(b) => NodeValue::Scalar(Scalar::Boolean(*b)),
        JsonValue::String(s) => NodeValue::Scalar(Scalar::String(s.clone())),
        JsonValue::Number(n) => NodeValue::Scalar(json_number(n)?),
        JsonValue::Array(items) => NodeValue::List(
            items
                .iter()
                .map(|item| {
                    let child = json_to_value(parent, item)?;
                    Ok(Node::with_value(parent.options().clone(), child))
                })
                .collect::<Result<_, NodeError>>()?,
        ),
        JsonValue::Object(object) => {
            let mut map = IndexMap::with_capacity(object.len());
            for (key, item) in object {
                let child = json_to_value(parent, item)?;
                map.insert(key.clone(), Node::with_value(parent.options().clone(), child));
            }
            NodeValue::Map(map)
        }
    })
}

fn json_number(n: &serde_json::Number) -> Result<Scalar, NodeError> {
    if let Some(v) = n.as_i64() {
        return Ok(match i32::try_from(v) {
            Ok(small) => Scalar::Int(small),
            Err(_) => Scalar::Long(v),
        });
    }
    if n.is_u64() {
        return Err(NodeError::UnsupportedScalarType {
            value: n.to_string(),
            kind: "unsigned 64-bit integer".to_string(),
        });
    }
    n.as_f64()
        .map(Scalar::Double)
        .ok_or_else(|| NodeError::UnsupportedScalarType {
            value: n.to_string(),
            kind: "arbitrary precision number".to_string(),
        })
}

fn scalar_to_json(scalar: &Scalar) -> Result<JsonValue, NodeError> {
    let float = |v: f64| {
        serde_json::Number::from_f64(v)
            .map(JsonValue::Number)
            .ok_or_else(|| NodeError::Format(format!("non-finite number {v} cannot be written as JSON")))
    };
    Ok(match scalar {
        Scalar::String(s) => JsonValue::String(s.clone()),
        Scalar::Boolean(b) => JsonValue::Bool(*b),
        Scalar::Byte(v) => JsonValue::from(*v),
        Scalar::Short(v) => JsonValue::from(*v),
        Scalar::Int(v) => JsonValue::from(*v),
        Scalar::Long(v) => JsonValue::from(*v),
        Scalar::Float(v) => float(f64::from(*v))?,
        Scalar::Double(v) => float(*v)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn json_round_trip() {
        let value = json!({
            "name": "stone",
            "count": 3,
            "big": 5_000_000_000i64,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "enabled": true
        });
        let node = Node::from_json(NodeOptions::default(), &value).unwrap();

        assert_eq!(node.child("count").unwrap().scalar(), Some(&Scalar::Int(3)));
        assert_eq!(
            node.child("big").unwrap().scalar(),
            Some(&Scalar::Long(5_000_000_000))
        );
        assert_eq!(node.to_json().unwrap(), value);
    }

    #[test]
    fn unsigned_overflow_is_unsupported() {
        let value = json!({ "huge": u64::MAX });
        let err = Node::from_json(NodeOptions::default(), &value).unwrap_err();
        assert!(matches!(err, NodeError::UnsupportedScalarType { .. }));
    }

    #[test]
    fn yaml_text_loads() {
        let node = Node::from_yaml_str("items:\n  - id: minecraft:stick\n    Count: 2\n").unwrap();
        let first = node.at(&"items.0.Count".parse().unwrap()).unwrap();
        assert_eq!(first.as_i32(), Some(2));
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let node = Node::with_value(NodeOptions::default(), f64::NAN);
        assert!(matches!(node.to_json(), Err(NodeError::Format(_))));
    }
}
