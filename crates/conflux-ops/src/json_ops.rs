//! [`DynamicOps`] over `serde_json::Value`

use crate::error::OpsError;
use crate::ops::{pass_through, DynamicOps};
use conflux_node::Number;
use serde_json::{Map, Value};

/// JSON value model
///
/// Integers are stored as JSON integers and floats as JSON floats;
/// non-finite floats become `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOps;

impl JsonOps {
    fn number(n: &serde_json::Number) -> Result<Number, OpsError> {
        if let Some(v) = n.as_i64() {
            return Ok(i32::try_from(v).map_or(Number::Long(v), Number::Int));
        }
        if n.is_u64() {
            return Err(OpsError::UnsupportedScalarType {
                value: n.to_string(),
                kind: "unsigned 64-bit integer".to_string(),
            });
        }
        n.as_f64()
            .map(Number::Double)
            .ok_or_else(|| OpsError::UnsupportedScalarType {
                value: n.to_string(),
                kind: "arbitrary precision number".to_string(),
            })
    }

    fn key(key: &Value) -> Result<String, OpsError> {
        match key {
            Value::String(s) => Ok(s.clone()),
            Value::Bool(_) | Value::Number(_) => Ok(key.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => {
                Err(OpsError::NotAScalar(key.to_string()))
            }
        }
    }
}

impl DynamicOps for JsonOps {
    type Value = Value;

    fn empty(&self) -> Value {
        Value::Null
    }

    fn create_numeric(&self, value: Number) -> Value {
        match value {
            Number::Byte(v) => Value::from(v),
            Number::Short(v) => Value::from(v),
            Number::Int(v) => Value::from(v),
            Number::Long(v) => Value::from(v),
            Number::Float(v) => Value::from(f64::from(v)),
            Number::Double(v) => Value::from(v),
        }
    }

    fn create_boolean(&self, value: bool) -> Value {
        Value::Bool(value)
    }

    fn create_string(&self, value: &str) -> Value {
        Value::String(value.to_string())
    }

    fn get_number_value(&self, input: &Value) -> Result<Number, OpsError> {
        match input {
            Value::Number(n) => Self::number(n),
            Value::Bool(b) => Ok(Number::Int(i32::from(*b))),
            _ => Err(OpsError::NotANumber(input.to_string())),
        }
    }

    fn get_boolean_value(&self, input: &Value) -> Result<bool, OpsError> {
        match input {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(Self::number(n)?.as_f64() != 0.0),
            _ => Err(OpsError::NotABoolean(input.to_string())),
        }
    }

    fn get_string_value(&self, input: &Value) -> Result<String, OpsError> {
        match input {
            Value::String(s) => Ok(s.clone()),
            Value::Bool(_) | Value::Number(_) => Ok(input.to_string()),
            _ => Err(OpsError::NotAString(input.to_string())),
        }
    }

    fn merge_to_list(&self, list: &Value, value: Value) -> Result<Value, OpsError> {
        match list {
            Value::Array(items) => {
                let mut items = items.clone();
                items.push(value);
                Ok(Value::Array(items))
            }
            Value::Null => Ok(Value::Array(vec![value])),
            _ => Err(OpsError::TypeMismatch {
                operation: "merge_to_list",
                input: list.to_string(),
            }),
        }
    }

    fn merge_to_map(&self, map: &Value, key: &Value, value: Value) -> Result<Value, OpsError> {
        let mut merged = match map {
            Value::Object(entries) => entries.clone(),
            Value::Null => Map::new(),
            _ => {
                return Err(OpsError::TypeMismatch {
                    operation: "merge_to_map",
                    input: map.to_string(),
                })
            }
        };
        merged.insert(Self::key(key)?, value);
        Ok(Value::Object(merged))
    }

    fn get_map_values(&self, input: &Value) -> Result<Vec<(Value, Value)>, OpsError> {
        match input {
            Value::Object(entries) => Ok(entries
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                .collect()),
            _ => Err(OpsError::NotAMap(input.to_string())),
        }
    }

    fn create_map(&self, entries: Vec<(Value, Value)>) -> Result<Value, OpsError> {
        let mut map = Map::with_capacity(entries.len());
        for (key, value) in entries {
            map.insert(Self::key(&key)?, value);
        }
        Ok(Value::Object(map))
    }

    fn get_stream(&self, input: &Value) -> Result<Vec<Value>, OpsError> {
        match input {
            Value::Array(items) => Ok(items.clone()),
            _ => Err(OpsError::NotAList(input.to_string())),
        }
    }

    fn create_list(&self, items: Vec<Value>) -> Value {
        Value::Array(items)
    }

    fn remove(&self, input: &Value, key: &str) -> Value {
        let mut copy = input.clone();
        if let Value::Object(entries) = &mut copy {
            entries.remove(key);
        }
        copy
    }

    fn get(&self, input: &Value, key: &str) -> Result<Value, OpsError> {
        input
            .get(key)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| OpsError::KeyAbsent {
                key: key.to_string(),
                input: input.to_string(),
            })
    }

    fn set(&self, input: &Value, key: &str, value: Value) -> Value {
        let mut entries = match input {
            Value::Object(entries) => entries.clone(),
            _ => Map::new(),
        };
        entries.insert(key.to_string(), value);
        Value::Object(entries)
    }

    fn update<F>(&self, input: &Value, key: &str, f: F) -> Value
    where
        F: FnOnce(Value) -> Value,
    {
        let mut copy = input.clone();
        if let Some(slot) = copy.get_mut(key).filter(|v| !v.is_null()) {
            let updated = f(slot.take());
            *slot = updated;
        }
        copy
    }

    fn convert_to<O: DynamicOps>(&self, out: &O, input: Value) -> Result<O::Value, OpsError> {
        let input = match pass_through::<Self, O>(input) {
            Ok(same) => return Ok(same),
            Err(input) => input,
        };
        match input {
            Value::Null => Ok(out.empty()),
            Value::Bool(b) => Ok(out.create_boolean(b)),
            Value::String(s) => Ok(out.create_string(&s)),
            Value::Number(n) => Ok(match Self::number(&n)? {
                Number::Int(v) => out.create_int(v),
                Number::Long(v) => out.create_long(v),
                other => out.create_double(other.as_f64()),
            }),
            Value::Array(items) => {
                let converted = items
                    .into_iter()
                    .map(|item| self.convert_to(out, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(out.create_list(converted))
            }
            Value::Object(entries) => {
                let converted = entries
                    .into_iter()
                    .map(|(key, value)| Ok((out.create_string(&key), self.convert_to(out, value)?)))
                    .collect::<Result<Vec<_>, OpsError>>()?;
                out.create_map(converted)
            }
        }
    }
}
