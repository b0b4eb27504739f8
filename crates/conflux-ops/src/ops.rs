//! The generic algebraic value contract
//!
//! [`DynamicOps`] describes a value model in terms of maps, lists and
//! scalars. Migration engines and codecs are written against this trait
//! only; [`DynamicOps::convert_to`] moves values between two models.

use crate::error::OpsError;
use conflux_node::Number;
use std::any::{Any, TypeId};

/// Operations over one value model
///
/// Implementations never mutate their inputs: every operation that
/// produces a modified value returns a new value.
pub trait DynamicOps: Send + Sync + 'static {
    type Value: Clone + 'static;

    /// A fresh, untyped value
    fn empty(&self) -> Self::Value;

    fn create_numeric(&self, value: Number) -> Self::Value;

    fn create_byte(&self, value: i8) -> Self::Value {
        self.create_numeric(Number::Byte(value))
    }

    fn create_short(&self, value: i16) -> Self::Value {
        self.create_numeric(Number::Short(value))
    }

    fn create_int(&self, value: i32) -> Self::Value {
        self.create_numeric(Number::Int(value))
    }

    fn create_long(&self, value: i64) -> Self::Value {
        self.create_numeric(Number::Long(value))
    }

    fn create_float(&self, value: f32) -> Self::Value {
        self.create_numeric(Number::Float(value))
    }

    fn create_double(&self, value: f64) -> Self::Value {
        self.create_numeric(Number::Double(value))
    }

    fn create_boolean(&self, value: bool) -> Self::Value;

    fn create_string(&self, value: &str) -> Self::Value;

    /// # Errors
    /// Returns [`OpsError::NotANumber`] for non-numeric values
    fn get_number_value(&self, input: &Self::Value) -> Result<Number, OpsError>;

    /// Booleans as themselves, numbers as `!= 0`
    ///
    /// # Errors
    /// Returns [`OpsError::NotABoolean`] for other values
    fn get_boolean_value(&self, input: &Self::Value) -> Result<bool, OpsError> {
        self.get_number_value(input)
            .map(|n| n.as_f64() != 0.0)
            .map_err(|err| OpsError::NotABoolean(err.to_string()))
    }

    /// # Errors
    /// Returns [`OpsError::NotAString`] for non-scalar values
    fn get_string_value(&self, input: &Self::Value) -> Result<String, OpsError>;

    /// Copy of `list` with `value` appended
    ///
    /// An empty input is treated as an empty list.
    ///
    /// # Errors
    /// Returns [`OpsError::TypeMismatch`] if `list` is neither a list nor empty
    fn merge_to_list(&self, list: &Self::Value, value: Self::Value) -> Result<Self::Value, OpsError>;

    /// Copy of `map` with `value` stored under the scalar `key`
    ///
    /// An empty input is treated as an empty map. Storing [`Self::empty`]
    /// follows [`Self::set`]: formats without empty children drop `key`.
    ///
    /// # Errors
    /// Returns [`OpsError::TypeMismatch`] if `map` is neither a map nor
    /// empty, or [`OpsError::NotAScalar`] for a non-scalar key
    fn merge_to_map(
        &self,
        map: &Self::Value,
        key: &Self::Value,
        value: Self::Value,
    ) -> Result<Self::Value, OpsError>;

    /// Entries of a map as independent `(key, value)` copies
    ///
    /// # Errors
    /// Returns [`OpsError::NotAMap`] for non-map values
    fn get_map_values(&self, input: &Self::Value) -> Result<Vec<(Self::Value, Self::Value)>, OpsError>;

    /// # Errors
    /// Returns [`OpsError::NotAScalar`] for a non-scalar key
    fn create_map(&self, entries: Vec<(Self::Value, Self::Value)>) -> Result<Self::Value, OpsError>;

    /// Elements of a list as independent copies
    ///
    /// # Errors
    /// Returns [`OpsError::NotAList`] for non-list values
    fn get_stream(&self, input: &Self::Value) -> Result<Vec<Self::Value>, OpsError>;

    fn create_list(&self, items: Vec<Self::Value>) -> Self::Value;

    /// Copy of a map without `key`; other values are returned unchanged
    fn remove(&self, input: &Self::Value, key: &str) -> Self::Value;

    /// Copy of the value under `key`
    ///
    /// # Errors
    /// Returns [`OpsError::KeyAbsent`] if there is no value under `key`
    fn get(&self, input: &Self::Value, key: &str) -> Result<Self::Value, OpsError>;

    /// Copy of `input` with `value` stored under `key`
    ///
    /// If `value` is [`Self::empty`], formats that cannot hold an empty child
    /// remove `key` instead. [`NodeOps`](crate::NodeOps) does this, since a
    /// node tree has no empty children; [`JsonOps`](crate::JsonOps) stores
    /// `null`.
    fn set(&self, input: &Self::Value, key: &str, value: Self::Value) -> Self::Value;

    /// Copy of `input` with the value under `key` replaced by `f(value)`
    ///
    /// Absent keys are left absent and `input` is returned unchanged.
    fn update<F>(&self, input: &Self::Value, key: &str, f: F) -> Self::Value
    where
        F: FnOnce(Self::Value) -> Self::Value;

    /// Whether maps should be written in a compressed (list) form
    fn compress_maps(&self) -> bool {
        false
    }

    /// Convert `input` into the value model of `out`
    ///
    /// Converting into the same kind of ops passes `input` through untouched.
    ///
    /// # Errors
    /// Returns [`OpsError::UnsupportedScalarType`] for scalars the target
    /// cannot represent, or a shape error raised by `out`
    fn convert_to<O: DynamicOps>(&self, out: &O, input: Self::Value) -> Result<O::Value, OpsError>;
}

/// Hand `input` over unchanged if `O` is the same ops type as `S`
///
/// Returns the input back when the types differ.
pub(crate) fn pass_through<S, O>(input: S::Value) -> Result<O::Value, S::Value>
where
    S: DynamicOps,
    O: DynamicOps,
{
    if TypeId::of::<S>() != TypeId::of::<O>() {
        return Err(input);
    }
    let mut slot = Some(input);
    let passed = (&mut slot as &mut dyn Any)
        .downcast_mut::<Option<O::Value>>()
        .and_then(Option::take);
    match (passed, slot) {
        (Some(value), _) => Ok(value),
        (None, Some(input)) => Err(input),
        (None, None) => unreachable!("slot is only emptied by a successful downcast"),
    }
}
