//! A value paired with the ops that understand it

use crate::error::OpsError;
use crate::ops::DynamicOps;
use conflux_node::Number;
use std::fmt;

/// A value together with its [`DynamicOps`]
pub struct Dynamic<O: DynamicOps> {
    ops: O,
    value: O::Value,
}

impl<O: DynamicOps> Dynamic<O> {
    #[inline]
    #[must_use]
    pub fn new(ops: O, value: O::Value) -> Self {
        Self { ops, value }
    }

    #[inline]
    #[must_use]
    pub fn ops(&self) -> &O {
        &self.ops
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &O::Value {
        &self.value
    }

    #[inline]
    #[must_use]
    pub fn into_value(self) -> O::Value {
        self.value
    }

    /// Same ops, different value
    #[must_use]
    pub fn with_value(&self, value: O::Value) -> Self
    where
        O: Clone,
    {
        Self::new(self.ops.clone(), value)
    }

    /// Value under `key`
    ///
    /// # Errors
    /// Returns [`OpsError::KeyAbsent`] if there is none
    pub fn get(&self, key: &str) -> Result<Self, OpsError>
    where
        O: Clone,
    {
        self.ops.get(&self.value, key).map(|v| self.with_value(v))
    }

    /// Copy with `value` stored under `key`
    #[must_use]
    pub fn set(&self, key: &str, value: O::Value) -> Self
    where
        O: Clone,
    {
        self.with_value(self.ops.set(&self.value, key, value))
    }

    /// Copy with the value under `key` rewritten, if present
    #[must_use]
    pub fn update<F>(&self, key: &str, f: F) -> Self
    where
        O: Clone,
        F: FnOnce(O::Value) -> O::Value,
    {
        self.with_value(self.ops.update(&self.value, key, f))
    }

    /// # Errors
    /// Returns [`OpsError::NotANumber`] for non-numeric values
    pub fn as_number(&self) -> Result<Number, OpsError> {
        self.ops.get_number_value(&self.value)
    }

    /// # Errors
    /// Returns [`OpsError::NotAString`] for non-scalar values
    pub fn as_string(&self) -> Result<String, OpsError> {
        self.ops.get_string_value(&self.value)
    }

    /// Convert into another value model
    ///
    /// # Errors
    /// Returns the conversion error of the source ops
    pub fn convert<T: DynamicOps>(self, out: T) -> Result<Dynamic<T>, OpsError> {
        let value = self.ops.convert_to(&out, self.value)?;
        Ok(Dynamic::new(out, value))
    }
}

impl<O> Clone for Dynamic<O>
where
    O: DynamicOps + Clone,
{
    fn clone(&self) -> Self {
        Self::new(self.ops.clone(), self.value.clone())
    }
}

impl<O> fmt::Debug for Dynamic<O>
where
    O: DynamicOps + fmt::Debug,
    O::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dynamic")
            .field("ops", &self.ops)
            .field("value", &self.value)
            .finish()
    }
}
