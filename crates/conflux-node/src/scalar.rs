//! Scalar values held by leaf nodes
//!
//! The scalar kinds form a closed set. Every conversion between node trees
//! and other value models matches [`Scalar`] exhaustively, so a new kind
//! cannot be added without handling it everywhere.

use std::fmt::{self, Display, Formatter};

/// A leaf value of a configuration tree
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

/// Numeric subset of [`Scalar`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

/// Discriminant of a [`Scalar`], used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Scalar {
    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::String(_) => ScalarKind::String,
            Self::Boolean(_) => ScalarKind::Boolean,
            Self::Byte(_) => ScalarKind::Byte,
            Self::Short(_) => ScalarKind::Short,
            Self::Int(_) => ScalarKind::Int,
            Self::Long(_) => ScalarKind::Long,
            Self::Float(_) => ScalarKind::Float,
            Self::Double(_) => ScalarKind::Double,
        }
    }

    /// Numeric view of this scalar, if it is one of the number kinds
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Byte(v) => Some(Number::Byte(*v)),
            Self::Short(v) => Some(Number::Short(*v)),
            Self::Int(v) => Some(Number::Int(*v)),
            Self::Long(v) => Some(Number::Long(*v)),
            Self::Float(v) => Some(Number::Float(*v)),
            Self::Double(v) => Some(Number::Double(*v)),
            Self::String(_) | Self::Boolean(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Render as a map key
    ///
    /// Strings are used verbatim, numbers in decimal, booleans as
    /// `true`/`false`.
    #[must_use]
    pub fn to_key(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl Number {
    /// Value as a 64-bit integer; floats are truncated toward zero
    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Byte(v) => i64::from(v),
            Self::Short(v) => i64::from(v),
            Self::Int(v) => i64::from(v),
            Self::Long(v) => v,
            Self::Float(v) => v as i64,
            Self::Double(v) => v as i64,
        }
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Byte(v) => f64::from(v),
            Self::Short(v) => f64::from(v),
            Self::Int(v) => f64::from(v),
            Self::Long(v) => v as f64,
            Self::Float(v) => f64::from(v),
            Self::Double(v) => v,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_integral(self) -> bool {
        !matches!(self, Self::Float(_) | Self::Double(_))
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(v) => f.write_str(v),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
        }
    }
}

impl Display for ScalarKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        };
        f.write_str(name)
    }
}

impl From<Number> for Scalar {
    fn from(number: Number) -> Self {
        match number {
            Number::Byte(v) => Self::Byte(v),
            Number::Short(v) => Self::Short(v),
            Number::Int(v) => Self::Int(v),
            Number::Long(v) => Self::Long(v),
            Number::Float(v) => Self::Float(v),
            Number::Double(v) => Self::Double(v),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

scalar_from! {
    String => String,
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
}

impl From<&str> for Scalar {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Scalar::from(3i8).kind(), ScalarKind::Byte);
        assert_eq!(Scalar::from(3i64).kind(), ScalarKind::Long);
        assert_eq!(Scalar::from("x").kind(), ScalarKind::String);
        assert_eq!(Scalar::from(true).kind(), ScalarKind::Boolean);
    }

    #[test]
    fn numbers_have_numeric_view() {
        assert_eq!(Scalar::Int(7).as_number(), Some(Number::Int(7)));
        assert_eq!(Scalar::Double(1.5).as_number(), Some(Number::Double(1.5)));
        assert_eq!(Scalar::Boolean(true).as_number(), None);
        assert_eq!(Scalar::from("7").as_number(), None);
    }

    #[test]
    fn number_widening() {
        assert_eq!(Number::Short(-4).as_i64(), -4);
        assert_eq!(Number::Double(2.9).as_i64(), 2);
        assert_eq!(Number::Float(0.5).as_f64(), 0.5);
        assert!(Number::Long(1).is_integral());
        assert!(!Number::Float(1.0).is_integral());
    }

    #[test]
    fn key_rendering() {
        assert_eq!(Scalar::from("minecraft:stone").to_key(), "minecraft:stone");
        assert_eq!(Scalar::Int(0).to_key(), "0");
        assert_eq!(Scalar::Boolean(false).to_key(), "false");
    }

    #[test]
    fn number_round_trips_through_scalar() {
        let scalar = Scalar::from(Number::Short(12));
        assert_eq!(scalar, Scalar::Short(12));
    }
}
