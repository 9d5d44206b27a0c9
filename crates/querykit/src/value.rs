//! Constant values used on the right-hand side of predicates.
//!
//! Every literal is classified into a closed set of tags when it is turned into
//! a [`Value`]. The tag is chosen by the [`ToValue`] impl selected at compile
//! time, so an `i64` never becomes a `bool` and `None` always becomes
//! [`Value::Null`].

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// A reference to another model instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Entity name of the referenced model.
    pub entity: String,
    /// Identifier of the referenced instance.
    pub id: String,
}

impl ObjectRef {
    /// Creates a new object reference.
    #[must_use]
    pub fn new(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// A constant value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    String(String),
    /// Point in time.
    Date(DateTime<Utc>),
    /// Binary value.
    Bytes(Vec<u8>),
    /// Reference to another model instance.
    Object(ObjectRef),
    /// Ordered list of values, used by `IN` and `BETWEEN`.
    Array(Vec<Value>),
}

impl Value {
    /// Returns whether this is [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns a short name for the value's tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Bytes(_) => "bytes",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
        }
    }

    /// Returns the value as a float if it is numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Orders two values of compatible kinds.
    ///
    /// Integers and floats compare numerically with each other. Null and
    /// values of unrelated kinds have no order.
    #[must_use]
    pub fn partial_compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Bytes(a), Self::Bytes(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Classifies a dynamically typed literal.
    ///
    /// Literals whose concrete type is not one of the recognized categories
    /// fail with [`QueryError::UnrepresentableValue`]; they are never turned
    /// into a null constant.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnrepresentableValue`] when `T` is not a known
    /// literal type, or when an unsigned value does not fit in an `i64`.
    pub fn from_any<T: Any>(value: &T) -> Result<Self> {
        let any = value as &dyn Any;

        macro_rules! classify {
            ($($ty:ty),* $(,)?) => {
                $(
                    if let Some(v) = any.downcast_ref::<$ty>() {
                        return Ok(v.clone().to_value());
                    }
                    if let Some(v) = any.downcast_ref::<Option<$ty>>() {
                        return Ok(v.clone().to_value());
                    }
                )*
            };
        }

        classify!(
            bool,
            i8,
            i16,
            i32,
            i64,
            u8,
            u16,
            u32,
            f32,
            f64,
            String,
            &'static str,
            DateTime<Utc>,
            Vec<u8>,
            ObjectRef,
            Value,
        );

        if let Some(v) = any.downcast_ref::<u64>() {
            return Self::try_from(*v);
        }
        if let Some(v) = any.downcast_ref::<usize>() {
            return Self::try_from(*v);
        }

        Err(QueryError::UnrepresentableValue {
            type_name: std::any::type_name::<T>(),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => {
                let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{escaped}\"")
            }
            Self::Date(d) => write!(f, "\"{}\"", d.to_rfc3339()),
            Self::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02x}")).collect();
                write!(f, "<{hex}>")
            }
            Self::Object(o) => write!(f, "<{}:{}>", o.entity, o.id),
            Self::Array(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Trait for literal types that can be turned into a constant [`Value`].
pub trait ToValue {
    /// Converts the literal to a `Value`.
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! int_to_value {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(self) -> Value {
                    Value::Int(i64::from(self))
                }
            }
        )*
    };
}

int_to_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Float(self)
    }
}

impl ToValue for f32 {
    fn to_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::String(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::String(String::from(self))
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(self) -> Value {
        Value::Date(self)
    }
}

impl ToValue for Vec<u8> {
    fn to_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl ToValue for ObjectRef {
    fn to_value(self) -> Value {
        Value::Object(self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

macro_rules! try_wide_int {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<$ty> for Value {
                type Error = QueryError;

                fn try_from(value: $ty) -> Result<Self> {
                    i64::try_from(value)
                        .map(Value::Int)
                        .map_err(|_| QueryError::UnrepresentableValue {
                            type_name: stringify!($ty),
                        })
                }
            }
        )*
    };
}

try_wide_int!(u64, usize, i128, u128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_keep_their_tag() {
        assert_eq!(42_i32.to_value(), Value::Int(42));
        assert_eq!(true.to_value(), Value::Bool(true));
        assert_eq!(1.5_f64.to_value(), Value::Float(1.5));
        assert_eq!("kyle".to_value(), Value::String(String::from("kyle")));
    }

    #[test]
    fn test_none_becomes_explicit_null() {
        assert_eq!(Option::<i64>::None.to_value(), Value::Null);
        assert_eq!(Some(7_i64).to_value(), Value::Int(7));
    }

    #[test]
    fn test_from_any_classifies_known_types() {
        assert_eq!(Value::from_any(&3_i64).unwrap(), Value::Int(3));
        assert_eq!(Value::from_any(&false).unwrap(), Value::Bool(false));
        assert_eq!(
            Value::from_any(&String::from("a")).unwrap(),
            Value::String(String::from("a"))
        );
        assert_eq!(Value::from_any(&Option::<String>::None).unwrap(), Value::Null);
    }

    #[test]
    fn test_from_any_rejects_unknown_types() {
        struct Opaque;
        let err = Value::from_any(&Opaque).unwrap_err();
        assert!(matches!(err, QueryError::UnrepresentableValue { .. }));
    }

    #[test]
    fn test_wide_unsigned_overflow_is_rejected() {
        assert_eq!(Value::try_from(5_u64).unwrap(), Value::Int(5));
        let err = Value::try_from(u64::MAX).unwrap_err();
        assert!(matches!(
            err,
            QueryError::UnrepresentableValue { type_name: "u64" }
        ));
    }

    #[test]
    fn test_partial_compare_crosses_numeric_kinds() {
        assert_eq!(Value::Int(2).partial_compare(&Value::Float(1.5)), Some(Ordering::Greater));
        assert_eq!(Value::Float(2.0).partial_compare(&Value::Int(2)), Some(Ordering::Equal));
        assert_eq!(Value::Int(1).partial_compare(&Value::String(String::from("1"))), None);
        assert_eq!(Value::Null.partial_compare(&Value::Null), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "nil");
        assert_eq!(Value::String(String::from("a\"b")).to_string(), "\"a\\\"b\"");
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "{1, 2}"
        );
        assert_eq!(
            Value::Object(ObjectRef::new("Person", "7")).to_string(),
            "<Person:7>"
        );
    }
}
