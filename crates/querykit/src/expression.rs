//! Expression nodes: the value sources a predicate compares.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::predicate::{Comparison, ComparisonOperator, Predicate};
use crate::value::{ToValue, Value};

/// A value source: either a key path on the model or a constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Reference to an attribute path, e.g. `address.city`.
    KeyPath(String),
    /// Literal constant.
    Constant(Value),
}

impl Expression {
    /// Creates a key path expression.
    #[must_use]
    pub fn key_path(path: impl Into<String>) -> Self {
        Self::KeyPath(path.into())
    }

    /// Creates a constant expression from a literal.
    #[must_use]
    pub fn constant<V: ToValue>(value: V) -> Self {
        Self::Constant(value.to_value())
    }

    /// Creates an explicit null constant.
    #[must_use]
    pub const fn null() -> Self {
        Self::Constant(Value::Null)
    }

    /// Creates a constant expression from a dynamically typed literal.
    ///
    /// # Errors
    ///
    /// Fails with `UnrepresentableValue` when the literal cannot be classified.
    pub fn try_constant<T: Any>(value: &T) -> Result<Self> {
        Value::from_any(value).map(Self::Constant)
    }

    /// Returns the key path if this is a key path expression.
    #[must_use]
    pub fn as_key_path(&self) -> Option<&str> {
        match self {
            Self::KeyPath(path) => Some(path),
            Self::Constant(_) => None,
        }
    }

    fn compare(self, operator: ComparisonOperator, right: Self) -> Predicate {
        Predicate::Comparison(Comparison {
            left: self,
            operator,
            right,
        })
    }

    /// Builds `self == right`.
    #[must_use]
    pub fn equals(self, right: Self) -> Predicate {
        self.compare(ComparisonOperator::Equal, right)
    }

    /// Builds `self != right`.
    #[must_use]
    pub fn not_equals(self, right: Self) -> Predicate {
        self.compare(ComparisonOperator::NotEqual, right)
    }

    /// Builds `self > right`.
    #[must_use]
    pub fn greater_than(self, right: Self) -> Predicate {
        self.compare(ComparisonOperator::GreaterThan, right)
    }

    /// Builds `self >= right`.
    #[must_use]
    pub fn greater_or_equal(self, right: Self) -> Predicate {
        self.compare(ComparisonOperator::GreaterOrEqual, right)
    }

    /// Builds `self < right`.
    #[must_use]
    pub fn less_than(self, right: Self) -> Predicate {
        self.compare(ComparisonOperator::LessThan, right)
    }

    /// Builds `self <= right`.
    #[must_use]
    pub fn less_or_equal(self, right: Self) -> Predicate {
        self.compare(ComparisonOperator::LessOrEqual, right)
    }

    /// Builds `self LIKE pattern`.
    ///
    /// `*` matches any run of characters and `?` matches exactly one.
    #[must_use]
    pub fn like(self, pattern: Self) -> Predicate {
        self.compare(ComparisonOperator::Like, pattern)
    }

    /// Builds `self IN {values...}`.
    ///
    /// Each value is kept as its own constant, in the given order.
    #[must_use]
    pub fn is_in(self, values: Vec<Value>) -> Predicate {
        self.compare(ComparisonOperator::In, Self::Constant(Value::Array(values)))
    }

    /// Builds `self BETWEEN {lower, upper}`.
    ///
    /// The bounds are passed through unchanged.
    #[must_use]
    pub fn between(self, lower: Value, upper: Value) -> Predicate {
        self.compare(
            ComparisonOperator::Between,
            Self::Constant(Value::Array(vec![lower, upper])),
        )
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyPath(path) => write!(f, "{path}"),
            Self::Constant(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_keeps_type() {
        assert_eq!(Expression::constant(18), Expression::Constant(Value::Int(18)));
        assert_eq!(Expression::null(), Expression::Constant(Value::Null));
    }

    #[test]
    fn test_between_wraps_bounds_in_pair() {
        let p = Expression::key_path("age").between(Value::Int(18), Value::Int(65));
        let Predicate::Comparison(c) = p else {
            panic!("expected comparison");
        };
        assert_eq!(c.operator, ComparisonOperator::Between);
        assert_eq!(
            c.right,
            Expression::Constant(Value::Array(vec![Value::Int(18), Value::Int(65)]))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Expression::key_path("address.city").to_string(), "address.city");
        assert_eq!(Expression::constant("x").to_string(), "\"x\"");
    }
}
