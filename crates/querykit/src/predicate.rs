//! Predicate trees.
//!
//! A [`Predicate`] is a backend-neutral boolean condition built from
//! comparisons between [`Expression`]s and the logical combinators AND, OR and
//! NOT. Predicates are plain values: combining them always produces a new
//! tree and never touches the operands.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use serde::{Deserialize, Serialize};

use crate::expression::Expression;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Equal (==)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessOrEqual,
    /// Wildcard pattern match (LIKE)
    Like,
    /// Membership in a list (IN)
    In,
    /// Inclusive range membership (BETWEEN)
    Between,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "=="),
            Self::NotEqual => write!(f, "!="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterOrEqual => write!(f, ">="),
            Self::LessThan => write!(f, "<"),
            Self::LessOrEqual => write!(f, "<="),
            Self::Like => write!(f, "LIKE"),
            Self::In => write!(f, "IN"),
            Self::Between => write!(f, "BETWEEN"),
        }
    }
}

/// A single comparison: `left operator right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Left-hand expression, usually a key path.
    pub left: Expression,
    /// Comparison kind.
    pub operator: ComparisonOperator,
    /// Right-hand expression, usually a constant.
    pub right: Expression,
}

/// A boolean condition tree.
///
/// # Example
///
/// ```
/// use querykit::Attribute;
///
/// let age = Attribute::<i64>::new("age");
/// let verified = Attribute::<bool>::new("verified");
///
/// let p = age.greater_than(18) & (verified.equals(true) | !verified.clone());
/// assert_eq!(p.to_string(), "(age > 18) AND ((verified == true) OR (verified == false))");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Leaf comparison.
    Comparison(Comparison),
    /// Both sides hold.
    And(Box<Predicate>, Box<Predicate>),
    /// Either side holds.
    Or(Box<Predicate>, Box<Predicate>),
    /// The inner predicate does not hold.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Combines this predicate with another using AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Combines this predicate with another using OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Wraps this predicate in NOT.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Returns every key path referenced by this predicate, left to right.
    #[must_use]
    pub fn key_paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        self.collect_key_paths(&mut paths);
        paths
    }

    fn collect_key_paths<'a>(&'a self, paths: &mut Vec<&'a str>) {
        match self {
            Self::Comparison(c) => {
                paths.extend(c.left.as_key_path());
                paths.extend(c.right.as_key_path());
            }
            Self::And(left, right) | Self::Or(left, right) => {
                left.collect_key_paths(paths);
                right.collect_key_paths(paths);
            }
            Self::Not(inner) => inner.collect_key_paths(paths),
        }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl Not for Predicate {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison(c) => write!(f, "{c}"),
            Self::And(left, right) => write!(f, "({left}) AND ({right})"),
            Self::Or(left, right) => write!(f, "({left}) OR ({right})"),
            Self::Not(inner) => write!(f, "NOT ({inner})"),
        }
    }
}
