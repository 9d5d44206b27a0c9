//! Aggregate attributes over to-many relations.
//!
//! Aggregates are expressed as key path operators appended to a collection
//! attribute, e.g. `books.@count` or `books.@sum.pages`, and yield ordinary
//! attributes that can be compared and sorted on.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;

use crate::attribute::Attribute;

/// Marker for attribute value types that hold many elements.
pub trait Collection {
    /// Element type of the collection.
    type Element;
}

impl<T> Collection for Vec<T> {
    type Element = T;
}

impl<T> Collection for VecDeque<T> {
    type Element = T;
}

impl<T, S> Collection for HashSet<T, S> {
    type Element = T;
}

impl<T> Collection for BTreeSet<T> {
    type Element = T;
}

impl<T, const N: usize> Collection for [T; N] {
    type Element = T;
}

/// Key path collection operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPathOperator {
    /// `@count`
    Count,
    /// `@sum`
    Sum,
    /// `@avg`
    Avg,
    /// `@min`
    Min,
    /// `@max`
    Max,
}

impl KeyPathOperator {
    /// Returns the key path segment for this operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "@count",
            Self::Sum => "@sum",
            Self::Avg => "@avg",
            Self::Min => "@min",
            Self::Max => "@max",
        }
    }

    /// Parses a key path segment such as `@count`.
    #[must_use]
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "@count" => Some(Self::Count),
            "@sum" => Some(Self::Sum),
            "@avg" => Some(Self::Avg),
            "@min" => Some(Self::Min),
            "@max" => Some(Self::Max),
            _ => None,
        }
    }
}

impl fmt::Display for KeyPathOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<C: Collection> Attribute<C> {
    /// Returns an attribute for the number of elements in this relation.
    #[must_use]
    pub fn count(&self) -> Attribute<i64> {
        Attribute::from_path([self.name(), KeyPathOperator::Count.as_str()])
    }

    fn aggregate<U>(&self, op: KeyPathOperator, element: &Attribute<U>) -> Attribute<U> {
        Attribute::from_path([self.name(), op.as_str(), element.name()])
    }

    /// Returns an attribute for the sum of `element` across this relation.
    #[must_use]
    pub fn sum<U>(&self, element: &Attribute<U>) -> Attribute<U> {
        self.aggregate(KeyPathOperator::Sum, element)
    }

    /// Returns an attribute for the smallest `element` in this relation.
    #[must_use]
    pub fn min<U>(&self, element: &Attribute<U>) -> Attribute<U> {
        self.aggregate(KeyPathOperator::Min, element)
    }

    /// Returns an attribute for the largest `element` in this relation.
    #[must_use]
    pub fn max<U>(&self, element: &Attribute<U>) -> Attribute<U> {
        self.aggregate(KeyPathOperator::Max, element)
    }

    /// Returns an attribute for the mean of `element` across this relation.
    #[must_use]
    pub fn avg<U>(&self, element: &Attribute<U>) -> Attribute<f64> {
        Attribute::from_path([self.name(), KeyPathOperator::Avg.as_str(), element.name()])
    }
}

/// Returns an attribute for the number of elements in a to-many relation.
#[must_use]
pub fn count<C: Collection>(attribute: &Attribute<C>) -> Attribute<i64> {
    attribute.count()
}

/// Returns an attribute for the sum of `element` across a to-many relation.
#[must_use]
pub fn sum<C: Collection, U>(attribute: &Attribute<C>, element: &Attribute<U>) -> Attribute<U> {
    attribute.sum(element)
}

/// Returns an attribute for the mean of `element` across a to-many relation.
#[must_use]
pub fn avg<C: Collection, U>(attribute: &Attribute<C>, element: &Attribute<U>) -> Attribute<f64> {
    attribute.avg(element)
}

/// Returns an attribute for the smallest `element` in a to-many relation.
#[must_use]
pub fn min<C: Collection, U>(attribute: &Attribute<C>, element: &Attribute<U>) -> Attribute<U> {
    attribute.min(element)
}

/// Returns an attribute for the largest `element` in a to-many relation.
#[must_use]
pub fn max<C: Collection, U>(attribute: &Attribute<C>, element: &Attribute<U>) -> Attribute<U> {
    attribute.max(element)
}
