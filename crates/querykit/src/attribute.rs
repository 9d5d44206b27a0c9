//! Typed attribute handles.
//!
//! An [`Attribute<T>`] names a (possibly compound) key path on a model and
//! carries the attribute's value type `T`, so comparisons can only be built
//! against literals of the right type.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Not, Range};

use crate::expression::Expression;
use crate::predicate::Predicate;
use crate::sort::SortDescriptor;
use crate::value::ToValue;

/// An attribute on a model, identified by its key path.
///
/// # Example
///
/// ```
/// use querykit::Attribute;
///
/// let age = Attribute::<i64>::new("age");
/// let city = Attribute::<String>::from_path(["address", "city"]);
///
/// assert_eq!(city.name(), "address.city");
/// assert_eq!(age.greater_than(18).to_string(), "age > 18");
/// assert_eq!(city.like("Lon*").to_string(), "address.city LIKE \"Lon*\"");
/// ```
pub struct Attribute<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

// Manual impls avoid `T: Clone`/`T: PartialEq` bounds; only the name matters.
impl<T> Clone for Attribute<T> {
    fn clone(&self) -> Self {
        Self::new(self.name.clone())
    }
}

impl<T> PartialEq for Attribute<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Attribute<T> {}

impl<T> Hash for Attribute<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Attribute<T> {
    /// Creates an attribute for the given key path.
    ///
    /// The name is stored verbatim and is not validated; the fetch provider
    /// rejects unknown paths at execution time.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }

    /// Creates a compound attribute by joining key path segments with `.`.
    #[must_use]
    pub fn from_path<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parts: Vec<S> = segments.into_iter().collect();
        let parts: Vec<&str> = parts.iter().map(AsRef::as_ref).collect();
        Self::new(parts.join("."))
    }

    /// Returns the attribute's key path.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the key path expression for this attribute.
    #[must_use]
    pub fn expression(&self) -> Expression {
        Expression::KeyPath(self.name.clone())
    }

    /// Returns an ascending sort descriptor for this attribute.
    #[must_use]
    pub fn ascending(&self) -> SortDescriptor {
        SortDescriptor::ascending(self.name.clone())
    }

    /// Returns a descending sort descriptor for this attribute.
    #[must_use]
    pub fn descending(&self) -> SortDescriptor {
        SortDescriptor::descending(self.name.clone())
    }

    /// Follows a to-one relation: `author.then(Person::name())` names
    /// `author.name`.
    #[must_use]
    pub fn then<U>(&self, next: &Attribute<U>) -> Attribute<U> {
        Attribute::from_path([self.name.as_str(), next.name()])
    }
}

impl<T: ToValue> Attribute<T> {
    /// Converts a typed literal into a constant expression.
    #[must_use]
    pub fn constant_expression_for(&self, value: T) -> Expression {
        Expression::constant(value)
    }

    fn constant<V: Into<T>>(&self, value: V) -> Expression {
        self.constant_expression_for(value.into())
    }

    /// Builds `attribute == value`.
    #[must_use]
    pub fn equals<V: Into<T>>(&self, value: V) -> Predicate {
        self.expression().equals(self.constant(value))
    }

    /// Builds `attribute != value`.
    #[must_use]
    pub fn not_equals<V: Into<T>>(&self, value: V) -> Predicate {
        self.expression().not_equals(self.constant(value))
    }

    /// Builds `attribute > value`.
    #[must_use]
    pub fn greater_than<V: Into<T>>(&self, value: V) -> Predicate {
        self.expression().greater_than(self.constant(value))
    }

    /// Builds `attribute >= value`.
    #[must_use]
    pub fn greater_or_equal<V: Into<T>>(&self, value: V) -> Predicate {
        self.expression().greater_or_equal(self.constant(value))
    }

    /// Builds `attribute < value`.
    #[must_use]
    pub fn less_than<V: Into<T>>(&self, value: V) -> Predicate {
        self.expression().less_than(self.constant(value))
    }

    /// Builds `attribute <= value`.
    #[must_use]
    pub fn less_or_equal<V: Into<T>>(&self, value: V) -> Predicate {
        self.expression().less_or_equal(self.constant(value))
    }

    /// Builds `attribute IN {values...}`, preserving the given order.
    #[must_use]
    pub fn is_in<I, V>(&self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<T>,
    {
        let values = values.into_iter().map(|v| v.into().to_value()).collect();
        self.expression().is_in(values)
    }

    /// Builds `attribute BETWEEN {start, end}` from a range.
    ///
    /// Both bounds are passed through unchanged; `18..65` yields the pair
    /// `{18, 65}`.
    #[must_use]
    pub fn between<V: Into<T>>(&self, range: Range<V>) -> Predicate {
        self.expression()
            .between(range.start.into().to_value(), range.end.into().to_value())
    }
}

impl Attribute<String> {
    /// Builds `attribute LIKE pattern`, where `*` matches any run of
    /// characters and `?` matches one.
    ///
    /// Only string attributes accept patterns:
    ///
    /// ```compile_fail
    /// use querykit::Attribute;
    ///
    /// let age = Attribute::<i64>::new("age");
    /// let _ = age.like("1*");
    /// ```
    #[must_use]
    pub fn like(&self, pattern: impl Into<String>) -> Predicate {
        self.expression().like(Expression::constant(pattern.into()))
    }

    /// Builds `attribute LIKE "*needle*"`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> Predicate {
        self.like(format!("*{needle}*"))
    }

    /// Builds `attribute LIKE "prefix*"`.
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> Predicate {
        self.like(format!("{prefix}*"))
    }

    /// Builds `attribute LIKE "*suffix"`.
    #[must_use]
    pub fn ends_with(&self, suffix: &str) -> Predicate {
        self.like(format!("*{suffix}"))
    }
}

impl<U> Attribute<Option<U>> {
    /// Builds `attribute == nil`.
    #[must_use]
    pub fn is_null(&self) -> Predicate {
        self.expression().equals(Expression::null())
    }

    /// Builds `attribute != nil`.
    #[must_use]
    pub fn is_not_null(&self) -> Predicate {
        self.expression().not_equals(Expression::null())
    }
}

/// `!attribute` is shorthand for `attribute == false`.
impl Not for Attribute<bool> {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.equals(false)
    }
}

impl Not for &Attribute<bool> {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.equals(false)
    }
}
