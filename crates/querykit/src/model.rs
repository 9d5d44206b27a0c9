//! Model and record traits.
//!
//! [`Model`] names an entity for fetch requests. [`Record`] gives key-value
//! access to an instance so key paths can be resolved against it. Both are
//! normally implemented with `#[derive(Model)]`.

use std::fmt;

use crate::aggregate::KeyPathOperator;
use crate::value::Value;

/// A queryable model type.
///
/// # Example
///
/// ```ignore
/// use querykit::Model;
///
/// #[derive(Model)]
/// #[model(entity = "Person")]
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// assert_eq!(Person::ENTITY_NAME, "Person");
/// let adults = Person::age().greater_or_equal(18);
/// ```
pub trait Model: Send + Sync + 'static {
    /// Entity name used in fetch requests.
    const ENTITY_NAME: &'static str;

    /// Names of the attributes declared on the model.
    const ATTRIBUTE_NAMES: &'static [&'static str];

    /// Returns the model behind a relation attribute, or `None` for plain
    /// attributes.
    ///
    /// Implementations with relations must override this so key paths
    /// through them can be checked without a record at hand.
    #[must_use]
    fn relationship(_key: &str) -> Option<Relationship> {
        None
    }
}

/// A relation attribute and the model on its far side.
#[derive(Debug, Clone, Copy)]
pub enum Relationship {
    /// A single related record.
    ToOne(Schema),
    /// A collection of related records.
    ToMany(Schema),
}

/// Static description of a model, used to check key paths before any record
/// is evaluated.
#[derive(Clone, Copy)]
pub struct Schema {
    entity: &'static str,
    attributes: &'static [&'static str],
    relationship: fn(&str) -> Option<Relationship>,
}

impl Schema {
    /// Returns the schema of `M`.
    #[must_use]
    pub fn of<M: Model>() -> Self {
        Self {
            entity: M::ENTITY_NAME,
            attributes: M::ATTRIBUTE_NAMES,
            relationship: M::relationship,
        }
    }

    /// Entity name of the model.
    #[must_use]
    pub const fn entity(&self) -> &'static str {
        self.entity
    }

    /// Attribute names of the model.
    #[must_use]
    pub const fn attributes(&self) -> &'static [&'static str] {
        self.attributes
    }

    /// Returns the relation behind `key`, if `key` is a relation attribute.
    #[must_use]
    pub fn relationship(&self, key: &str) -> Option<Relationship> {
        if self.attributes.contains(&key) {
            (self.relationship)(key)
        } else {
            None
        }
    }

    /// Returns whether `path` can resolve on records of this model.
    ///
    /// Follows the same rules as [`value_for_key_path`]: a path ends on a
    /// plain attribute, walks relations segment by segment, and a collection
    /// operator applies to a to-many relation (with an element path, or bare
    /// for `@count`) or to a plain array attribute (bare).
    #[must_use]
    pub fn has_key_path(&self, path: &str) -> bool {
        let segments: Vec<&str> = path.split('.').collect();
        self.check(&segments)
    }

    fn check(&self, segments: &[&str]) -> bool {
        let Some((head, tail)) = segments.split_first() else {
            return false;
        };
        if !self.attributes.contains(head) {
            return false;
        }
        let relationship = (self.relationship)(*head);
        let Some((next, rest)) = tail.split_first() else {
            return relationship.is_none();
        };

        if let Some(op) = KeyPathOperator::parse(*next) {
            return match relationship {
                Some(Relationship::ToMany(_)) if rest.is_empty() => op == KeyPathOperator::Count,
                Some(Relationship::ToMany(schema)) => schema.check(rest),
                Some(Relationship::ToOne(_)) => false,
                None => rest.is_empty(),
            };
        }

        match relationship {
            Some(Relationship::ToOne(schema) | Relationship::ToMany(schema)) => schema.check(tail),
            None => false,
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("entity", &self.entity)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// Key-value access to a model instance.
pub trait Record {
    /// Returns the value stored under a single key, or `None` if the key is
    /// not an attribute of this record.
    fn value_for_key(&self, key: &str) -> Option<Value>;

    /// Returns the related record for a to-one relation.
    fn record_for_key(&self, _key: &str) -> Option<&dyn Record> {
        None
    }

    /// Returns the related records for a to-many relation.
    fn records_for_key(&self, _key: &str) -> Option<Vec<&dyn Record>> {
        None
    }
}

/// Resolves a dot-separated key path against a record.
///
/// Relations are followed segment by segment. A collection operator segment
/// (`@count`, `@sum`, `@avg`, `@min`, `@max`) aggregates over a to-many
/// relation or an array value, using the remaining segments as the element
/// path. Returns `None` when any segment is unknown.
#[must_use]
pub fn value_for_key_path(record: &dyn Record, path: &str) -> Option<Value> {
    let segments: Vec<&str> = path.split('.').collect();
    resolve(record, &segments)
}

fn resolve(record: &dyn Record, segments: &[&str]) -> Option<Value> {
    let (head, tail) = segments.split_first()?;
    if tail.is_empty() {
        return record.value_for_key(head);
    }

    if let Some(op) = KeyPathOperator::parse(tail[0]) {
        return aggregate_for_key(record, head, op, &tail[1..]);
    }

    if let Some(child) = record.record_for_key(head) {
        return resolve(child, tail);
    }

    if let Some(children) = record.records_for_key(head) {
        return children
            .into_iter()
            .map(|child| resolve(child, tail))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array);
    }

    None
}

fn aggregate_for_key(
    record: &dyn Record,
    key: &str,
    op: KeyPathOperator,
    element_path: &[&str],
) -> Option<Value> {
    if let Some(children) = record.records_for_key(key) {
        if element_path.is_empty() {
            // Only @count is meaningful on bare records.
            return match op {
                KeyPathOperator::Count => i64::try_from(children.len()).ok().map(Value::Int),
                _ => None,
            };
        }
        let values = children
            .into_iter()
            .map(|child| resolve(child, element_path))
            .collect::<Option<Vec<_>>>()?;
        return Some(aggregate(op, &values));
    }

    match record.value_for_key(key)? {
        Value::Array(items) if element_path.is_empty() => Some(aggregate(op, &items)),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn aggregate(op: KeyPathOperator, values: &[Value]) -> Value {
    let present: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
    match op {
        KeyPathOperator::Count => i64::try_from(values.len()).map_or(Value::Null, Value::Int),
        KeyPathOperator::Sum => {
            if present.iter().all(|v| matches!(v, Value::Int(_))) {
                let total = present.iter().try_fold(0_i64, |acc, v| match v {
                    Value::Int(n) => acc.checked_add(*n),
                    _ => None,
                });
                if let Some(total) = total {
                    return Value::Int(total);
                }
            }
            present
                .iter()
                .map(|v| v.as_f64())
                .sum::<Option<f64>>()
                .map_or(Value::Null, Value::Float)
        }
        KeyPathOperator::Avg => {
            if present.is_empty() {
                return Value::Null;
            }
            present
                .iter()
                .map(|v| v.as_f64())
                .sum::<Option<f64>>()
                .map_or(Value::Null, |total| Value::Float(total / present.len() as f64))
        }
        KeyPathOperator::Min | KeyPathOperator::Max => {
            let wanted = if op == KeyPathOperator::Min {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Greater
            };
            present
                .into_iter()
                .fold(None::<&Value>, |best, v| match best {
                    Some(b) if v.partial_compare(b) != Some(wanted) => Some(b),
                    _ => Some(v),
                })
                .cloned()
                .unwrap_or(Value::Null)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Book {
        pages: i64,
    }

    impl Record for Book {
        fn value_for_key(&self, key: &str) -> Option<Value> {
            match key {
                "pages" => Some(Value::Int(self.pages)),
                _ => None,
            }
        }
    }

    struct Address {
        city: String,
    }

    impl Record for Address {
        fn value_for_key(&self, key: &str) -> Option<Value> {
            match key {
                "city" => Some(Value::String(self.city.clone())),
                _ => None,
            }
        }
    }

    struct Author {
        address: Address,
        books: Vec<Book>,
        scores: Vec<i64>,
    }

    impl Record for Author {
        fn value_for_key(&self, key: &str) -> Option<Value> {
            match key {
                "scores" => Some(Value::Array(
                    self.scores.iter().copied().map(Value::Int).collect(),
                )),
                _ => None,
            }
        }

        fn record_for_key(&self, key: &str) -> Option<&dyn Record> {
            match key {
                "address" => Some(&self.address),
                _ => None,
            }
        }

        fn records_for_key(&self, key: &str) -> Option<Vec<&dyn Record>> {
            match key {
                "books" => Some(self.books.iter().map(|b| b as &dyn Record).collect()),
                _ => None,
            }
        }
    }

    impl Model for Book {
        const ENTITY_NAME: &'static str = "Book";
        const ATTRIBUTE_NAMES: &'static [&'static str] = &["pages"];
    }

    impl Model for Address {
        const ENTITY_NAME: &'static str = "Address";
        const ATTRIBUTE_NAMES: &'static [&'static str] = &["city"];
    }

    impl Model for Author {
        const ENTITY_NAME: &'static str = "Author";
        const ATTRIBUTE_NAMES: &'static [&'static str] = &["address", "books", "scores"];

        fn relationship(key: &str) -> Option<Relationship> {
            match key {
                "address" => Some(Relationship::ToOne(Schema::of::<Address>())),
                "books" => Some(Relationship::ToMany(Schema::of::<Book>())),
                _ => None,
            }
        }
    }

    fn author() -> Author {
        Author {
            address: Address {
                city: String::from("London"),
            },
            books: vec![Book { pages: 100 }, Book { pages: 300 }],
            scores: vec![4, 9, 1],
        }
    }

    #[test]
    fn test_follows_to_one_relation() {
        assert_eq!(
            value_for_key_path(&author(), "address.city"),
            Some(Value::String(String::from("London")))
        );
    }

    #[test]
    fn test_unknown_segment() {
        assert_eq!(value_for_key_path(&author(), "address.zip"), None);
        assert_eq!(value_for_key_path(&author(), "nope"), None);
    }

    #[test]
    fn test_count_over_records_and_arrays() {
        assert_eq!(value_for_key_path(&author(), "books.@count"), Some(Value::Int(2)));
        assert_eq!(value_for_key_path(&author(), "scores.@count"), Some(Value::Int(3)));
    }

    #[test]
    fn test_element_aggregates() {
        let a = author();
        assert_eq!(value_for_key_path(&a, "books.@sum.pages"), Some(Value::Int(400)));
        assert_eq!(value_for_key_path(&a, "books.@avg.pages"), Some(Value::Float(200.0)));
        assert_eq!(value_for_key_path(&a, "books.@min.pages"), Some(Value::Int(100)));
        assert_eq!(value_for_key_path(&a, "scores.@max"), Some(Value::Int(9)));
    }

    #[test]
    fn test_to_many_path_collects_array() {
        assert_eq!(
            value_for_key_path(&author(), "books.pages"),
            Some(Value::Array(vec![Value::Int(100), Value::Int(300)]))
        );
    }

    #[test]
    fn test_schema_accepts_resolvable_paths() {
        let schema = Schema::of::<Author>();
        assert_eq!(schema.entity(), "Author");
        for path in [
            "scores",
            "address.city",
            "books.pages",
            "books.@count",
            "books.@sum.pages",
            "scores.@max",
        ] {
            assert!(schema.has_key_path(path), "{path} should resolve");
            assert!(value_for_key_path(&author(), path).is_some(), "{path} should resolve");
        }
    }

    #[test]
    fn test_schema_rejects_unknown_paths() {
        let schema = Schema::of::<Author>();
        for path in [
            "",
            "height",
            "address",
            "address.zip",
            "address.@count",
            "books",
            "books.@sum",
            "books.@sum.weight",
            "scores.total",
            "scores.@max.value",
        ] {
            assert!(!schema.has_key_path(path), "{path} should not resolve");
            assert_eq!(value_for_key_path(&author(), path), None, "{path} should not resolve");
        }
    }

    #[test]
    fn test_schema_relationship_lookup() {
        let schema = Schema::of::<Author>();
        assert!(matches!(
            schema.relationship("address"),
            Some(Relationship::ToOne(s)) if s.entity() == "Address"
        ));
        assert!(matches!(
            schema.relationship("books"),
            Some(Relationship::ToMany(s)) if s.attributes() == ["pages"]
        ));
        assert!(schema.relationship("scores").is_none());
        assert!(schema.relationship("missing").is_none());
    }
}
