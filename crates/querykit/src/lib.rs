//! # querykit
//!
//! Type-safe query construction for models.
//!
//! This crate provides:
//! - [`Attribute<T>`] handles naming a model's (possibly compound) key paths
//! - [`Expression`] and [`Predicate`] trees built from named comparison
//!   operators and AND/OR/NOT
//! - [`SortDescriptor`]s and collection aggregates (`@count`, `@sum`, ...)
//! - [`QuerySet`] for lazy, chainable queries executed by a [`FetchProvider`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use querykit::{Model, QuerySet};
//! use querykit_derive::Model;
//!
//! #[derive(Clone, Model)]
//! struct Person {
//!     name: String,
//!     age: i64,
//!     is_active: bool,
//!     #[attribute(to_many)]
//!     books: Vec<Book>,
//! }
//!
//! fn example(people: QuerySet<Person>) -> querykit::Result<()> {
//!     let adults = people
//!         .filter(Person::age().greater_or_equal(18))
//!         .filter(Person::is_active())
//!         .order_by(Person::age().descending());
//!
//!     let prolific = adults.filter(Person::books().count().greater_than(3));
//!     let total = prolific.count()?;
//!     let oldest = adults.first()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Building Predicates
//!
//! ```
//! use querykit::Attribute;
//!
//! let name = Attribute::<String>::new("name");
//! let age = Attribute::<i64>::new("age");
//!
//! // AND / OR / NOT
//! let p = name.starts_with("K") & (age.between(18..65) | !age.is_in([1, 2, 3]));
//! assert_eq!(
//!     p.to_string(),
//!     "(name LIKE \"K*\") AND ((age BETWEEN {18, 65}) OR (NOT (age IN {1, 2, 3})))"
//! );
//! ```

pub mod aggregate;
mod attribute;
mod error;
mod expression;
mod model;
mod predicate;
mod provider;
mod queryset;
mod sort;
mod value;

pub use aggregate::{avg, count, max, min, sum, Collection, KeyPathOperator};
pub use attribute::Attribute;
pub use error::{BackendError, QueryError, Result};
pub use expression::Expression;
pub use model::{value_for_key_path, Model, Record, Relationship, Schema};
pub use predicate::{Comparison, ComparisonOperator, Predicate};
pub use provider::{FetchProvider, FetchRequest, Records};
pub use queryset::{Filter, QuerySet};
pub use sort::{IntoSortDescriptors, SortDescriptor};
pub use value::{ObjectRef, ToValue, Value};
