//! Error types for query construction and execution.

use thiserror::Error;

/// Errors raised by a fetch provider while executing a query.
///
/// Construction of attributes, predicates and QuerySets never fails; these
/// errors only surface once a QuerySet is handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The predicate or a sort descriptor references a key path the backend
    /// does not know about.
    #[error("unknown key path: {0}")]
    UnknownKeyPath(String),

    /// The backend cannot evaluate the operator with the given operands.
    #[error("unsupported operator {operator}: {detail}")]
    UnsupportedOperator {
        /// Operator as rendered in predicate format.
        operator: String,
        /// Why the operator was rejected.
        detail: String,
    },

    /// Two values could not be compared or coerced.
    #[error("type mismatch on `{key_path}`: cannot compare {left} with {right}")]
    TypeMismatch {
        /// Key path being evaluated.
        key_path: String,
        /// Kind of the left-hand value.
        left: &'static str,
        /// Kind of the right-hand value.
        right: &'static str,
    },

    /// Any other rejection reported by the backend.
    #[error("query rejected: {0}")]
    Rejected(String),
}

/// Errors returned by the querykit API.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The fetch provider failed to execute the query.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// A literal could not be classified into any constant category.
    #[error("value of type `{type_name}` cannot be represented as a constant")]
    UnrepresentableValue {
        /// Rust type name of the rejected literal.
        type_name: &'static str,
    },

    /// No object matched the query.
    #[error("object not found")]
    NotFound,

    /// Several objects matched when exactly one was expected.
    #[error("multiple objects returned when one was expected")]
    MultipleObjectsReturned,
}

/// Result type alias for querykit operations.
pub type Result<T> = std::result::Result<T, QueryError>;
