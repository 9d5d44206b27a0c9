//! The fetch provider boundary.
//!
//! A QuerySet never executes anything itself. It builds a [`FetchRequest`]
//! and hands it to a [`FetchProvider`], which owns storage, evaluation and
//! error reporting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::predicate::Predicate;
use crate::sort::SortDescriptor;

/// Everything a provider needs to execute a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Entity being fetched.
    pub entity: String,
    /// Filter, or `None` to match every record.
    pub predicate: Option<Predicate>,
    /// Ordering, highest priority first.
    pub sort_descriptors: Vec<SortDescriptor>,
    /// Number of leading results to skip.
    pub offset: usize,
    /// Maximum number of results, or `None` for no limit.
    pub limit: Option<usize>,
}

impl FetchRequest {
    /// Creates an unfiltered, unordered request for an entity.
    #[must_use]
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            predicate: None,
            sort_descriptors: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    /// Returns every key path the request depends on, predicate first and
    /// then sort keys.
    #[must_use]
    pub fn key_paths(&self) -> Vec<&str> {
        let mut paths = self
            .predicate
            .as_ref()
            .map(Predicate::key_paths)
            .unwrap_or_default();
        paths.extend(self.sort_descriptors.iter().map(|d| d.key.as_str()));
        paths
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FETCH {}", self.entity)?;
        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {predicate}")?;
        }
        if !self.sort_descriptors.is_empty() {
            let parts: Vec<String> = self.sort_descriptors.iter().map(ToString::to_string).collect();
            write!(f, " ORDER BY {}", parts.join(", "))?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if self.offset > 0 {
            write!(f, " OFFSET {}", self.offset)?;
        }
        Ok(())
    }
}

/// Lazily produced records.
pub type Records<'a, M> = Box<dyn Iterator<Item = M> + 'a>;

/// Executes fetch requests against some storage.
///
/// Implementations must report unknown key paths and rejected queries as a
/// [`BackendError`] rather than returning an empty result.
pub trait FetchProvider<M>: Send + Sync {
    /// Executes the request and returns the matching records.
    ///
    /// # Errors
    ///
    /// Returns a `BackendError` when the request cannot be executed.
    fn execute(&self, request: &FetchRequest) -> Result<Records<'_, M>, BackendError>;

    /// Returns the number of records the request matches.
    ///
    /// # Errors
    ///
    /// Returns a `BackendError` when the request cannot be executed.
    fn count(&self, request: &FetchRequest) -> Result<usize, BackendError> {
        Ok(self.execute(request)?.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;

    #[test]
    fn test_display() {
        let mut request = FetchRequest::new("Person");
        request.predicate = Some(Attribute::<i64>::new("age").greater_than(18));
        request.sort_descriptors = vec![SortDescriptor::descending("age")];
        request.limit = Some(5);
        request.offset = 10;
        assert_eq!(
            request.to_string(),
            "FETCH Person WHERE age > 18 ORDER BY age DESC LIMIT 5 OFFSET 10"
        );
    }

    #[test]
    fn test_key_paths() {
        let mut request = FetchRequest::new("Person");
        request.predicate = Some(Attribute::<String>::new("name").equals("a"));
        request.sort_descriptors = vec![SortDescriptor::ascending("age")];
        assert_eq!(request.key_paths(), vec!["name", "age"]);
    }
}
