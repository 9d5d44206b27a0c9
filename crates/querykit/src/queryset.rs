//! QuerySet implementation for lazy, chainable queries.
//!
//! QuerySets are lazy - they don't touch the fetch provider until you iterate
//! over them or call a method that evaluates the query (like `fetch_all()`,
//! `count()`, `first()`, etc.).

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use tracing::debug;

use crate::attribute::Attribute;
use crate::error::{QueryError, Result};
use crate::model::Model;
use crate::predicate::Predicate;
use crate::provider::{FetchProvider, FetchRequest, Records};
use crate::sort::{IntoSortDescriptors, SortDescriptor};

/// Something that can be used to filter or exclude records.
pub trait Filter {
    /// Returns the predicate records must satisfy to be kept by `filter`.
    fn into_filter(self) -> Predicate;

    /// Returns the predicate records must satisfy to be kept by `exclude`.
    fn into_exclusion(self) -> Predicate
    where
        Self: Sized,
    {
        !self.into_filter()
    }
}

impl Filter for Predicate {
    fn into_filter(self) -> Predicate {
        self
    }
}

/// `filter(flag)` keeps `flag == true`; `exclude(flag)` keeps `flag == false`.
impl Filter for &Attribute<bool> {
    fn into_filter(self) -> Predicate {
        self.equals(true)
    }

    fn into_exclusion(self) -> Predicate {
        self.equals(false)
    }
}

impl Filter for Attribute<bool> {
    fn into_filter(self) -> Predicate {
        (&self).into_filter()
    }

    fn into_exclusion(self) -> Predicate {
        (&self).into_exclusion()
    }
}

/// A lazy, chainable description of a query.
///
/// QuerySets are immutable - each method returns a new QuerySet with the
/// modification applied and leaves the receiver untouched, so intermediate
/// QuerySets can be shared and reused. All QuerySets derived from one another
/// share the same fetch provider.
///
/// # Example
///
/// ```ignore
/// use querykit::QuerySet;
///
/// let adults = people
///     .filter(Person::age().greater_or_equal(18))
///     .exclude(Person::is_banned())
///     .order_by(Person::age().descending());
///
/// let oldest = adults.first()?;
/// let total = adults.count()?;
/// ```
pub struct QuerySet<M> {
    provider: Arc<dyn FetchProvider<M>>,
    predicate: Option<Predicate>,
    sort_descriptors: Vec<SortDescriptor>,
    offset: usize,
    limit: Option<usize>,
}

// Manual Clone implementation to avoid M: Clone bound
impl<M> Clone for QuerySet<M> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            predicate: self.predicate.clone(),
            sort_descriptors: self.sort_descriptors.clone(),
            offset: self.offset,
            limit: self.limit,
        }
    }
}

impl<M> fmt::Debug for QuerySet<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySet")
            .field("predicate", &self.predicate)
            .field("sort_descriptors", &self.sort_descriptors)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl<M: Model> QuerySet<M> {
    /// Creates a QuerySet matching every record of the provider.
    pub fn new(provider: Arc<dyn FetchProvider<M>>) -> Self {
        Self {
            provider,
            predicate: None,
            sort_descriptors: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    /// Returns the accumulated predicate, if any.
    #[must_use]
    pub const fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// Returns the accumulated sort descriptors, highest priority first.
    #[must_use]
    pub fn sort_descriptors(&self) -> &[SortDescriptor] {
        &self.sort_descriptors
    }

    /// Returns the shared fetch provider.
    #[must_use]
    pub const fn provider(&self) -> &Arc<dyn FetchProvider<M>> {
        &self.provider
    }

    fn with_predicate(&self, predicate: Predicate) -> Self {
        let mut qs = self.clone();
        qs.predicate = Some(match qs.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        qs
    }

    /// Returns a QuerySet that also requires `filter` to hold.
    ///
    /// Multiple filters are combined with AND.
    #[must_use]
    pub fn filter(&self, filter: impl Filter) -> Self {
        self.with_predicate(filter.into_filter())
    }

    /// Returns a QuerySet without the records matching `filter`.
    #[must_use]
    pub fn exclude(&self, filter: impl Filter) -> Self {
        self.with_predicate(filter.into_exclusion())
    }

    /// Appends ordering. Later calls add lower-priority tie-breakers.
    ///
    /// # Example
    ///
    /// ```ignore
    /// // Order by age descending, then name ascending
    /// qs.order_by(Person::age().descending()).order_by("name")
    /// ```
    #[must_use]
    pub fn order_by(&self, descriptors: impl IntoSortDescriptors) -> Self {
        let mut qs = self.clone();
        qs.sort_descriptors.extend(descriptors.into_sort_descriptors());
        qs
    }

    /// Returns a QuerySet with every sort direction flipped.
    #[must_use]
    pub fn reverse(&self) -> Self {
        let mut qs = self.clone();
        qs.sort_descriptors = self.sort_descriptors.iter().map(SortDescriptor::reversed).collect();
        qs
    }

    /// Skips the first `n` results of this QuerySet.
    #[must_use]
    pub fn offset(&self, n: usize) -> Self {
        let mut qs = self.clone();
        qs.offset = self.offset.saturating_add(n);
        qs.limit = self.limit.map(|limit| limit.saturating_sub(n));
        qs
    }

    /// Keeps at most `n` results of this QuerySet.
    #[must_use]
    pub fn limit(&self, n: usize) -> Self {
        let mut qs = self.clone();
        qs.limit = Some(self.limit.map_or(n, |limit| limit.min(n)));
        qs
    }

    /// Restricts the QuerySet to the results at positions `range`.
    ///
    /// Ranges are relative to this QuerySet, so slicing a slice narrows it.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self {
        let len = range.end.saturating_sub(range.start);
        self.offset(range.start).limit(len)
    }

    /// Builds the request handed to the fetch provider.
    #[must_use]
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            entity: M::ENTITY_NAME.to_string(),
            predicate: self.predicate.clone(),
            sort_descriptors: self.sort_descriptors.clone(),
            offset: self.offset,
            limit: self.limit,
        }
    }

    /// Executes the query and returns the matching records lazily.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Backend` if the provider rejects the query.
    pub fn iter(&self) -> Result<Records<'_, M>> {
        let request = self.fetch_request();
        debug!(entity = M::ENTITY_NAME, request = %request, "executing fetch");
        Ok(self.provider.execute(&request)?)
    }

    /// Executes the query and collects every matching record.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Backend` if the provider rejects the query.
    pub fn fetch_all(&self) -> Result<Vec<M>> {
        Ok(self.iter()?.collect())
    }

    /// Returns the number of matching records.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Backend` if the provider rejects the query.
    pub fn count(&self) -> Result<usize> {
        let request = self.fetch_request();
        debug!(entity = M::ENTITY_NAME, request = %request, "counting");
        Ok(self.provider.count(&request)?)
    }

    /// Returns whether any record matches.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Backend` if the provider rejects the query.
    pub fn exists(&self) -> Result<bool> {
        Ok(self.limit(1).count()? > 0)
    }

    /// Returns the first matching record, or `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Backend` if the provider rejects the query.
    pub fn first(&self) -> Result<Option<M>> {
        let qs = self.limit(1);
        let first = qs.iter()?.next();
        Ok(first)
    }

    /// Returns the last matching record, or `None` if nothing matches.
    ///
    /// Ordered, unwindowed QuerySets fetch a single record with the ordering
    /// reversed; anything else walks the full result.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Backend` if the provider rejects the query.
    pub fn last(&self) -> Result<Option<M>> {
        if !self.sort_descriptors.is_empty() && self.offset == 0 && self.limit.is_none() {
            return self.reverse().first();
        }
        let last = self.iter()?.last();
        Ok(last)
    }

    /// Returns the record at `index`, or `None` if there are fewer results.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Backend` if the provider rejects the query.
    pub fn get(&self, index: usize) -> Result<Option<M>> {
        self.offset(index).first()
    }

    /// Returns exactly one matching record.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::NotFound` if nothing matches,
    /// `QueryError::MultipleObjectsReturned` if more than one record matches,
    /// or `QueryError::Backend` if the provider rejects the query.
    pub fn get_one(&self) -> Result<M> {
        let qs = self.limit(2);
        let mut records = qs.iter()?;
        match (records.next(), records.next()) {
            (None, _) => Err(QueryError::NotFound),
            (Some(record), None) => Ok(record),
            (Some(_), Some(_)) => Err(QueryError::MultipleObjectsReturned),
        }
    }
}
