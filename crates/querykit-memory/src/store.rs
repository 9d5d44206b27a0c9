//! The in-memory store.

use std::cmp::Ordering;
use std::sync::Arc;

use querykit::{
    value_for_key_path, BackendError, FetchProvider, FetchRequest, Model, QuerySet, Record,
    Records, Schema, SortDescriptor, Value,
};
use tracing::{debug, warn};

use crate::eval::{sort_order, Evaluator};

/// A fetch provider over records held in memory.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use querykit_memory::MemoryStore;
///
/// let store = Arc::new(MemoryStore::new(people));
/// let adults = store.queryset().filter(Person::age().greater_or_equal(18));
/// for person in adults.iter()? {
///     println!("{}", person.name);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore<M> {
    records: Vec<M>,
}

impl<M> MemoryStore<M> {
    /// Creates a store holding the given records.
    #[must_use]
    pub const fn new(records: Vec<M>) -> Self {
        Self { records }
    }

    /// Returns the number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<M> FromIterator<M> for MemoryStore<M> {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<M: Model + Record + Clone> MemoryStore<M> {
    /// Returns a QuerySet over every record in the store.
    #[must_use]
    pub fn queryset(self: &Arc<Self>) -> QuerySet<M> {
        QuerySet::new(Arc::clone(self) as Arc<dyn FetchProvider<M>>)
    }

    /// Filters and orders the records for a request, before windowing.
    fn select(&self, request: &FetchRequest) -> Result<Vec<&M>, BackendError> {
        if request.entity != M::ENTITY_NAME {
            return Err(BackendError::Rejected(format!(
                "store holds {} records, not {}",
                M::ENTITY_NAME,
                request.entity
            )));
        }

        // Unknown paths fail even when no record would reach them.
        let schema = Schema::of::<M>();
        if let Some(path) = request.key_paths().into_iter().find(|p| !schema.has_key_path(p)) {
            let error = BackendError::UnknownKeyPath(path.to_string());
            log_rejection(&error);
            return Err(error);
        }

        let evaluator = Evaluator::new(request.predicate.as_ref())?;
        let mut selected: Vec<(Vec<Value>, &M)> = Vec::new();
        for record in &self.records {
            if evaluator.matches(record).inspect_err(log_rejection)? {
                let keys = sort_keys(record, &request.sort_descriptors).inspect_err(log_rejection)?;
                selected.push((keys, record));
            }
        }

        // Stable, so equal keys keep insertion order.
        selected.sort_by(|(a, _), (b, _)| compare_keys(a, b, &request.sort_descriptors));

        debug!(
            entity = M::ENTITY_NAME,
            total = self.records.len(),
            matched = selected.len(),
            "evaluated fetch request"
        );

        let limit = request.limit.unwrap_or(usize::MAX);
        Ok(selected
            .into_iter()
            .skip(request.offset)
            .take(limit)
            .map(|(_, record)| record)
            .collect())
    }
}

impl<M: Model + Record + Clone> FetchProvider<M> for MemoryStore<M> {
    fn execute(&self, request: &FetchRequest) -> Result<Records<'_, M>, BackendError> {
        let selected = self.select(request)?;
        Ok(Box::new(selected.into_iter().cloned()))
    }

    fn count(&self, request: &FetchRequest) -> Result<usize, BackendError> {
        Ok(self.select(request)?.len())
    }
}

fn log_rejection(error: &BackendError) {
    warn!(%error, "fetch request rejected");
}

fn sort_keys(record: &dyn Record, descriptors: &[SortDescriptor]) -> Result<Vec<Value>, BackendError> {
    descriptors
        .iter()
        .map(|d| {
            value_for_key_path(record, &d.key)
                .ok_or_else(|| BackendError::UnknownKeyPath(d.key.clone()))
        })
        .collect()
}

fn compare_keys(a: &[Value], b: &[Value], descriptors: &[SortDescriptor]) -> Ordering {
    a.iter()
        .zip(b)
        .zip(descriptors)
        .map(|((x, y), d)| {
            let order = sort_order(x, y);
            if d.ascending {
                order
            } else {
                order.reverse()
            }
        })
        .find(|order| *order != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
