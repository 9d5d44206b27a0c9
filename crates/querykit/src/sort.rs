//! Sort descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A key and a direction used to order results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortDescriptor {
    /// Key path to sort by.
    pub key: String,
    /// Whether the order is ascending.
    pub ascending: bool,
}

impl SortDescriptor {
    /// Creates an ascending sort descriptor.
    #[must_use]
    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ascending: true,
        }
    }

    /// Creates a descending sort descriptor.
    #[must_use]
    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ascending: false,
        }
    }

    /// Parses a Django-style ordering key.
    ///
    /// Prefix with `-` for descending order: `"-created"` sorts newest
    /// first, `"name"` sorts ascending.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        key.strip_prefix('-')
            .map_or_else(|| Self::ascending(key), Self::descending)
    }

    /// Returns the same key with the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            key: self.key.clone(),
            ascending: !self.ascending,
        }
    }
}

impl fmt::Display for SortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ascending {
            write!(f, "{} ASC", self.key)
        } else {
            write!(f, "{} DESC", self.key)
        }
    }
}

/// Conversion into an ordered list of sort descriptors.
///
/// Lets `order_by` take a single descriptor or a sequence of them.
pub trait IntoSortDescriptors {
    /// Converts into sort descriptors, highest priority first.
    fn into_sort_descriptors(self) -> Vec<SortDescriptor>;
}

impl IntoSortDescriptors for SortDescriptor {
    fn into_sort_descriptors(self) -> Vec<SortDescriptor> {
        vec![self]
    }
}

impl IntoSortDescriptors for Vec<SortDescriptor> {
    fn into_sort_descriptors(self) -> Vec<SortDescriptor> {
        self
    }
}

impl<const N: usize> IntoSortDescriptors for [SortDescriptor; N] {
    fn into_sort_descriptors(self) -> Vec<SortDescriptor> {
        self.into()
    }
}

impl IntoSortDescriptors for &[SortDescriptor] {
    fn into_sort_descriptors(self) -> Vec<SortDescriptor> {
        self.to_vec()
    }
}

impl IntoSortDescriptors for &str {
    fn into_sort_descriptors(self) -> Vec<SortDescriptor> {
        vec![SortDescriptor::parse(self)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(SortDescriptor::parse("-created"), SortDescriptor::descending("created"));
        assert_eq!(SortDescriptor::parse("name"), SortDescriptor::ascending("name"));
    }

    #[test]
    fn test_reversed() {
        let d = SortDescriptor::ascending("age").reversed();
        assert_eq!(d.key, "age");
        assert!(!d.ascending);
    }

    #[test]
    fn test_display() {
        assert_eq!(SortDescriptor::ascending("name").to_string(), "name ASC");
        assert_eq!(SortDescriptor::descending("age").to_string(), "age DESC");
    }
}
