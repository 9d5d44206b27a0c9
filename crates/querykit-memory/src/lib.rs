//! # querykit-memory
//!
//! An in-memory [`FetchProvider`](querykit::FetchProvider) for querykit.
//!
//! [`MemoryStore`] evaluates the predicate of each fetch request against
//! records implementing `querykit::Record`, orders the matches by the
//! request's sort descriptors and applies its offset and limit.
//!
//! Evaluation rules:
//! - integers and floats compare numerically with each other
//! - null equals only null and never satisfies an ordering comparison
//! - `LIKE` matches strings with `*` and `?` wildcards
//! - `BETWEEN` is inclusive on both bounds
//! - unknown key paths, mismatched operand kinds and malformed `IN` /
//!   `BETWEEN` operands fail the whole request with a `BackendError`
//! - nulls sort first in ascending order

mod eval;
mod pattern;
mod store;

pub use store::MemoryStore;
