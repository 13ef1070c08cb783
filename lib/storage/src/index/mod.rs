//! Contains the index structures of the in-memory statement store.
//!
//! An index represents a particular sorting of the statement components subject, predicate,
//! object, and graph. For example, the [IndexComponents::SPOG] index represents that exact
//! ordering while the [IndexComponents::POSG] index has the predicate as the first component.
//! [IndexPermutations] maintains one index per ordering, so that the fixed positions of every
//! statement pattern form a prefix of some index.

mod components;
mod permutations;

pub use components::*;
pub use permutations::*;
