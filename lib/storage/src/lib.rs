#![doc(test(attr(deny(warnings))))]

//! Storage layers that resolve statement patterns into relations.
//!
//! The [memory] module contains an in-memory store that keeps every statement in six sorted
//! permutations. It implements [rdf_tuples_common::StatementStore] and resolves
//! [rdf_tuples_model::Constraint]s into [memory::StatementResolution]s.

pub mod index;
pub mod memory;

pub use memory::{MemStatementStore, StatementResolution, StoreTuples, VersionNumber};
