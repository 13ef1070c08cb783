#![doc(test(attr(deny(warnings))))]

//! Contains the physical operators of the relation algebra.
//!
//! Every operator implements [rdf_tuples_common::Tuples] and owns its operands. Operators only
//! check the preconditions they rely on; choosing the right operator for a set of inputs is the
//! task of the engine.

mod append;
mod constant;
mod cursor;
mod difference;
mod distinct;
pub mod filter;
pub mod join;
mod literal;
pub mod negation;
mod projection;
mod slice;
mod sorted;
#[cfg(test)]
mod test_utils;

pub use append::{OrderedAppend, UnorderedAppend};
pub use constant::{EmptyTuples, UnconstrainedTuples};
pub use difference::Difference;
pub use distinct::{DistinctTuples, HashDistinctTuples};
pub use literal::LiteralTuples;
pub use projection::UnorderedProjection;
pub use slice::{LimitedTuples, OffsetTuples};
pub use sorted::SortedTuples;
