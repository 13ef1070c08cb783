//! Row predicates and the [FilteredTuples] operator.

mod expr;
mod filtered;

pub use expr::{FilterExpr, FilterTerm};
pub use filtered::FilteredTuples;

use rdf_tuples_model::{NodeId, TuplesResult, Variable};
use std::fmt::Debug;

/// Gives a predicate access to the values of the current row.
pub trait EvaluationContext {
    /// Returns the value bound to `variable` in the current row.
    ///
    /// Fails if the relation does not have `variable`.
    fn value(&self, variable: &Variable) -> TuplesResult<NodeId>;
}

/// A boolean predicate over the rows of a relation.
pub trait Filter: Debug {
    /// Tests the current row. Errors abort the iteration of the filtered relation.
    fn test(&self, context: &dyn EvaluationContext) -> TuplesResult<bool>;
}
