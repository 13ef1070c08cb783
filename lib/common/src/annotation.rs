use crate::BoxedTuples;
use rdf_tuples_model::{Bindings, TuplesResult, Variable};
use rustc_hash::FxHashSet;

/// A relation that can reorder its columns once the planner knows which variables are bound
/// by operands to its left.
pub trait DefinablePrefix {
    /// Moves the columns of `bound_variables` to the front, so that a prefix seek can use them.
    ///
    /// Must be called before the cursor is positioned.
    fn define_prefix(&mut self, bound_variables: &FxHashSet<Variable>) -> TuplesResult<()>;
}

/// A relation that can only be evaluated once certain variables are bound.
pub trait MandatoryBinding {
    /// Returns the variables that must be bound before this relation is joined.
    fn required_variables(&self) -> &[Variable];

    /// Returns whether `bound_variables` satisfies the requirement.
    fn meets_requirement(&self, bound_variables: &FxHashSet<Variable>) -> bool {
        self.required_variables()
            .iter()
            .all(|variable| bound_variables.contains(variable))
    }
}

/// A relation that can be derived again once some of its variables are bound to constants.
pub trait Reresolvable {
    /// Returns the relation obtained by substituting `bindings`, or [None] if none of the bindings
    /// affect this relation.
    fn reresolve(&self, bindings: &Bindings) -> TuplesResult<Option<BoxedTuples>>;
}
