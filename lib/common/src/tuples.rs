use crate::annotation::{DefinablePrefix, MandatoryBinding, Reresolvable};
use crate::RowComparator;
use rdf_tuples_model::{Cardinality, NodeId, TuplesError, TuplesResult, Variable};
use std::any::Any;
use std::fmt::Debug;

/// An owned, type-erased relation.
pub type BoxedTuples = Box<dyn Tuples>;

/// A relation over a list of variables, read through a pull-based cursor.
///
/// Each row binds every column to a [NodeId] or to [rdf_tuples_model::UNBOUND]. A cursor must be
/// positioned with [Tuples::before_first] before [Tuples::next] is called. After `next` returned
/// `true`, [Tuples::column_value] reads the current row.
///
/// # Prefix Seeks
///
/// `before_first` accepts a prefix of values for the leading columns. Every row emitted afterward
/// matches the prefix. Sorted relations (see [Tuples::comparator]) additionally emit all matching
/// rows contiguously and use the prefix to skip directly to them.
///
/// # Clones
///
/// [Tuples::duplicate] creates an independent cursor over the same relation. Advancing or closing
/// one clone never affects another. Implementations share immutable state (rows, configuration)
/// between clones.
///
/// # Capabilities
///
/// Some relations support optional extensions that the planner queries through
/// [Tuples::definable_prefix], [Tuples::mandatory_binding] and [Tuples::reresolvable].
pub trait Tuples: Debug {
    /// Returns the name of the operator, used for explaining plans.
    fn name(&self) -> &'static str;

    /// Returns this relation as [Any], allowing the planner to inspect concrete operators.
    fn as_any(&self) -> &dyn Any;

    /// Returns the variables of this relation.
    ///
    /// The list only changes through [DefinablePrefix::define_prefix], before the cursor is
    /// positioned.
    fn variables(&self) -> &[Variable];

    fn number_of_variables(&self) -> usize {
        self.variables().len()
    }

    /// Returns the column that holds `variable`.
    fn column_index(&self, variable: &Variable) -> TuplesResult<usize> {
        self.variables()
            .iter()
            .position(|candidate| candidate == variable)
            .ok_or_else(|| TuplesError::UnknownVariable(variable.clone()))
    }

    /// Positions the cursor before the first row whose leading columns equal `prefix`.
    ///
    /// `suffix_truncation` asks the relation to ignore the given number of trailing columns for
    /// comparisons. Relations are free to ignore this hint.
    ///
    /// Fails if the prefix is longer than the number of columns.
    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()>;

    /// Positions the cursor before the first row of the whole relation.
    fn rewind(&mut self) -> TuplesResult<()> {
        self.before_first(&[], 0)
    }

    /// Advances to the next row. Returns `false` once all rows have been read.
    fn next(&mut self) -> TuplesResult<bool>;

    /// Returns the value of `column` in the current row.
    fn column_value(&self, column: usize) -> TuplesResult<NodeId>;

    /// Returns the exact number of rows. This may force the evaluation of a clone.
    fn row_count(&self) -> TuplesResult<u64> {
        let mut probe = self.duplicate();
        probe.rewind()?;
        let mut count: u64 = 0;
        while probe.next()? {
            count = count.saturating_add(1);
        }
        probe.close()?;
        Ok(count)
    }

    /// Returns a cheap upper bound of the number of rows.
    fn row_upper_bound(&self) -> TuplesResult<u64>;

    /// Classifies the number of rows without counting all of them.
    fn row_cardinality(&self) -> TuplesResult<Cardinality> {
        if self.row_upper_bound()? == 0 {
            return Ok(Cardinality::Zero);
        }

        let mut probe = self.duplicate();
        probe.rewind()?;
        let cardinality = if !probe.next()? {
            Cardinality::Zero
        } else if !probe.next()? {
            Cardinality::One
        } else {
            Cardinality::Many
        };
        probe.close()?;
        Ok(cardinality)
    }

    /// Returns whether `column` may hold [rdf_tuples_model::UNBOUND] in some row.
    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool>;

    /// Returns whether this relation is the identity of join: no columns and at least one row.
    fn is_unconstrained(&self) -> TuplesResult<bool> {
        Ok(self.number_of_variables() == 0 && self.row_cardinality()? != Cardinality::Zero)
    }

    /// Returns whether this relation is guaranteed to contain no identical rows.
    fn has_no_duplicates(&self) -> TuplesResult<bool>;

    /// Returns the row order of this relation, if it is sorted.
    fn comparator(&self) -> Option<&RowComparator>;

    /// Returns whether the rows of this relation are held in memory.
    fn is_materialized(&self) -> bool;

    /// Returns the relations this relation is computed from.
    fn operands(&self) -> Vec<&dyn Tuples>;

    /// Creates an independent cursor over the same relation.
    fn duplicate(&self) -> BoxedTuples;

    /// Releases the resources of this cursor and of every operand it owns.
    ///
    /// Calling `close` more than once has no further effect.
    fn close(&mut self) -> TuplesResult<()>;

    fn definable_prefix(&mut self) -> Option<&mut dyn DefinablePrefix> {
        None
    }

    fn mandatory_binding(&self) -> Option<&dyn MandatoryBinding> {
        None
    }

    fn reresolvable(&self) -> Option<&dyn Reresolvable> {
        None
    }
}
