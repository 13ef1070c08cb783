use crate::explain::format_tuples_tree;
use crate::planner::{order_operands, unify};
use crate::{DistinctStrategy, TuplesConfig};
use rdf_tuples_common::{close_all, BoxedTuples, RowComparator, StatementStore, Tuples};
use rdf_tuples_model::{
    Cardinality, Constraint, NodeId, TuplesError, TuplesResult, Variable, UNBOUND,
};
use rdf_tuples_physical::filter::{Filter, FilteredTuples};
use rdf_tuples_physical::join::{LeftJoin, UnboundJoin};
use rdf_tuples_physical::negation::ConstrainedNegationTuples;
use rdf_tuples_physical::{
    Difference, DistinctTuples, EmptyTuples, HashDistinctTuples, LimitedTuples, LiteralTuples,
    OffsetTuples, OrderedAppend, SortedTuples, UnconstrainedTuples, UnorderedAppend,
    UnorderedProjection,
};
use std::sync::Arc;

/// Composes relations into plans.
///
/// Every operation takes ownership of its input relations. Inputs that do not become part of the
/// result are closed before the operation returns.
///
/// # Example
///
/// ```
/// use rdf_tuples_engine::TuplesOperations;
/// use rdf_tuples_model::Variable;
/// use rdf_tuples_physical::LiteralTuples;
/// # use rdf_tuples_model::TuplesResult;
/// # fn main() -> TuplesResult<()> {
/// let operations = TuplesOperations::default();
/// let x = Variable::new_unchecked("x");
/// let y = Variable::new_unchecked("y");
///
/// let lhs = LiteralTuples::try_from_rows(vec![x.clone()], vec![vec![1], vec![2]])?;
/// let rhs = LiteralTuples::try_from_rows(vec![x, y], vec![vec![1, 5], vec![3, 6]])?;
/// let join = operations.join(vec![Box::new(lhs), Box::new(rhs)])?;
/// assert_eq!(join.row_count()?, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TuplesOperations {
    config: TuplesConfig,
}

impl TuplesOperations {
    /// Creates a new [TuplesOperations].
    pub fn new(config: TuplesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TuplesConfig {
        &self.config
    }

    /// Returns a relation without variables and without rows.
    pub fn empty(&self) -> BoxedTuples {
        Box::new(EmptyTuples::new())
    }

    /// Returns a relation without variables and with a single row.
    pub fn unconstrained(&self) -> BoxedTuples {
        Box::new(UnconstrainedTuples::new())
    }

    /// Returns a relation that binds `variable` to `value` in a single row.
    ///
    /// Binding to [UNBOUND] yields the unconstrained relation.
    pub fn assign(&self, variable: Variable, value: NodeId) -> TuplesResult<BoxedTuples> {
        if value == UNBOUND {
            return Ok(self.unconstrained());
        }
        let mut tuples = LiteralTuples::new(vec![variable]);
        tuples.append_row(&[value])?;
        Ok(Box::new(tuples))
    }

    /// Computes the union of `operands`.
    ///
    /// An unconstrained operand makes the union unconstrained. Union-compatible operands are
    /// concatenated, merged if they share an order. Other operands are first projected onto the
    /// variables of all operands and sorted; variables an operand lacks are unbound in its rows.
    pub fn append(&self, operands: Vec<BoxedTuples>) -> TuplesResult<BoxedTuples> {
        let mut operands = operands;
        if any_unconstrained(&operands)? {
            tracing::debug!("Union with an unconstrained operand is unconstrained");
            close_all(operands.iter_mut())?;
            return Ok(self.unconstrained());
        }

        let variables = distinct_variables(&operands);
        let mut nonempty = Vec::with_capacity(operands.len());
        for mut operand in operands {
            if operand.row_cardinality()? == Cardinality::Zero {
                operand.close()?;
            } else {
                nonempty.push(operand);
            }
        }

        if nonempty.len() <= 1 {
            return Ok(nonempty
                .pop()
                .unwrap_or_else(|| Box::new(EmptyTuples::with_variables(variables))));
        }

        let compatible = nonempty
            .iter()
            .all(|operand| operand.variables() == nonempty[0].variables());
        let result: BoxedTuples = if compatible {
            let comparator = nonempty[0].comparator();
            let shared_order = comparator.is_some()
                && nonempty
                    .iter()
                    .all(|operand| operand.comparator() == comparator);
            if shared_order {
                Box::new(OrderedAppend::try_new(nonempty)?)
            } else {
                Box::new(UnorderedAppend::try_new(nonempty)?)
            }
        } else {
            tracing::debug!(
                variables = ?variables.iter().map(Variable::as_str).collect::<Vec<_>>(),
                "Projecting heterogeneous union operands"
            );
            let natural = RowComparator::natural(variables.len());
            let aligned = nonempty
                .into_iter()
                .map(|operand| -> TuplesResult<BoxedTuples> {
                    let projection = UnorderedProjection::new(operand, variables.clone());
                    let sorted = SortedTuples::try_new(Box::new(projection), natural.clone())?;
                    Ok(Box::new(sorted))
                })
                .collect::<TuplesResult<Vec<_>>>()?;
            Box::new(OrderedAppend::try_new(aligned)?)
        };
        Ok(result)
    }

    /// Computes the natural join of `operands`.
    ///
    /// Nested joins are flattened, single-row operands are folded into constant bindings and the
    /// remaining operands are ordered by their estimated cost.
    pub fn join(&self, operands: Vec<BoxedTuples>) -> TuplesResult<BoxedTuples> {
        let mut flattened = Vec::with_capacity(operands.len());
        for mut operand in operands {
            let nested: Option<Vec<BoxedTuples>> = operand
                .as_any()
                .downcast_ref::<UnboundJoin>()
                .map(|join| join.join_operands().iter().map(|inner| inner.duplicate()).collect());
            match nested {
                Some(nested) => {
                    flattened.extend(nested);
                    operand.close()?;
                }
                None => flattened.push(operand),
            }
        }

        let variables = distinct_variables(&flattened);
        let Some(unified) = unify(flattened)? else {
            return Ok(Box::new(EmptyTuples::with_variables(variables)));
        };

        let (mut unconstrained, mut constrained) = (Vec::new(), Vec::new());
        for operand in unified {
            if is_identity(operand.as_ref())? {
                unconstrained.push(operand);
            } else {
                constrained.push(operand);
            }
        }
        if constrained.is_empty() {
            let result = unconstrained.pop();
            close_all(unconstrained.iter_mut())?;
            return Ok(result.unwrap_or_else(|| self.unconstrained()));
        }
        close_all(unconstrained.iter_mut())?;

        let mut ordered = order_operands(constrained, self.config.prefix_weight_decay())?;
        if ordered.len() == 1 {
            return Ok(ordered.remove(0));
        }

        let join = UnboundJoin::try_new(ordered)?;
        tracing::debug!(plan = %format_tuples_tree(&join), "Planned join");
        Ok(Box::new(join))
    }

    /// Computes the rows of `minuend` that no row of `subtrahend` matches on their shared
    /// variables.
    ///
    /// Fails with [TuplesError::NoCommonVariables] if the relations share no variable, unless one
    /// of them has no variables at all.
    pub fn subtract(
        &self,
        minuend: BoxedTuples,
        subtrahend: BoxedTuples,
    ) -> TuplesResult<BoxedTuples> {
        let (mut minuend, mut subtrahend) = (minuend, subtrahend);
        let common: Vec<Variable> = minuend
            .variables()
            .iter()
            .filter(|variable| subtrahend.variables().contains(variable))
            .cloned()
            .collect();

        if common.is_empty() {
            if minuend.number_of_variables() == 0 || subtrahend.number_of_variables() == 0 {
                subtrahend.close()?;
                return Ok(minuend);
            }
            close_all([&mut minuend, &mut subtrahend])?;
            return Err(TuplesError::NoCommonVariables);
        }

        if minuend.row_cardinality()? == Cardinality::Zero
            || subtrahend.row_cardinality()? == Cardinality::Zero
        {
            tracing::warn!("Subtracting with an empty operand, returning the minuend");
            subtrahend.close()?;
            return Ok(minuend);
        }

        let subtrahend = if subtrahend.number_of_variables() > common.len() {
            tracing::debug!("Projecting subtrahend onto the shared variables");
            self.project(subtrahend, common)?
        } else {
            self.sort(subtrahend)?
        };
        Ok(Box::new(Difference::try_new(minuend, subtrahend)?))
    }

    /// Extends each row of `standard` with the matching rows of `optional` for which `filter`
    /// holds. Rows of `standard` without such a match are kept, with the variables that only
    /// `optional` has unbound.
    ///
    /// Without a filter, an `optional` relation that adds no variables leaves `standard`
    /// unchanged.
    pub fn optional_join(
        &self,
        standard: BoxedTuples,
        optional: BoxedTuples,
        filter: Option<Arc<dyn Filter>>,
    ) -> TuplesResult<BoxedTuples> {
        let mut optional = optional;
        let shared: Vec<Variable> = standard
            .variables()
            .iter()
            .filter(|variable| optional.variables().contains(variable))
            .cloned()
            .collect();

        if filter.is_none() && shared.len() == optional.number_of_variables() {
            tracing::debug!("Optional operand adds no variables, returning the standard operand");
            optional.close()?;
            return Ok(standard);
        }
        if optional.row_cardinality()? == Cardinality::Zero && optional.number_of_variables() == 0
        {
            tracing::warn!("Optional operand is empty and has no variables");
            optional.close()?;
            return Ok(standard);
        }

        tracing::debug!(
            shared = ?shared.iter().map(Variable::as_str).collect::<Vec<_>>(),
            "Sorting optional operand on the shared variables"
        );
        let optional = self.re_sort(optional, &shared)?;
        let join = LeftJoin::try_new(standard, optional, filter)?;
        tracing::debug!(plan = %format_tuples_tree(&join), "Planned optional join");
        Ok(Box::new(join))
    }

    /// Returns every statement of `store` that does not match `constraint`.
    pub fn negate(
        &self,
        constraint: &Constraint,
        store: &dyn StatementStore,
    ) -> TuplesResult<BoxedTuples> {
        Ok(Box::new(ConstrainedNegationTuples::from_constraint(
            constraint, store,
        )?))
    }

    /// Restricts `tuples` to `variables` and removes the resulting duplicates.
    ///
    /// A variable that `tuples` does not have is unbound in every row.
    pub fn project(
        &self,
        tuples: BoxedTuples,
        variables: Vec<Variable>,
    ) -> TuplesResult<BoxedTuples> {
        let mut tuples = tuples;
        if is_identity(tuples.as_ref())?
            || (variables.is_empty() && tuples.row_cardinality()? != Cardinality::Zero)
        {
            tuples.close()?;
            return Ok(self.unconstrained());
        }
        if tuples.row_cardinality()? == Cardinality::Zero {
            tuples.close()?;
            return Ok(Box::new(EmptyTuples::with_variables(variables)));
        }

        let projection = UnorderedProjection::new(tuples, variables);
        self.remove_duplicates(Box::new(projection))
    }

    /// Removes identical rows from `tuples`, using the configured [DistinctStrategy].
    pub fn remove_duplicates(&self, tuples: BoxedTuples) -> TuplesResult<BoxedTuples> {
        if tuples.has_no_duplicates()? {
            return Ok(tuples);
        }

        match self.config.distinct_strategy() {
            DistinctStrategy::Sort => {
                let arity = tuples.number_of_variables();
                let total = tuples
                    .comparator()
                    .is_some_and(|comparator| is_total(comparator, arity));
                let sorted: BoxedTuples = if total {
                    tuples
                } else {
                    Box::new(SortedTuples::try_new(tuples, RowComparator::natural(arity))?)
                };
                Ok(Box::new(DistinctTuples::try_new(sorted)?))
            }
            DistinctStrategy::Hash => Ok(Box::new(HashDistinctTuples::new(tuples))),
        }
    }

    /// Returns `tuples` sorted by all columns from left to right. Sorted input is returned as is.
    pub fn sort(&self, tuples: BoxedTuples) -> TuplesResult<BoxedTuples> {
        if tuples.comparator().is_some() {
            return Ok(tuples);
        }
        let comparator = RowComparator::natural(tuples.number_of_variables());
        Ok(Box::new(SortedTuples::try_new(tuples, comparator)?))
    }

    /// Moves `variables` to the front and sorts the result, so that prefix seeks can bind them.
    pub fn re_sort(
        &self,
        tuples: BoxedTuples,
        variables: &[Variable],
    ) -> TuplesResult<BoxedTuples> {
        for variable in variables {
            tuples.column_index(variable)?;
        }
        let mut reordered = variables.to_vec();
        reordered.extend(
            tuples
                .variables()
                .iter()
                .filter(|variable| !variables.contains(variable))
                .cloned(),
        );

        let natural = RowComparator::natural(reordered.len());
        if reordered.as_slice() == tuples.variables() && tuples.comparator() == Some(&natural) {
            return Ok(tuples);
        }
        let projection = UnorderedProjection::new(tuples, reordered);
        Ok(Box::new(SortedTuples::try_new(Box::new(projection), natural)?))
    }

    /// Reads the rows of `tuples` into memory.
    pub fn materialize(&self, tuples: BoxedTuples) -> TuplesResult<BoxedTuples> {
        if tuples.is_materialized() {
            return Ok(tuples);
        }
        let comparator = tuples
            .comparator()
            .cloned()
            .unwrap_or_else(|| RowComparator::natural(tuples.number_of_variables()));
        Ok(Box::new(SortedTuples::try_new(tuples, comparator)?))
    }

    /// Keeps the first `limit` rows of `tuples`.
    pub fn limit(&self, tuples: BoxedTuples, limit: u64) -> BoxedTuples {
        Box::new(LimitedTuples::new(tuples, limit))
    }

    /// Skips the first `offset` rows of `tuples`.
    pub fn offset(&self, tuples: BoxedTuples, offset: u64) -> BoxedTuples {
        Box::new(OffsetTuples::new(tuples, offset))
    }

    /// Keeps the rows of `tuples` for which `filter` holds.
    pub fn filter(&self, tuples: BoxedTuples, filter: Arc<dyn Filter>) -> BoxedTuples {
        Box::new(FilteredTuples::new(tuples, filter))
    }
}

/// Returns whether `tuples` is the identity of joins: no variables and at least one row.
///
/// A relation with variables is never treated as the identity, even if it reports that it is
/// unconstrained, because dropping it would drop its columns.
fn is_identity(tuples: &dyn Tuples) -> TuplesResult<bool> {
    Ok(tuples.number_of_variables() == 0 && tuples.is_unconstrained()?)
}

fn any_unconstrained(operands: &[BoxedTuples]) -> TuplesResult<bool> {
    for operand in operands {
        if is_identity(operand.as_ref())? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Returns the variables of all operands in the order of their first occurrence.
fn distinct_variables(operands: &[BoxedTuples]) -> Vec<Variable> {
    let mut variables: Vec<Variable> = Vec::new();
    for variable in operands.iter().flat_map(|operand| operand.variables()) {
        if !variables.contains(variable) {
            variables.push(variable.clone());
        }
    }
    variables
}

/// Returns whether `comparator` orders by every column, so that identical rows are adjacent.
fn is_total(comparator: &RowComparator, arity: usize) -> bool {
    (0..arity).all(|column| comparator.columns().contains(&column))
}
