use crate::index::{IndexComponents, IndexPermutations, IndexRows, IndexStatement};
use crate::memory::store_tuples::equal_range;
use rdf_tuples_common::{
    check_column, check_prefix, BoxedTuples, DefinablePrefix, Reresolvable, RowComparator, Tuples,
};
use rdf_tuples_model::{
    Bindings, Constraint, ConstraintElement, NodeId, TuplesError, TuplesResult, Variable,
};
use rustc_hash::FxHashSet;
use std::any::Any;
use std::ops::Range;
use std::sync::Arc;

/// What one position of the chosen index contributes to a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// The position must hold this node.
    Fixed(NodeId),
    /// The position holds the value of this column.
    Column(usize),
}

/// The part of a resolution that is shared between clones.
#[derive(Debug)]
struct ResolutionLayout {
    components: IndexComponents,
    rows: IndexRows,
    variables: Vec<Variable>,
    slots: [Slot; 4],
    /// The first index position of each column.
    column_slots: Vec<usize>,
    /// The rows that match the fixed leading positions.
    fixed_range: Range<usize>,
}

impl ResolutionLayout {
    fn new(
        constraint: &Constraint,
        snapshot: &IndexPermutations,
        bound_variables: &FxHashSet<Variable>,
    ) -> Self {
        let bound = constraint.elements().each_ref().map(|element| match element {
            ConstraintElement::Node(_) => true,
            ConstraintElement::Variable(variable) => bound_variables.contains(variable),
        });
        let (components, rows) = snapshot.choose_index(bound);

        let mut variables: Vec<Variable> = Vec::new();
        let mut column_slots = Vec::new();
        let mut slots = [Slot::Fixed(0); 4];
        for (slot, position) in components.statement_positions().into_iter().enumerate() {
            slots[slot] = match &constraint.elements()[position] {
                ConstraintElement::Node(node) => Slot::Fixed(*node),
                ConstraintElement::Variable(variable) => {
                    match variables.iter().position(|candidate| candidate == variable) {
                        Some(column) => Slot::Column(column),
                        None => {
                            variables.push(variable.clone());
                            column_slots.push(slot);
                            Slot::Column(variables.len() - 1)
                        }
                    }
                }
            };
        }

        let fixed_range = equal_range(rows, &seek_key(&slots, &[]));
        Self {
            components,
            rows: Arc::clone(rows),
            variables,
            slots,
            column_slots,
            fixed_range,
        }
    }

    /// Returns whether `row` satisfies the constraint and matches `prefix`.
    fn matches(&self, row: &IndexStatement, prefix: &[NodeId]) -> bool {
        self.slots.iter().zip(row.0).all(|(slot, value)| match slot {
            Slot::Fixed(node) => *node == value,
            Slot::Column(column) => {
                row.0[self.column_slots[*column]] == value
                    && prefix.get(*column).map_or(true, |expected| *expected == value)
            }
        })
    }
}

/// Returns the longest leading key of the index that is known from fixed nodes and `prefix`.
fn seek_key(slots: &[Slot; 4], prefix: &[NodeId]) -> Vec<NodeId> {
    let mut key = Vec::new();
    for slot in slots {
        match slot {
            Slot::Fixed(node) => key.push(*node),
            Slot::Column(column) => match prefix.get(*column) {
                Some(value) => key.push(*value),
                None => break,
            },
        }
    }
    key
}

/// The rows of an in-memory snapshot that match a [Constraint].
///
/// Each distinct variable of the constraint becomes a column. The columns appear in the order of
/// the index that serves the constraint, so the relation is sorted naturally. Once the planner
/// knows which variables are bound to the left of this relation, [DefinablePrefix::define_prefix]
/// switches to an index in which those variables lead. Prefix seeks then become binary searches.
///
/// A resolution reads a snapshot: statements that are inserted or removed afterward are not seen.
#[derive(Debug)]
pub struct StatementResolution {
    constraint: Constraint,
    snapshot: IndexPermutations,
    layout: Arc<ResolutionLayout>,
    comparator: RowComparator,
    range: Option<Range<usize>>,
    prefix: Vec<NodeId>,
    current: Option<usize>,
}

impl StatementResolution {
    /// Creates a new [StatementResolution] of `constraint` against `snapshot`.
    pub fn new(constraint: Constraint, snapshot: IndexPermutations) -> Self {
        let layout = ResolutionLayout::new(&constraint, &snapshot, &FxHashSet::default());
        let comparator = RowComparator::natural(layout.variables.len());
        Self {
            constraint,
            snapshot,
            layout: Arc::new(layout),
            comparator,
            range: None,
            prefix: Vec::new(),
            current: None,
        }
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Returns the index that serves this resolution.
    pub fn components(&self) -> IndexComponents {
        self.layout.components
    }
}

impl Tuples for StatementResolution {
    fn name(&self) -> &'static str {
        "StatementResolution"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &self.layout.variables
    }

    fn before_first(&mut self, prefix: &[NodeId], _suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.layout.variables.len())?;
        let key = seek_key(&self.layout.slots, prefix);
        self.range = Some(equal_range(&self.layout.rows, &key));
        self.prefix = prefix.to_vec();
        self.current = None;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        let range = self.range.as_mut().ok_or(TuplesError::NotPositioned)?;
        self.current = None;
        for position in range.by_ref() {
            if self
                .layout
                .matches(&self.layout.rows[position], &self.prefix)
            {
                self.current = Some(position);
                break;
            }
        }
        Ok(self.current.is_some())
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        let current = self.current.ok_or(TuplesError::NoCurrentRow)?;
        check_column(column, self.layout.variables.len())?;
        Ok(self.layout.rows[current].0[self.layout.column_slots[column]])
    }

    fn row_count(&self) -> TuplesResult<u64> {
        let layout = &self.layout;
        let count = layout.rows[layout.fixed_range.clone()]
            .iter()
            .filter(|row| layout.matches(row, &[]))
            .count();
        Ok(count as u64)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        Ok(self.layout.fixed_range.len() as u64)
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        check_column(column, self.layout.variables.len())?;
        Ok(false)
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        Ok(true)
    }

    fn comparator(&self) -> Option<&RowComparator> {
        Some(&self.comparator)
    }

    fn is_materialized(&self) -> bool {
        true
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        Vec::new()
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            constraint: self.constraint.clone(),
            snapshot: self.snapshot.clone(),
            layout: Arc::clone(&self.layout),
            comparator: self.comparator.clone(),
            range: self.range.clone(),
            prefix: self.prefix.clone(),
            current: self.current,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        self.range = None;
        self.current = None;
        Ok(())
    }

    fn definable_prefix(&mut self) -> Option<&mut dyn DefinablePrefix> {
        Some(self)
    }

    fn reresolvable(&self) -> Option<&dyn Reresolvable> {
        Some(self)
    }
}

impl DefinablePrefix for StatementResolution {
    fn define_prefix(&mut self, bound_variables: &FxHashSet<Variable>) -> TuplesResult<()> {
        if self.range.is_some() {
            return Err(TuplesError::invalid_argument(
                "The prefix of a resolution cannot change after its cursor was positioned",
            ));
        }
        let layout = ResolutionLayout::new(&self.constraint, &self.snapshot, bound_variables);
        if layout.components != self.layout.components {
            tracing::trace!(
                "Resolving {} with index {} instead of {}",
                self.constraint,
                layout.components,
                self.layout.components
            );
        }
        self.layout = Arc::new(layout);
        Ok(())
    }
}

impl Reresolvable for StatementResolution {
    fn reresolve(&self, bindings: &Bindings) -> TuplesResult<Option<BoxedTuples>> {
        Ok(self.constraint.bind(bindings).map(|constraint| -> BoxedTuples {
            Box::new(StatementResolution::new(constraint, self.snapshot.clone()))
        }))
    }
}
