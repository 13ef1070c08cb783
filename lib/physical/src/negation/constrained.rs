use crate::cursor::CursorState;
use crate::negation::SkipStrategy;
use rdf_tuples_common::{check_prefix, BoxedTuples, RowComparator, StatementStore, Tuples};
use rdf_tuples_model::{Constraint, NodeId, TuplesError, TuplesResult, Variable};
use std::any::Any;
use std::cell::OnceCell;
use std::sync::Arc;

const GRAPH: usize = 3;

/// The configuration of a [ConstrainedNegationTuples], shared by all clones.
#[derive(Debug)]
struct NegationLayout {
    strategy: SkipStrategy,
    variables: Arc<[Variable]>,
    /// The backing columns and values that identify an excluded row, in the sort order of the
    /// strategy.
    exclusion: Vec<(usize, NodeId)>,
    /// Whether the fully fixed statement exists. Only known for [SkipStrategy::SingleStatement].
    statement_exists: Option<bool>,
}

/// Every statement of a backing relation except those matching a statement pattern.
///
/// The backing relation holds one column per statement position and must be sorted so that the
/// fixed positions lead. The excluded statements then form one contiguous block, which the cursor
/// skips while iterating.
#[derive(Debug)]
pub struct ConstrainedNegationTuples {
    backing: BoxedTuples,
    layout: Arc<NegationLayout>,
    /// Set once the cursor has passed the excluded block.
    block_skipped: bool,
    /// Set while the cursor is inside the excluded block.
    in_block: bool,
    row_count: OnceCell<u64>,
    state: CursorState,
}

impl ConstrainedNegationTuples {
    /// Creates a negation of the statements of `backing` whose subject, predicate and object equal
    /// the given values. [None] matches any node.
    ///
    /// `column_of_position` holds, for subject, predicate and object, the backing column that
    /// stores the position.
    pub fn new(
        subject: Option<NodeId>,
        predicate: Option<NodeId>,
        object: Option<NodeId>,
        backing: BoxedTuples,
        column_of_position: [usize; 3],
    ) -> TuplesResult<Self> {
        let fixed = [subject, predicate, object];
        let strategy =
            SkipStrategy::for_fixed(subject.is_some(), predicate.is_some(), object.is_some());
        let exclusion = exclusion_for(strategy, fixed, &column_of_position);

        let statement_exists = if strategy == SkipStrategy::SingleStatement {
            Some(count_block(backing.as_ref(), &exclusion, Some(1))? > 0)
        } else {
            None
        };

        let variables = backing.variables().into();
        Ok(Self::with_layout(
            backing,
            NegationLayout {
                strategy,
                variables,
                exclusion,
                statement_exists,
            },
        ))
    }

    /// Creates the negation of `constraint` over the statements of `store`.
    ///
    /// Columns that hold a variable of the constraint are named after it. The remaining columns
    /// keep the names chosen by the store. Fails with [TuplesError::InvalidArgument] if a variable
    /// of the constraint has the store's name of another column.
    pub fn from_constraint(
        constraint: &Constraint,
        store: &dyn StatementStore,
    ) -> TuplesResult<Self> {
        let values = constraint.fixed_values();
        let bound = values.map(|value| value.is_some());
        let [subject, predicate, object, graph] = values;
        let strategy =
            SkipStrategy::for_fixed(subject.is_some(), predicate.is_some(), object.is_some());

        let statement_exists = if strategy == SkipStrategy::SingleStatement {
            Some(store.exists(values)?)
        } else {
            None
        };

        let backing = store.find_tuples(bound)?;
        let mut column_of_position = [0; 4];
        for (column, position) in store.column_order(bound).into_iter().enumerate() {
            column_of_position[position] = column;
        }

        let mut variables = backing.variables().to_vec();
        let mut renamed = Vec::new();
        for (position, element) in constraint.elements().iter().enumerate() {
            if let Some(variable) = element.as_variable() {
                if !renamed.contains(variable) {
                    variables[column_of_position[position]] = variable.clone();
                    renamed.push(variable.clone());
                }
            }
        }
        let repeated = variables
            .iter()
            .enumerate()
            .find(|(column, variable)| variables[..*column].contains(*variable));
        if let Some((_, variable)) = repeated {
            let message =
                format!("Variable {variable} of {constraint} names two columns of the negation");
            let mut backing = backing;
            backing.close()?;
            return Err(TuplesError::invalid_argument(message));
        }

        let mut exclusion = exclusion_for(
            strategy,
            [subject, predicate, object],
            &column_of_position,
        );
        if let Some(graph) = graph {
            exclusion.insert(0, (column_of_position[GRAPH], graph));
        }

        tracing::debug!(%constraint, %strategy, "Negating constraint");
        Ok(Self::with_layout(
            backing,
            NegationLayout {
                strategy,
                variables: variables.into(),
                exclusion,
                statement_exists,
            },
        ))
    }

    fn with_layout(backing: BoxedTuples, layout: NegationLayout) -> Self {
        Self {
            backing,
            layout: Arc::new(layout),
            block_skipped: false,
            in_block: false,
            row_count: OnceCell::new(),
            state: CursorState::Unpositioned,
        }
    }

    pub fn strategy(&self) -> SkipStrategy {
        self.layout.strategy
    }

    fn is_excluded(&self) -> TuplesResult<bool> {
        row_in_block(self.backing.as_ref(), &self.layout.exclusion)
    }
}

fn exclusion_for(
    strategy: SkipStrategy,
    fixed: [Option<NodeId>; 3],
    column_of_position: &[usize],
) -> Vec<(usize, NodeId)> {
    strategy
        .exclusion_positions(fixed.map(|value| value.is_some()))
        .into_iter()
        .filter_map(|position| {
            fixed[position].map(|value| (column_of_position[position], value))
        })
        .collect()
}

fn row_in_block(tuples: &dyn Tuples, exclusion: &[(usize, NodeId)]) -> TuplesResult<bool> {
    for (column, value) in exclusion {
        if tuples.column_value(*column)? != *value {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Counts the rows of `backing` that match `exclusion`, stopping at `limit`.
fn count_block(
    backing: &dyn Tuples,
    exclusion: &[(usize, NodeId)],
    limit: Option<u64>,
) -> TuplesResult<u64> {
    let mut probe = backing.duplicate();
    let leading = exclusion
        .iter()
        .enumerate()
        .all(|(index, (column, _))| index == *column);
    if leading {
        let prefix: Vec<NodeId> = exclusion.iter().map(|(_, value)| *value).collect();
        probe.before_first(&prefix, 0)?;
    } else {
        probe.rewind()?;
    }

    let mut count: u64 = 0;
    let limit = limit.unwrap_or(u64::MAX);
    while count < limit && probe.next()? {
        if row_in_block(probe.as_ref(), exclusion)? {
            count += 1;
        }
    }
    probe.close()?;
    Ok(count)
}

impl Tuples for ConstrainedNegationTuples {
    fn name(&self) -> &'static str {
        "ConstrainedNegationTuples"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &self.layout.variables
    }

    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.layout.variables.len())?;
        self.backing.before_first(prefix, suffix_truncation)?;
        self.block_skipped = false;
        self.in_block = false;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        if self.state == CursorState::Exhausted || self.layout.exclusion.is_empty() {
            self.state = CursorState::Exhausted;
            return Ok(false);
        }

        while self.backing.next()? {
            if self.block_skipped {
                self.state = CursorState::OnRow;
                return Ok(true);
            }
            if self.is_excluded()? {
                self.in_block = true;
                if self.layout.strategy == SkipStrategy::SingleStatement {
                    self.block_skipped = true;
                }
                continue;
            }
            if self.in_block {
                self.block_skipped = true;
            }
            self.state = CursorState::OnRow;
            return Ok(true);
        }
        self.state = CursorState::Exhausted;
        Ok(false)
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        self.backing.column_value(column)
    }

    fn row_count(&self) -> TuplesResult<u64> {
        if let Some(count) = self.row_count.get() {
            return Ok(*count);
        }

        let layout = &self.layout;
        let count = if layout.exclusion.is_empty() {
            0
        } else {
            let total = self.backing.row_count()?;
            let block = match layout.statement_exists {
                Some(exists) => u64::from(exists),
                None => count_block(self.backing.as_ref(), &layout.exclusion, None)?,
            };
            total.saturating_sub(block)
        };
        Ok(*self.row_count.get_or_init(|| count))
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        self.row_count()
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        self.backing.is_column_ever_unbound(column)
    }

    fn is_unconstrained(&self) -> TuplesResult<bool> {
        match self.layout.statement_exists {
            Some(exists) => Ok(!exists),
            None => self.backing.is_unconstrained(),
        }
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        self.backing.has_no_duplicates()
    }

    fn comparator(&self) -> Option<&RowComparator> {
        self.backing.comparator()
    }

    fn is_materialized(&self) -> bool {
        self.backing.is_materialized()
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        vec![self.backing.as_ref()]
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            backing: self.backing.duplicate(),
            layout: Arc::clone(&self.layout),
            block_skipped: self.block_skipped,
            in_block: self.in_block,
            row_count: self.row_count.clone(),
            state: self.state,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        self.backing.close()
    }
}
