use crate::cursor::CursorState;
use rdf_tuples_common::{
    check_column, check_prefix, close_all, read_row, BoxedTuples, RowComparator, Tuples,
};
use rdf_tuples_model::{NodeId, TuplesError, TuplesResult, Variable};
use std::any::Any;
use std::cmp::Ordering;
use std::sync::Arc;

/// Ensures that all operands have the same variables in the same order.
fn union_variables(operands: &[BoxedTuples]) -> TuplesResult<Arc<[Variable]>> {
    let Some(first) = operands.first() else {
        return Err(TuplesError::invalid_argument(
            "An append requires at least one operand",
        ));
    };
    if let Some(mismatch) = operands
        .iter()
        .find(|operand| operand.variables() != first.variables())
    {
        return Err(TuplesError::invalid_argument(format!(
            "Operands of an append must be union-compatible, got {:?} and {:?}",
            first.variables(),
            mismatch.variables()
        )));
    }
    Ok(first.variables().into())
}

fn sum_upper_bounds(operands: &[BoxedTuples]) -> TuplesResult<u64> {
    let mut sum: u64 = 0;
    for operand in operands {
        sum = sum.saturating_add(operand.row_upper_bound()?);
    }
    Ok(sum)
}

fn sum_row_counts(operands: &[BoxedTuples]) -> TuplesResult<u64> {
    let mut sum: u64 = 0;
    for operand in operands {
        sum = sum.saturating_add(operand.row_count()?);
    }
    Ok(sum)
}

fn any_ever_unbound(operands: &[BoxedTuples], column: usize) -> TuplesResult<bool> {
    for operand in operands {
        if operand.is_column_ever_unbound(column)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn any_unconstrained(operands: &[BoxedTuples]) -> TuplesResult<bool> {
    for operand in operands {
        if operand.is_unconstrained()? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The concatenation of union-compatible operands.
///
/// The rows of each operand are emitted in turn. The prefix of `before_first` is passed to every
/// operand. No duplicates are removed.
#[derive(Debug)]
pub struct UnorderedAppend {
    operands: Vec<BoxedTuples>,
    variables: Arc<[Variable]>,
    state: CursorState,
    prefix: Vec<NodeId>,
    suffix_truncation: usize,
    /// The operand that is currently read.
    current: usize,
    closed: bool,
}

impl UnorderedAppend {
    /// Creates a new [UnorderedAppend].
    ///
    /// Returns an error if `operands` is empty or if the operands are not union-compatible.
    pub fn try_new(operands: Vec<BoxedTuples>) -> TuplesResult<Self> {
        let variables = union_variables(&operands)?;
        Ok(Self {
            operands,
            variables,
            state: CursorState::Unpositioned,
            prefix: Vec::new(),
            suffix_truncation: 0,
            current: 0,
            closed: false,
        })
    }
}

impl Tuples for UnorderedAppend {
    fn name(&self) -> &'static str {
        "UnorderedAppend"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.variables.len())?;
        self.prefix.clear();
        self.prefix.extend_from_slice(prefix);
        self.suffix_truncation = suffix_truncation;
        self.current = 0;
        self.operands[0].before_first(prefix, suffix_truncation)?;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }

        loop {
            if self.operands[self.current].next()? {
                self.state = CursorState::OnRow;
                return Ok(true);
            }

            self.current += 1;
            if self.current == self.operands.len() {
                self.current -= 1;
                self.state = CursorState::Exhausted;
                return Ok(false);
            }
            self.operands[self.current].before_first(&self.prefix, self.suffix_truncation)?;
        }
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        check_column(column, self.variables.len())?;
        self.operands[self.current].column_value(column)
    }

    fn row_count(&self) -> TuplesResult<u64> {
        sum_row_counts(&self.operands)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        sum_upper_bounds(&self.operands)
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        check_column(column, self.variables.len())?;
        any_ever_unbound(&self.operands, column)
    }

    fn is_unconstrained(&self) -> TuplesResult<bool> {
        any_unconstrained(&self.operands)
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        Ok(false)
    }

    fn comparator(&self) -> Option<&RowComparator> {
        None
    }

    fn is_materialized(&self) -> bool {
        false
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        self.operands.iter().map(AsRef::as_ref).collect()
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            operands: self.operands.iter().map(|operand| operand.duplicate()).collect(),
            variables: Arc::clone(&self.variables),
            state: self.state,
            prefix: self.prefix.clone(),
            suffix_truncation: self.suffix_truncation,
            current: self.current,
            closed: self.closed,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        close_all(&mut self.operands)
    }
}

/// The merge of union-compatible operands that are sorted by the same [RowComparator].
///
/// The result is sorted by the same comparator. No duplicates are removed.
#[derive(Debug)]
pub struct OrderedAppend {
    operands: Vec<BoxedTuples>,
    variables: Arc<[Variable]>,
    comparator: RowComparator,
    state: CursorState,
    /// The current row of every operand that is not exhausted.
    heads: Vec<Option<Vec<NodeId>>>,
    /// Whether the heads have been read since the last `before_first`.
    primed: bool,
    /// The operand whose head is the current row.
    current: usize,
    closed: bool,
}

impl OrderedAppend {
    /// Creates a new [OrderedAppend].
    ///
    /// Returns an error if `operands` is empty, if the operands are not union-compatible or if
    /// they do not share a comparator.
    pub fn try_new(operands: Vec<BoxedTuples>) -> TuplesResult<Self> {
        let variables = union_variables(&operands)?;
        let comparator = operands[0].comparator().cloned().ok_or_else(|| {
            TuplesError::invalid_argument("Operands of an ordered append must be sorted")
        })?;
        if operands
            .iter()
            .any(|operand| operand.comparator() != Some(&comparator))
        {
            return Err(TuplesError::invalid_argument(
                "Operands of an ordered append must share the same row order",
            ));
        }

        let heads = vec![None; operands.len()];
        Ok(Self {
            operands,
            variables,
            comparator,
            state: CursorState::Unpositioned,
            heads,
            primed: false,
            current: 0,
            closed: false,
        })
    }

    fn read_head(&mut self, index: usize) -> TuplesResult<()> {
        self.heads[index] = if self.operands[index].next()? {
            Some(read_row(self.operands[index].as_ref())?)
        } else {
            None
        };
        Ok(())
    }

    /// Returns the operand with the smallest head. Ties go to the leftmost operand.
    fn smallest_head(&self) -> Option<usize> {
        let mut smallest: Option<(usize, &Vec<NodeId>)> = None;
        for (index, head) in self.heads.iter().enumerate() {
            let Some(head) = head else {
                continue;
            };
            smallest = match smallest {
                Some((_, best)) if self.comparator.compare(head, best) != Ordering::Less => {
                    smallest
                }
                _ => Some((index, head)),
            };
        }
        smallest.map(|(index, _)| index)
    }
}

impl Tuples for OrderedAppend {
    fn name(&self) -> &'static str {
        "OrderedAppend"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.variables.len())?;
        for operand in &mut self.operands {
            operand.before_first(prefix, suffix_truncation)?;
        }
        self.heads.iter_mut().for_each(|head| *head = None);
        self.primed = false;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }

        if self.primed {
            self.read_head(self.current)?;
        } else {
            for index in 0..self.operands.len() {
                self.read_head(index)?;
            }
            self.primed = true;
        }

        match self.smallest_head() {
            Some(index) => {
                self.current = index;
                self.state = CursorState::OnRow;
                Ok(true)
            }
            None => {
                self.state = CursorState::Exhausted;
                Ok(false)
            }
        }
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        check_column(column, self.variables.len())?;
        match &self.heads[self.current] {
            Some(head) => Ok(head[column]),
            None => Err(TuplesError::NoCurrentRow),
        }
    }

    fn row_count(&self) -> TuplesResult<u64> {
        sum_row_counts(&self.operands)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        sum_upper_bounds(&self.operands)
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        check_column(column, self.variables.len())?;
        any_ever_unbound(&self.operands, column)
    }

    fn is_unconstrained(&self) -> TuplesResult<bool> {
        any_unconstrained(&self.operands)
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        Ok(false)
    }

    fn comparator(&self) -> Option<&RowComparator> {
        Some(&self.comparator)
    }

    fn is_materialized(&self) -> bool {
        false
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        self.operands.iter().map(AsRef::as_ref).collect()
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            operands: self.operands.iter().map(|operand| operand.duplicate()).collect(),
            variables: Arc::clone(&self.variables),
            comparator: self.comparator.clone(),
            state: self.state,
            heads: self.heads.clone(),
            primed: self.primed,
            current: self.current,
            closed: self.closed,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        close_all(&mut self.operands)
    }
}
