use crate::cursor::CursorState;
use rdf_tuples_common::{check_column, check_prefix, close_all, BoxedTuples, RowComparator, Tuples};
use rdf_tuples_model::{NodeId, TuplesError, TuplesResult, Variable};
use std::any::Any;
use std::sync::Arc;

const NAME: &str = "Difference";

/// The rows of a minuend that have no matching row in a subtrahend.
///
/// The leading columns of the subtrahend must be exactly the variables that it shares with the
/// minuend. For each minuend row, the subtrahend is positioned with the shared values as prefix;
/// the row is emitted if the subtrahend has no row for that prefix.
#[derive(Debug)]
pub struct Difference {
    /// The operands, the minuend first.
    operands: [BoxedTuples; 2],
    /// For each leading subtrahend column, the minuend column that holds the same variable.
    minuend_columns: Arc<[usize]>,
    state: CursorState,
    /// The seek prefix of the subtrahend, reused between rows.
    probe: Vec<NodeId>,
    closed: bool,
}

impl Difference {
    /// Creates a new [Difference].
    pub fn try_new(minuend: BoxedTuples, subtrahend: BoxedTuples) -> TuplesResult<Self> {
        let common = minuend
            .variables()
            .iter()
            .filter(|variable| subtrahend.variables().contains(variable))
            .count();
        if common == 0 {
            return Err(TuplesError::NoCommonVariables);
        }

        let mut minuend_columns = Vec::with_capacity(common);
        for (column, variable) in subtrahend.variables().iter().enumerate() {
            match minuend.column_index(variable) {
                Ok(minuend_column) if column < common => minuend_columns.push(minuend_column),
                Ok(_) => {
                    return Err(TuplesError::invalid_argument(format!(
                        "Subtrahend is not sorted correctly: shared variable {variable} is not a leading column"
                    )))
                }
                Err(_) => {}
            }
        }

        Ok(Self {
            operands: [minuend, subtrahend],
            minuend_columns: minuend_columns.into(),
            state: CursorState::Unpositioned,
            probe: vec![0; common],
            closed: false,
        })
    }

    /// Returns whether the current minuend row has a match in the subtrahend.
    fn find_match(&mut self) -> TuplesResult<bool> {
        let [minuend, subtrahend] = &mut self.operands;
        for (slot, column) in self.probe.iter_mut().zip(self.minuend_columns.iter()) {
            *slot = minuend
                .column_value(*column)
                .map_err(|error| error.in_operand(NAME, 0))?;
        }
        subtrahend
            .before_first(&self.probe, 0)
            .and_then(|()| subtrahend.next())
            .map_err(|error| error.in_operand(NAME, 1))
    }
}

impl Tuples for Difference {
    fn name(&self) -> &'static str {
        NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        self.operands[0].variables()
    }

    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.number_of_variables())?;
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
            let has_row = self.operands[0]
                .next()
                .map_err(|error| error.in_operand(NAME, 0))?;
            if !has_row {
                self.state = CursorState::Exhausted;
                return Ok(false);
            }
            if !self.find_match()? {
                self.state = CursorState::OnRow;
                return Ok(true);
            }
        }
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        check_column(column, self.number_of_variables())?;
        self.operands[0].column_value(column)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        self.operands[0].row_upper_bound()
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        self.operands[0].is_column_ever_unbound(column)
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        self.operands[0].has_no_duplicates()
    }

    fn comparator(&self) -> Option<&RowComparator> {
        self.operands[0].comparator()
    }

    fn is_materialized(&self) -> bool {
        false
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        self.operands.iter().map(AsRef::as_ref).collect()
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            operands: [self.operands[0].duplicate(), self.operands[1].duplicate()],
            minuend_columns: Arc::clone(&self.minuend_columns),
            state: self.state,
            probe: self.probe.clone(),
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
