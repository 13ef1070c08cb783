use crate::cursor::CursorState;
use rdf_tuples_common::{check_column, check_prefix, BoxedTuples, RowComparator, Tuples};
use rdf_tuples_model::{Cardinality, NodeId, TuplesError, TuplesResult, Variable};
use std::any::Any;
use std::sync::Arc;

/// A relation without rows. This is the zero of join.
#[derive(Debug)]
pub struct EmptyTuples {
    variables: Arc<[Variable]>,
    state: CursorState,
}

impl EmptyTuples {
    /// Creates a new [EmptyTuples] without variables.
    pub fn new() -> Self {
        Self::with_variables(Vec::new())
    }

    /// Creates a new [EmptyTuples] that still reports `variables`.
    pub fn with_variables(variables: Vec<Variable>) -> Self {
        Self {
            variables: variables.into(),
            state: CursorState::Unpositioned,
        }
    }
}

impl Default for EmptyTuples {
    fn default() -> Self {
        Self::new()
    }
}

impl Tuples for EmptyTuples {
    fn name(&self) -> &'static str {
        "EmptyTuples"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn before_first(&mut self, prefix: &[NodeId], _suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.variables.len())?;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        self.state = CursorState::Exhausted;
        Ok(false)
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        check_column(column, self.variables.len())?;
        Err(TuplesError::NoCurrentRow)
    }

    fn row_count(&self) -> TuplesResult<u64> {
        Ok(0)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        Ok(0)
    }

    fn row_cardinality(&self) -> TuplesResult<Cardinality> {
        Ok(Cardinality::Zero)
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        check_column(column, self.variables.len())?;
        Ok(false)
    }

    fn is_unconstrained(&self) -> TuplesResult<bool> {
        Ok(false)
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        Ok(true)
    }

    fn comparator(&self) -> Option<&RowComparator> {
        None
    }

    fn is_materialized(&self) -> bool {
        true
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        Vec::new()
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            variables: Arc::clone(&self.variables),
            state: self.state,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        Ok(())
    }
}

/// A relation with a single row and no columns. This is the identity of join.
#[derive(Debug, Default)]
pub struct UnconstrainedTuples {
    state: CursorState,
}

impl UnconstrainedTuples {
    /// Creates a new [UnconstrainedTuples].
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tuples for UnconstrainedTuples {
    fn name(&self) -> &'static str {
        "UnconstrainedTuples"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &[]
    }

    fn before_first(&mut self, prefix: &[NodeId], _suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, 0)?;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        self.state = CursorState::after_next(self.state == CursorState::BeforeRow);
        Ok(self.state == CursorState::OnRow)
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        check_column(column, 0)?;
        Err(TuplesError::NoCurrentRow)
    }

    fn row_count(&self) -> TuplesResult<u64> {
        Ok(1)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        Ok(1)
    }

    fn row_cardinality(&self) -> TuplesResult<Cardinality> {
        Ok(Cardinality::One)
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        check_column(column, 0)?;
        Ok(false)
    }

    fn is_unconstrained(&self) -> TuplesResult<bool> {
        Ok(true)
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        Ok(true)
    }

    fn comparator(&self) -> Option<&RowComparator> {
        None
    }

    fn is_materialized(&self) -> bool {
        true
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        Vec::new()
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self { state: self.state })
    }

    fn close(&mut self) -> TuplesResult<()> {
        Ok(())
    }
}
