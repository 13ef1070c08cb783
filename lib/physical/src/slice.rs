use crate::cursor::CursorState;
use rdf_tuples_common::{BoxedTuples, RowComparator, Tuples};
use rdf_tuples_model::{NodeId, TuplesResult, Variable};
use std::any::Any;

/// The first `limit` rows of a relation, counted from each `before_first`.
#[derive(Debug)]
pub struct LimitedTuples {
    inner: BoxedTuples,
    limit: u64,
    emitted: u64,
    state: CursorState,
}

impl LimitedTuples {
    pub fn new(inner: BoxedTuples, limit: u64) -> Self {
        Self {
            inner,
            limit,
            emitted: 0,
            state: CursorState::Unpositioned,
        }
    }
}

impl Tuples for LimitedTuples {
    fn name(&self) -> &'static str {
        "LimitedTuples"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        self.inner.variables()
    }

    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()> {
        self.inner.before_first(prefix, suffix_truncation)?;
        self.emitted = 0;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        let has_row = self.emitted < self.limit && self.inner.next()?;
        if has_row {
            self.emitted += 1;
        }
        self.state = CursorState::after_next(has_row);
        Ok(has_row)
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        self.inner.column_value(column)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        Ok(self.inner.row_upper_bound()?.min(self.limit))
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        self.inner.is_column_ever_unbound(column)
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        self.inner.has_no_duplicates()
    }

    fn comparator(&self) -> Option<&RowComparator> {
        self.inner.comparator()
    }

    fn is_materialized(&self) -> bool {
        false
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        vec![self.inner.as_ref()]
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            inner: self.inner.duplicate(),
            limit: self.limit,
            emitted: self.emitted,
            state: self.state,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        self.inner.close()
    }
}

/// A relation without its first `offset` rows, counted from each `before_first`.
#[derive(Debug)]
pub struct OffsetTuples {
    inner: BoxedTuples,
    offset: u64,
    state: CursorState,
}

impl OffsetTuples {
    pub fn new(inner: BoxedTuples, offset: u64) -> Self {
        Self {
            inner,
            offset,
            state: CursorState::Unpositioned,
        }
    }
}

impl Tuples for OffsetTuples {
    fn name(&self) -> &'static str {
        "OffsetTuples"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        self.inner.variables()
    }

    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()> {
        self.inner.before_first(prefix, suffix_truncation)?;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        if self.state == CursorState::BeforeRow {
            for _ in 0..self.offset {
                if !self.inner.next()? {
                    self.state = CursorState::Exhausted;
                    return Ok(false);
                }
            }
        } else if self.state == CursorState::Exhausted {
            return Ok(false);
        }

        let has_row = self.inner.next()?;
        self.state = CursorState::after_next(has_row);
        Ok(has_row)
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        self.inner.column_value(column)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        Ok(self.inner.row_upper_bound()?.saturating_sub(self.offset))
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        self.inner.is_column_ever_unbound(column)
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        self.inner.has_no_duplicates()
    }

    fn comparator(&self) -> Option<&RowComparator> {
        self.inner.comparator()
    }

    fn is_materialized(&self) -> bool {
        false
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        vec![self.inner.as_ref()]
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            inner: self.inner.duplicate(),
            offset: self.offset,
            state: self.state,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        self.inner.close()
    }
}
