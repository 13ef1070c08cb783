use crate::cursor::CursorState;
use rdf_tuples_common::{check_prefix, read_row, BoxedTuples, RowComparator, Tuples};
use rdf_tuples_model::{NodeId, TuplesError, TuplesResult, Variable};
use rustc_hash::FxHashSet;
use std::any::Any;

/// Removes duplicates from a sorted relation by skipping rows equal to the previous one.
#[derive(Debug)]
pub struct DistinctTuples {
    inner: BoxedTuples,
    state: CursorState,
    previous: Option<Vec<NodeId>>,
}

impl DistinctTuples {
    /// Creates a new [DistinctTuples].
    ///
    /// Returns an error if `inner` is not sorted, as duplicates would not be adjacent.
    pub fn try_new(inner: BoxedTuples) -> TuplesResult<Self> {
        if inner.comparator().is_none() {
            return Err(TuplesError::invalid_argument(
                "Removing adjacent duplicates requires a sorted relation",
            ));
        }
        Ok(Self {
            inner,
            state: CursorState::Unpositioned,
            previous: None,
        })
    }
}

impl Tuples for DistinctTuples {
    fn name(&self) -> &'static str {
        "DistinctTuples"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        self.inner.variables()
    }

    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.number_of_variables())?;
        self.inner.before_first(prefix, suffix_truncation)?;
        self.previous = None;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }

        while self.inner.next()? {
            let row = read_row(self.inner.as_ref())?;
            if self.previous.as_ref() != Some(&row) {
                self.previous = Some(row);
                self.state = CursorState::OnRow;
                return Ok(true);
            }
        }
        self.state = CursorState::Exhausted;
        Ok(false)
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        self.inner.column_value(column)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        self.inner.row_upper_bound()
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        self.inner.is_column_ever_unbound(column)
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        Ok(true)
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
            state: self.state,
            previous: self.previous.clone(),
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        self.inner.close()
    }
}

/// Removes duplicates from a relation in any order by remembering every emitted row.
///
/// The memory grows with the number of distinct rows between two calls to `before_first`.
#[derive(Debug)]
pub struct HashDistinctTuples {
    inner: BoxedTuples,
    state: CursorState,
    seen: FxHashSet<Vec<NodeId>>,
}

impl HashDistinctTuples {
    /// Creates a new [HashDistinctTuples].
    pub fn new(inner: BoxedTuples) -> Self {
        Self {
            inner,
            state: CursorState::Unpositioned,
            seen: FxHashSet::default(),
        }
    }
}

impl Tuples for HashDistinctTuples {
    fn name(&self) -> &'static str {
        "HashDistinctTuples"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        self.inner.variables()
    }

    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.number_of_variables())?;
        self.inner.before_first(prefix, suffix_truncation)?;
        self.seen.clear();
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }

        while self.inner.next()? {
            if self.seen.insert(read_row(self.inner.as_ref())?) {
                self.state = CursorState::OnRow;
                return Ok(true);
            }
        }
        self.state = CursorState::Exhausted;
        Ok(false)
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        self.inner.column_value(column)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        self.inner.row_upper_bound()
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        self.inner.is_column_ever_unbound(column)
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        Ok(true)
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
            state: self.state,
            seen: self.seen.clone(),
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{literal, rows_of, sorted};

    #[test]
    fn distinct_skips_adjacent_duplicates() -> TuplesResult<()> {
        let inner = sorted(&["x"], &[&[2], &[1], &[2], &[1], &[3]])?;
        let mut distinct = DistinctTuples::try_new(inner)?;
        assert_eq!(rows_of(&mut distinct)?, vec![vec![1], vec![2], vec![3]]);
        Ok(())
    }

    #[test]
    fn distinct_requires_sorted_input() -> TuplesResult<()> {
        let inner = literal(&["x"], &[&[1]])?;
        assert!(matches!(
            DistinctTuples::try_new(inner),
            Err(TuplesError::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn hash_distinct_keeps_first_occurrences() -> TuplesResult<()> {
        let inner = literal(&["x", "y"], &[&[2, 1], &[1, 1], &[2, 1], &[1, 2]])?;
        let mut distinct = HashDistinctTuples::new(inner);
        assert_eq!(
            rows_of(&mut distinct)?,
            vec![vec![2, 1], vec![1, 1], vec![1, 2]]
        );
        Ok(())
    }
}
