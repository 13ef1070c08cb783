use crate::cursor::CursorState;
use crate::filter::{EvaluationContext, Filter};
use rdf_tuples_common::{BoxedTuples, RowComparator, Tuples};
use rdf_tuples_model::{NodeId, TuplesError, TuplesResult, Variable};
use std::any::Any;
use std::sync::Arc;

/// Resolves variables against the current row of a relation.
struct RowContext<'tuples> {
    tuples: &'tuples dyn Tuples,
}

impl EvaluationContext for RowContext<'_> {
    fn value(&self, variable: &Variable) -> TuplesResult<NodeId> {
        let column = self.tuples.column_index(variable)?;
        self.tuples.column_value(column)
    }
}

/// The rows of a relation for which a [Filter] holds.
#[derive(Debug)]
pub struct FilteredTuples {
    inner: BoxedTuples,
    filter: Arc<dyn Filter>,
    state: CursorState,
}

impl FilteredTuples {
    /// Creates a new [FilteredTuples].
    pub fn new(inner: BoxedTuples, filter: Arc<dyn Filter>) -> Self {
        Self {
            inner,
            filter,
            state: CursorState::Unpositioned,
        }
    }

    pub fn filter(&self) -> &dyn Filter {
        self.filter.as_ref()
    }
}

impl Tuples for FilteredTuples {
    fn name(&self) -> &'static str {
        "FilteredTuples"
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
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }

        while self.inner.next()? {
            let context = RowContext {
                tuples: self.inner.as_ref(),
            };
            let passes = self
                .filter
                .test(&context)
                .map_err(|error| TuplesError::Filter(Box::new(error)))?;
            if passes {
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
            filter: Arc::clone(&self.filter),
            state: self.state,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterExpr, FilterTerm};
    use crate::test_utils::{literal, rows_of, var};

    #[test]
    fn filter_keeps_matching_rows() -> TuplesResult<()> {
        let inner = literal(&["x", "y"], &[&[1, 2], &[2, 2], &[3, 1]])?;
        let filter = FilterExpr::SameTerm(
            FilterTerm::Variable(var("y")),
            FilterTerm::Node(2),
        );
        let mut filtered = FilteredTuples::new(inner, Arc::new(filter));

        assert_eq!(rows_of(&mut filtered)?, vec![vec![1, 2], vec![2, 2]]);
        Ok(())
    }

    #[test]
    fn filter_errors_abort_iteration() -> TuplesResult<()> {
        let inner = literal(&["x"], &[&[1]])?;
        let mut filtered = FilteredTuples::new(inner, Arc::new(FilterExpr::Bound(var("z"))));

        filtered.rewind()?;
        let error = filtered.next();
        assert!(matches!(error, Err(TuplesError::Filter(_))));
        Ok(())
    }
}
