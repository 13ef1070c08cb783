use crate::cursor::CursorState;
use rdf_tuples_common::{check_column, check_prefix, BoxedTuples, RowComparator, Tuples};
use rdf_tuples_model::{NodeId, TuplesResult, Variable, UNBOUND};
use std::any::Any;
use std::sync::Arc;

#[derive(Debug)]
struct ProjectionLayout {
    variables: Vec<Variable>,
    /// For each output column, the source column. [None] if the source lacks the variable.
    columns: Vec<Option<usize>>,
}

/// A view of a relation restricted to, and reordered by, a list of variables.
///
/// Variables that the source does not have are [UNBOUND] in every row. The projection keeps
/// duplicate rows; callers remove them if required.
#[derive(Debug)]
pub struct UnorderedProjection {
    inner: BoxedTuples,
    layout: Arc<ProjectionLayout>,
    state: CursorState,
    /// The prefix that must be checked row by row because the source cannot seek it.
    filter_prefix: Vec<NodeId>,
}

impl UnorderedProjection {
    /// Creates a new [UnorderedProjection] of `inner` onto `variables`.
    pub fn new(inner: BoxedTuples, variables: Vec<Variable>) -> Self {
        let columns = variables
            .iter()
            .map(|variable| inner.column_index(variable).ok())
            .collect();
        Self {
            inner,
            layout: Arc::new(ProjectionLayout { variables, columns }),
            state: CursorState::Unpositioned,
            filter_prefix: Vec::new(),
        }
    }

    /// Returns whether the first `length` output columns are the first source columns.
    fn is_source_prefix(&self, length: usize) -> bool {
        self.layout.columns[..length]
            .iter()
            .enumerate()
            .all(|(position, column)| *column == Some(position))
    }

    fn matches_filter_prefix(&self) -> TuplesResult<bool> {
        for (column, expected) in self.filter_prefix.iter().enumerate() {
            if self.column_value(column)? != *expected {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Tuples for UnorderedProjection {
    fn name(&self) -> &'static str {
        "UnorderedProjection"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &self.layout.variables
    }

    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.layout.variables.len())?;
        self.filter_prefix.clear();
        if self.is_source_prefix(prefix.len()) {
            self.inner.before_first(prefix, suffix_truncation)?;
        } else {
            self.filter_prefix.extend_from_slice(prefix);
            self.inner.rewind()?;
        }
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }

        while self.inner.next()? {
            self.state = CursorState::OnRow;
            if self.matches_filter_prefix()? {
                return Ok(true);
            }
        }
        self.state = CursorState::Exhausted;
        Ok(false)
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        check_column(column, self.layout.variables.len())?;
        match self.layout.columns[column] {
            Some(source) => self.inner.column_value(source),
            None => Ok(UNBOUND),
        }
    }

    fn row_count(&self) -> TuplesResult<u64> {
        self.inner.row_count()
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        self.inner.row_upper_bound()
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        check_column(column, self.layout.variables.len())?;
        match self.layout.columns[column] {
            Some(source) => self.inner.is_column_ever_unbound(source),
            None => Ok(true),
        }
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        let keeps_all_columns = (0..self.inner.number_of_variables())
            .all(|source| self.layout.columns.contains(&Some(source)));
        Ok(keeps_all_columns && self.inner.has_no_duplicates()?)
    }

    fn comparator(&self) -> Option<&RowComparator> {
        None
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
            layout: Arc::clone(&self.layout),
            state: self.state,
            filter_prefix: self.filter_prefix.clone(),
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        self.inner.close()
    }
}
