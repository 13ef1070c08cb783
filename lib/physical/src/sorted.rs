use crate::cursor::CursorState;
use rdf_tuples_common::{
    check_column, check_prefix, read_row, BoxedTuples, RowComparator, Tuples,
};
use rdf_tuples_model::{NodeId, TuplesResult, Variable, UNBOUND};
use std::any::Any;
use std::ops::Range;
use std::sync::Arc;

/// The immutable part of a [SortedTuples], shared by all clones.
#[derive(Debug)]
struct SortedRows {
    variables: Vec<Variable>,
    rows: Vec<Box<[NodeId]>>,
    comparator: RowComparator,
    ever_unbound: Vec<bool>,
    has_no_duplicates: bool,
}

/// A materialized relation whose rows are sorted by a [RowComparator].
///
/// If the comparator orders the leading columns from left to right, a prefix seek is a binary
/// search. Otherwise, the cursor falls back to scanning all rows.
#[derive(Debug)]
pub struct SortedTuples {
    inner: Arc<SortedRows>,
    state: CursorState,
    prefix: Vec<NodeId>,
    /// Rows that may match the prefix.
    range: Range<usize>,
    position: usize,
}

impl SortedTuples {
    /// Reads all rows of `tuples` and sorts them by `comparator`. Closes `tuples`.
    pub fn try_new(mut tuples: BoxedTuples, comparator: RowComparator) -> TuplesResult<Self> {
        let variables = tuples.variables().to_vec();
        let mut rows = Vec::new();
        tuples.rewind()?;
        while tuples.next()? {
            rows.push(read_row(tuples.as_ref())?);
        }
        tuples.close()?;
        Ok(Self::from_rows(variables, rows, comparator))
    }

    /// Creates a new [SortedTuples] holding `rows`, which are sorted by this call.
    pub fn from_rows(
        variables: Vec<Variable>,
        rows: Vec<Vec<NodeId>>,
        comparator: RowComparator,
    ) -> Self {
        let mut rows: Vec<Box<[NodeId]>> = rows.into_iter().map(Vec::into_boxed_slice).collect();
        rows.sort_by(|lhs, rhs| comparator.compare(lhs, rhs).then_with(|| lhs.cmp(rhs)));

        let has_no_duplicates = rows.windows(2).all(|pair| pair[0] != pair[1]);
        let ever_unbound = (0..variables.len())
            .map(|column| rows.iter().any(|row| row[column] == UNBOUND))
            .collect();
        let len = rows.len();

        Self {
            inner: Arc::new(SortedRows {
                variables,
                rows,
                comparator,
                ever_unbound,
                has_no_duplicates,
            }),
            state: CursorState::Unpositioned,
            prefix: Vec::new(),
            range: 0..len,
            position: 0,
        }
    }

    /// Returns whether a prefix of `length` columns can be located with a binary search.
    fn is_seekable(&self, length: usize) -> bool {
        let columns = self.inner.comparator.columns();
        length <= columns.len()
            && columns[..length]
                .iter()
                .enumerate()
                .all(|(position, column)| position == *column)
    }

    fn matches_prefix(&self, row: &[NodeId]) -> bool {
        row.starts_with(&self.prefix)
    }
}

impl Tuples for SortedTuples {
    fn name(&self) -> &'static str {
        "SortedTuples"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &self.inner.variables
    }

    fn before_first(&mut self, prefix: &[NodeId], _suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.inner.variables.len())?;
        self.prefix.clear();
        self.prefix.extend_from_slice(prefix);

        let rows = &self.inner.rows;
        self.range = if !prefix.is_empty() && self.is_seekable(prefix.len()) {
            let length = prefix.len();
            let start = rows.partition_point(|row| &row[..length] < prefix);
            let end = rows.partition_point(|row| &row[..length] <= prefix);
            start..end
        } else {
            0..rows.len()
        };
        self.position = self.range.start;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        let mut candidate = match self.state {
            CursorState::OnRow => self.position + 1,
            CursorState::Exhausted => return Ok(false),
            _ => self.position,
        };

        while candidate < self.range.end && !self.matches_prefix(&self.inner.rows[candidate]) {
            candidate += 1;
        }

        self.position = candidate;
        self.state = CursorState::after_next(candidate < self.range.end);
        Ok(self.state == CursorState::OnRow)
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        check_column(column, self.inner.variables.len())?;
        Ok(self.inner.rows[self.position][column])
    }

    fn row_count(&self) -> TuplesResult<u64> {
        Ok(self.inner.rows.len() as u64)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        self.row_count()
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        check_column(column, self.inner.variables.len())?;
        Ok(self.inner.ever_unbound[column])
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        Ok(self.inner.has_no_duplicates)
    }

    fn comparator(&self) -> Option<&RowComparator> {
        Some(&self.inner.comparator)
    }

    fn is_materialized(&self) -> bool {
        true
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        Vec::new()
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            inner: Arc::clone(&self.inner),
            state: self.state,
            prefix: self.prefix.clone(),
            range: self.range.clone(),
            position: self.position,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        Ok(())
    }
}
