use crate::cursor::CursorState;
use rdf_tuples_common::{check_column, check_prefix, BoxedTuples, RowComparator, Tuples};
use rdf_tuples_model::{NodeId, TuplesError, TuplesResult, Variable, UNBOUND};
use std::any::Any;
use std::sync::Arc;

/// The rows of a [LiteralTuples], shared between clones.
#[derive(Debug, Clone, Default)]
struct LiteralRows {
    rows: Vec<Box<[NodeId]>>,
    /// Whether some row holds [UNBOUND] in the column.
    ever_unbound: Vec<bool>,
}

/// A relation whose rows are given explicitly.
///
/// Rows are appended while building the relation and kept in insertion order. The rows do not
/// need to be sorted: a prefix seek scans all rows and skips the ones that do not match.
#[derive(Debug)]
pub struct LiteralTuples {
    /// The variables of the relation.
    variables: Arc<[Variable]>,
    /// The rows. Clones share the rows until one of them appends.
    rows: Arc<LiteralRows>,
    /// Set once the cursor has been positioned. No rows can be appended afterward.
    started: bool,
    state: CursorState,
    prefix: Vec<NodeId>,
    /// The index of the current row if [CursorState::OnRow], otherwise the next row to inspect.
    position: usize,
}

impl LiteralTuples {
    /// Creates an empty [LiteralTuples] with the given `variables`.
    pub fn new(variables: Vec<Variable>) -> Self {
        let arity = variables.len();
        Self {
            variables: variables.into(),
            rows: Arc::new(LiteralRows {
                rows: Vec::new(),
                ever_unbound: vec![false; arity],
            }),
            started: false,
            state: CursorState::Unpositioned,
            prefix: Vec::new(),
            position: 0,
        }
    }

    /// Creates a new [LiteralTuples] holding `rows`.
    pub fn try_from_rows(variables: Vec<Variable>, rows: Vec<Vec<NodeId>>) -> TuplesResult<Self> {
        let mut result = Self::new(variables);
        for row in rows {
            result.append_row(&row)?;
        }
        Ok(result)
    }

    /// Appends a row.
    ///
    /// Fails once the cursor has been positioned, or if the row has the wrong number of values.
    pub fn append_row(&mut self, row: &[NodeId]) -> TuplesResult<()> {
        if self.started {
            return Err(TuplesError::invalid_argument(
                "Rows cannot be appended to a LiteralTuples after iteration has started",
            ));
        }
        if row.len() != self.variables.len() {
            return Err(TuplesError::invalid_argument(format!(
                "Row of length {} cannot be appended to a LiteralTuples with {} columns",
                row.len(),
                self.variables.len()
            )));
        }

        let rows = Arc::make_mut(&mut self.rows);
        for (ever_unbound, value) in rows.ever_unbound.iter_mut().zip(row) {
            *ever_unbound |= *value == UNBOUND;
        }
        rows.rows.push(row.into());
        Ok(())
    }

    fn find_match(&self, start: usize) -> Option<usize> {
        self.rows.rows[start..]
            .iter()
            .position(|row| row.starts_with(&self.prefix))
            .map(|offset| start + offset)
    }
}

impl Tuples for LiteralTuples {
    fn name(&self) -> &'static str {
        "LiteralTuples"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn before_first(&mut self, prefix: &[NodeId], _suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.variables.len())?;
        self.started = true;
        self.prefix.clear();
        self.prefix.extend_from_slice(prefix);
        self.position = 0;
        self.state = CursorState::BeforeRow;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.state.ensure_positioned()?;
        let start = match self.state {
            CursorState::OnRow => self.position + 1,
            CursorState::Exhausted => return Ok(false),
            _ => self.position,
        };

        match self.find_match(start) {
            Some(position) => {
                self.position = position;
                self.state = CursorState::OnRow;
                Ok(true)
            }
            None => {
                self.position = self.rows.rows.len();
                self.state = CursorState::Exhausted;
                Ok(false)
            }
        }
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        self.state.ensure_on_row()?;
        check_column(column, self.variables.len())?;
        Ok(self.rows.rows[self.position][column])
    }

    fn row_count(&self) -> TuplesResult<u64> {
        Ok(self.rows.rows.len() as u64)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        self.row_count()
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        check_column(column, self.variables.len())?;
        Ok(self.rows.ever_unbound[column])
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        Ok(self.rows.rows.len() <= 1)
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
            rows: Arc::clone(&self.rows),
            started: self.started,
            state: self.state,
            prefix: self.prefix.clone(),
            position: self.position,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        Ok(())
    }
}
