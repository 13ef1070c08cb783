use crate::index::{IndexComponent, IndexComponents, IndexRows};
use rdf_tuples_common::{check_column, check_prefix, BoxedTuples, RowComparator, Tuples};
use rdf_tuples_model::{NodeId, TuplesError, TuplesResult, Variable};
use std::any::Any;
use std::ops::Range;
use std::sync::Arc;

/// Returns the name of the column that holds `component` in a [StoreTuples].
pub(crate) fn component_variable(component: IndexComponent) -> Variable {
    Variable::new_unchecked(match component {
        IndexComponent::Subject => "subject",
        IndexComponent::Predicate => "predicate",
        IndexComponent::Object => "object",
        IndexComponent::Graph => "meta",
    })
}

/// Returns the rows of `rows` whose leading positions equal `key`.
pub(crate) fn equal_range(rows: &IndexRows, key: &[NodeId]) -> Range<usize> {
    let length = key.len();
    let start = rows.partition_point(|row| &row.0[..length] < key);
    let end = rows.partition_point(|row| &row.0[..length] <= key);
    start..end
}

/// All statements of a snapshot, read in the order of one index.
///
/// The relation has four columns, named `subject`, `predicate`, `object` and `meta`, that appear
/// in the order of the index. A prefix seek is a binary search.
#[derive(Debug)]
pub struct StoreTuples {
    components: IndexComponents,
    variables: Arc<[Variable]>,
    rows: IndexRows,
    comparator: RowComparator,
    /// [None] until the cursor is positioned.
    range: Option<Range<usize>>,
    current: Option<usize>,
}

impl StoreTuples {
    /// Creates a new [StoreTuples] over the `rows` of the index with the given `components`.
    pub fn new(components: IndexComponents, rows: IndexRows) -> Self {
        let variables = components
            .inner()
            .iter()
            .map(|component| component_variable(*component))
            .collect();
        Self {
            components,
            variables,
            rows,
            comparator: RowComparator::natural(4),
            range: None,
            current: None,
        }
    }

    pub fn components(&self) -> IndexComponents {
        self.components
    }
}

impl Tuples for StoreTuples {
    fn name(&self) -> &'static str {
        "StoreTuples"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn before_first(&mut self, prefix: &[NodeId], _suffix_truncation: usize) -> TuplesResult<()> {
        check_prefix(prefix, self.variables.len())?;
        self.range = Some(equal_range(&self.rows, prefix));
        self.current = None;
        Ok(())
    }

    fn next(&mut self) -> TuplesResult<bool> {
        let range = self.range.as_mut().ok_or(TuplesError::NotPositioned)?;
        self.current = range.next();
        Ok(self.current.is_some())
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
        let current = self.current.ok_or(TuplesError::NoCurrentRow)?;
        check_column(column, self.variables.len())?;
        Ok(self.rows[current].0[column])
    }

    fn row_count(&self) -> TuplesResult<u64> {
        Ok(self.rows.len() as u64)
    }

    fn row_upper_bound(&self) -> TuplesResult<u64> {
        self.row_count()
    }

    fn is_column_ever_unbound(&self, column: usize) -> TuplesResult<bool> {
        check_column(column, self.variables.len())?;
        Ok(false)
    }

    fn has_no_duplicates(&self) -> TuplesResult<bool> {
        Ok(true)
    }

    fn comparator(&self) -> Option<&RowComparator> {
        Some(&self.comparator)
    }

    fn is_materialized(&self) -> bool {
        true
    }

    fn operands(&self) -> Vec<&dyn Tuples> {
        Vec::new()
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            components: self.components,
            variables: Arc::clone(&self.variables),
            rows: Arc::clone(&self.rows),
            comparator: self.comparator.clone(),
            range: self.range.clone(),
            current: self.current,
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        Ok(())
    }
}
