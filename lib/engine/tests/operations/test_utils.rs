use rdf_tuples_common::{BoxedTuples, MandatoryBinding, RowComparator, Tuples};
use rdf_tuples_model::{NodeId, TuplesResult, Variable};
use rdf_tuples_physical::LiteralTuples;
use std::any::Any;

pub fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

/// Creates an unsorted relation over the variables `names`.
pub fn literal(names: &[&str], rows: &[&[NodeId]]) -> TuplesResult<BoxedTuples> {
    let variables = names.iter().map(|name| var(name)).collect();
    let rows = rows.iter().map(|row| row.to_vec()).collect();
    Ok(Box::new(LiteralTuples::try_from_rows(variables, rows)?))
}

/// Reads every row of `tuples` with the columns in the order of `names`. The rows are sorted, so
/// that the result does not depend on the plan.
pub fn rows_by(tuples: &mut dyn Tuples, names: &[&str]) -> TuplesResult<Vec<Vec<NodeId>>> {
    let columns = names
        .iter()
        .map(|name| tuples.column_index(&var(name)))
        .collect::<TuplesResult<Vec<_>>>()?;

    let mut rows = Vec::new();
    tuples.rewind()?;
    while tuples.next()? {
        rows.push(
            columns
                .iter()
                .map(|column| tuples.column_value(*column))
                .collect::<TuplesResult<Vec<_>>>()?,
        );
    }
    rows.sort();
    Ok(rows)
}

pub fn variable_names(tuples: &dyn Tuples) -> Vec<&str> {
    tuples.variables().iter().map(Variable::as_str).collect()
}

/// Wraps a relation that can only be joined once `required` is bound.
#[derive(Debug)]
pub struct RequiresBinding {
    inner: BoxedTuples,
    required: Vec<Variable>,
}

impl RequiresBinding {
    pub fn new(inner: BoxedTuples, required: &[&str]) -> BoxedTuples {
        Box::new(Self {
            inner,
            required: required.iter().map(|name| var(name)).collect(),
        })
    }
}

impl MandatoryBinding for RequiresBinding {
    fn required_variables(&self) -> &[Variable] {
        &self.required
    }
}

impl Tuples for RequiresBinding {
    fn name(&self) -> &'static str {
        "RequiresBinding"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn variables(&self) -> &[Variable] {
        self.inner.variables()
    }

    fn before_first(&mut self, prefix: &[NodeId], suffix_truncation: usize) -> TuplesResult<()> {
        self.inner.before_first(prefix, suffix_truncation)
    }

    fn next(&mut self) -> TuplesResult<bool> {
        self.inner.next()
    }

    fn column_value(&self, column: usize) -> TuplesResult<NodeId> {
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
        Vec::new()
    }

    fn duplicate(&self) -> BoxedTuples {
        Box::new(Self {
            inner: self.inner.duplicate(),
            required: self.required.clone(),
        })
    }

    fn close(&mut self) -> TuplesResult<()> {
        self.inner.close()
    }

    fn mandatory_binding(&self) -> Option<&dyn MandatoryBinding> {
        Some(self)
    }
}
