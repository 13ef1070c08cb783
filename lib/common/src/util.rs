use crate::{BoxedTuples, Tuples};
use rdf_tuples_model::{NodeId, TuplesError, TuplesResult};

/// Validates that a prefix fits a relation with `arity` columns.
pub fn check_prefix(prefix: &[NodeId], arity: usize) -> TuplesResult<()> {
    if prefix.len() > arity {
        return Err(TuplesError::InvalidPrefix {
            prefix_length: prefix.len(),
            arity,
        });
    }
    Ok(())
}

/// Validates that `column` exists in a relation with `arity` columns.
pub fn check_column(column: usize, arity: usize) -> TuplesResult<()> {
    if column >= arity {
        return Err(TuplesError::InvalidColumn { column, arity });
    }
    Ok(())
}

/// Reads all columns of the current row.
pub fn read_row(tuples: &dyn Tuples) -> TuplesResult<Vec<NodeId>> {
    (0..tuples.number_of_variables())
        .map(|column| tuples.column_value(column))
        .collect()
}

/// Rewinds `tuples` and reads all of its rows.
pub fn collect_rows(tuples: &mut dyn Tuples) -> TuplesResult<Vec<Vec<NodeId>>> {
    tuples.rewind()?;
    let mut rows = Vec::new();
    while tuples.next()? {
        rows.push(read_row(tuples)?);
    }
    Ok(rows)
}

/// Closes every operand, even if closing one of them fails.
///
/// The first failure is returned. Later failures are only logged.
pub fn close_all<'a>(operands: impl IntoIterator<Item = &'a mut BoxedTuples>) -> TuplesResult<()> {
    let mut first_error = None;
    for operand in operands {
        if let Err(error) = operand.close() {
            if first_error.is_none() {
                first_error = Some(error);
            } else {
                tracing::warn!(%error, "Suppressed a secondary failure while closing operands");
            }
        }
    }

    match first_error {
        None => Ok(()),
        Some(error) => Err(error),
    }
}
