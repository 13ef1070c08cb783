use crate::{LiteralTuples, SortedTuples};
use rdf_tuples_common::{collect_rows, BoxedTuples, RowComparator, Tuples};
use rdf_tuples_model::{NodeId, TuplesResult, Variable};

pub(crate) fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

pub(crate) fn vars(names: &[&str]) -> Vec<Variable> {
    names.iter().map(|name| var(name)).collect()
}

pub(crate) fn literal(names: &[&str], rows: &[&[NodeId]]) -> TuplesResult<BoxedTuples> {
    let rows = rows.iter().map(|row| row.to_vec()).collect();
    Ok(Box::new(LiteralTuples::try_from_rows(vars(names), rows)?))
}

pub(crate) fn sorted(names: &[&str], rows: &[&[NodeId]]) -> TuplesResult<BoxedTuples> {
    let rows = rows.iter().map(|row| row.to_vec()).collect();
    Ok(Box::new(SortedTuples::from_rows(
        vars(names),
        rows,
        RowComparator::natural(names.len()),
    )))
}

pub(crate) fn rows_of(tuples: &mut dyn Tuples) -> TuplesResult<Vec<Vec<NodeId>>> {
    collect_rows(tuples)
}

pub(crate) fn sorted_rows_of(tuples: &mut dyn Tuples) -> TuplesResult<Vec<Vec<NodeId>>> {
    let mut rows = collect_rows(tuples)?;
    rows.sort();
    Ok(rows)
}

/// Advances `tuples` by `steps` rows and duplicates it. Checks that the duplicate starts on the
/// same row and then iterates the same remaining rows, independently of the original, which is
/// drained and closed first.
pub(crate) fn assert_duplicate_continues(
    tuples: &mut dyn Tuples,
    steps: usize,
) -> TuplesResult<()> {
    tuples.rewind()?;
    for _ in 0..steps {
        assert!(tuples.next()?);
    }
    let mut copy = tuples.duplicate();
    if steps > 0 {
        assert_eq!(current_row(copy.as_ref())?, current_row(tuples)?);
    }

    let original_rest = remaining_rows(tuples)?;
    tuples.close()?;
    let copy_rest = remaining_rows(copy.as_mut())?;
    copy.close()?;

    assert!(!original_rest.is_empty());
    assert_eq!(copy_rest, original_rest);
    Ok(())
}

fn current_row(tuples: &dyn Tuples) -> TuplesResult<Vec<NodeId>> {
    (0..tuples.number_of_variables())
        .map(|column| tuples.column_value(column))
        .collect()
}

fn remaining_rows(tuples: &mut dyn Tuples) -> TuplesResult<Vec<Vec<NodeId>>> {
    let mut rows = Vec::new();
    while tuples.next()? {
        rows.push(current_row(tuples)?);
    }
    Ok(rows)
}
