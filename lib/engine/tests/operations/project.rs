use crate::test_utils::{literal, rows_by, var, variable_names};
use rdf_tuples_engine::{DistinctStrategy, TuplesConfig, TuplesOperations};
use rdf_tuples_model::{TuplesResult, UNBOUND};
use rdf_tuples_physical::filter::{FilterExpr, FilterTerm};
use std::sync::Arc;

fn tuples() -> TuplesResult<rdf_tuples_common::BoxedTuples> {
    literal(&["x", "y"], &[&[2, 2], &[1, 2], &[1, 3], &[2, 2]])
}

#[test]
fn projection_removes_duplicates() -> TuplesResult<()> {
    let operations = TuplesOperations::default();

    let mut projection = operations.project(tuples()?, vec![var("x")])?;
    assert!(projection.has_no_duplicates()?);
    assert_eq!(rows_by(projection.as_mut(), &["x"])?, vec![vec![1], vec![2]]);

    let mut again = operations.project(projection, vec![var("x")])?;
    assert_eq!(rows_by(again.as_mut(), &["x"])?, vec![vec![1], vec![2]]);
    Ok(())
}

#[test]
fn projection_with_hash_distinct() -> TuplesResult<()> {
    let config = TuplesConfig::default().with_distinct_strategy(DistinctStrategy::Hash);
    let operations = TuplesOperations::new(config);

    let mut projection = operations.project(tuples()?, vec![var("y"), var("x")])?;
    assert_eq!(projection.name(), "HashDistinctTuples");
    assert_eq!(
        rows_by(projection.as_mut(), &["y", "x"])?,
        vec![vec![2, 1], vec![2, 2], vec![3, 1]]
    );
    Ok(())
}

#[test]
fn projection_of_missing_variable_is_unbound() -> TuplesResult<()> {
    let operations = TuplesOperations::default();

    let mut projection = operations.project(tuples()?, vec![var("x"), var("z")])?;
    assert_eq!(variable_names(projection.as_ref()), ["x", "z"]);
    assert!(projection.is_column_ever_unbound(1)?);
    assert_eq!(
        rows_by(projection.as_mut(), &["x", "z"])?,
        vec![vec![1, UNBOUND], vec![2, UNBOUND]]
    );
    Ok(())
}

#[test]
fn projection_without_variables_is_unconstrained() -> TuplesResult<()> {
    let operations = TuplesOperations::default();

    let projection = operations.project(tuples()?, Vec::new())?;
    assert!(projection.is_unconstrained()?);

    let empty = operations.project(literal(&["x"], &[])?, vec![var("x")])?;
    assert_eq!(empty.row_count()?, 0);
    Ok(())
}

#[test]
fn re_sort_moves_variables_to_the_front() -> TuplesResult<()> {
    let operations = TuplesOperations::default();

    let mut sorted = operations.re_sort(tuples()?, &[var("y")])?;
    assert_eq!(variable_names(sorted.as_ref()), ["y", "x"]);
    sorted.before_first(&[2], 0)?;
    let mut rows = Vec::new();
    while sorted.next()? {
        rows.push(sorted.column_value(1)?);
    }
    assert_eq!(rows, vec![1, 2, 2]);
    Ok(())
}

#[test]
fn filter_offset_and_limit() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let filter = FilterExpr::In(FilterTerm::Variable(var("x")), vec![2]);

    let filtered = operations.filter(tuples()?, Arc::new(filter));
    assert_eq!(filtered.row_count()?, 2);

    let sorted = operations.sort(tuples()?)?;
    let mut page = operations.limit(operations.offset(sorted, 1), 2);
    let mut rows = Vec::new();
    page.rewind()?;
    while page.next()? {
        rows.push([page.column_value(0)?, page.column_value(1)?]);
    }
    assert_eq!(rows, vec![[1, 3], [2, 2]]);
    Ok(())
}
