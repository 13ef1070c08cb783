use crate::test_utils::{literal, rows_by};
use rdf_tuples_engine::TuplesOperations;
use rdf_tuples_model::{TuplesError, TuplesResult};

fn minuend() -> TuplesResult<rdf_tuples_common::BoxedTuples> {
    literal(&["x", "y"], &[&[1, 2], &[1, 3], &[2, 5], &[3, 3]])
}

#[test]
fn subtract_removes_matching_rows() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let subtrahend = literal(&["x"], &[&[3], &[1]])?;

    let mut difference = operations.subtract(minuend()?, subtrahend)?;
    assert_eq!(difference.name(), "Difference");
    assert!(difference.row_count()? <= minuend()?.row_count()?);
    assert_eq!(rows_by(difference.as_mut(), &["x", "y"])?, vec![vec![2, 5]]);
    Ok(())
}

#[test]
fn subtract_projects_additional_variables() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let subtrahend = literal(&["z", "y"], &[&[9, 3], &[8, 3], &[7, 4]])?;

    let mut difference = operations.subtract(minuend()?, subtrahend)?;
    assert_eq!(
        rows_by(difference.as_mut(), &["x", "y"])?,
        vec![vec![1, 2], vec![2, 5]]
    );
    Ok(())
}

#[test]
fn subtract_with_reordered_variables() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let subtrahend = literal(&["y", "x"], &[&[3, 1], &[5, 2]])?;

    let mut difference = operations.subtract(minuend()?, subtrahend)?;
    assert_eq!(
        rows_by(difference.as_mut(), &["x", "y"])?,
        vec![vec![1, 2], vec![3, 3]]
    );
    Ok(())
}

#[test]
fn subtract_without_common_variables_fails() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let subtrahend = literal(&["z"], &[&[1]])?;

    let result = operations.subtract(minuend()?, subtrahend);
    assert!(matches!(result, Err(TuplesError::NoCommonVariables)));

    let unconstrained = operations.subtract(minuend()?, operations.unconstrained())?;
    assert_eq!(unconstrained.row_count()?, 4);
    Ok(())
}

#[test]
fn subtract_empty_relation_returns_minuend() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let subtrahend = literal(&["x"], &[])?;

    let difference = operations.subtract(minuend()?, subtrahend)?;
    assert_eq!(difference.name(), "LiteralTuples");
    assert_eq!(difference.row_count()?, 4);
    Ok(())
}
