use crate::test_utils::{literal, rows_by, variable_names};
use rdf_tuples_engine::TuplesOperations;
use rdf_tuples_engine::explain::format_tuples_tree;
use rdf_tuples_model::TuplesResult;

#[test]
fn append_aligns_heterogeneous_operands() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let lhs = literal(&["x", "y"], &[&[1, 2], &[1, 3], &[4, 1]])?;
    let rhs = literal(&["y", "x"], &[&[5, 1], &[6, 1], &[1, 7]])?;

    let mut union = operations.append(vec![lhs, rhs])?;
    assert_eq!(variable_names(union.as_ref()), ["x", "y"]);
    insta::assert_snapshot!(format_tuples_tree(union.as_ref()), @r"
    OrderedAppend[~6] {?x ?y}
      SortedTuples[=3] {?x ?y}
      SortedTuples[=3] {?x ?y}
    ");
    assert_eq!(
        rows_by(union.as_mut(), &["x", "y"])?,
        vec![
            vec![1, 2],
            vec![1, 3],
            vec![1, 5],
            vec![1, 6],
            vec![4, 1],
            vec![7, 1]
        ]
    );
    Ok(())
}

#[test]
fn append_concatenates_compatible_operands() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let lhs = literal(&["x"], &[&[1], &[2]])?;
    let rhs = literal(&["x"], &[&[2], &[3]])?;

    let mut union = operations.append(vec![lhs, rhs])?;
    assert_eq!(union.name(), "UnorderedAppend");
    assert_eq!(
        rows_by(union.as_mut(), &["x"])?,
        vec![vec![1], vec![2], vec![2], vec![3]]
    );
    Ok(())
}

#[test]
fn append_with_empty_operand_is_identity() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let tuples = literal(&["x", "y"], &[&[1, 2], &[3, 4]])?;

    let mut union = operations.append(vec![tuples, operations.empty()])?;
    assert_eq!(union.name(), "LiteralTuples");
    assert_eq!(
        rows_by(union.as_mut(), &["x", "y"])?,
        vec![vec![1, 2], vec![3, 4]]
    );
    Ok(())
}

#[test]
fn append_with_unconstrained_operand_is_unconstrained() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let tuples = literal(&["x"], &[&[1], &[2]])?;

    let union = operations.append(vec![tuples, operations.unconstrained()])?;
    assert!(union.is_unconstrained()?);
    Ok(())
}

#[test]
fn append_without_rows_keeps_variables() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let lhs = literal(&["x"], &[])?;
    let rhs = literal(&["y"], &[])?;

    let union = operations.append(vec![lhs, rhs])?;
    assert_eq!(variable_names(union.as_ref()), ["x", "y"]);
    assert_eq!(union.row_count()?, 0);

    let nothing = operations.append(Vec::new())?;
    assert_eq!(nothing.number_of_variables(), 0);
    assert!(!nothing.is_unconstrained()?);
    Ok(())
}
