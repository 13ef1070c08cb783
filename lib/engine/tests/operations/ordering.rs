use crate::test_utils::{literal, rows_by, RequiresBinding};
use rdf_tuples_engine::explain::format_tuples_tree;
use rdf_tuples_engine::TuplesOperations;
use rdf_tuples_model::{TuplesError, TuplesResult};

#[test]
fn mandatory_binding_waits_for_its_variables() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let lookup = RequiresBinding::new(literal(&["x", "y"], &[&[1, 5], &[3, 6]])?, &["x"]);
    let values = literal(&["x"], &[&[1], &[2], &[3]])?;

    let mut join = operations.join(vec![lookup, values])?;
    insta::assert_snapshot!(format_tuples_tree(join.as_ref()), @r"
    UnboundJoin[~6] {?x ?y}
      LiteralTuples[=3] {?x}
      RequiresBinding[~2] {?x ?y} :: MBA{?x}
    ");
    assert_eq!(
        rows_by(join.as_mut(), &["x", "y"])?,
        vec![vec![1, 5], vec![3, 6]]
    );
    Ok(())
}

#[test]
fn unmet_mandatory_binding_fails() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let lookup = RequiresBinding::new(literal(&["x", "y"], &[&[1, 5], &[3, 6]])?, &["x"]);
    let values = literal(&["z"], &[&[1], &[2]])?;

    let result = operations.join(vec![lookup, values]);
    match result {
        Err(TuplesError::UnsatisfiableOrdering(bound)) => assert_eq!(bound, "z"),
        other => panic!("Expected an ordering error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn smaller_operands_come_first() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let large = literal(&["x", "y"], &[&[1, 2], &[2, 3], &[3, 4], &[4, 5]])?;
    let small = literal(&["y"], &[&[2], &[4]])?;

    let join = operations.join(vec![large, small])?;
    let bounds = join
        .operands()
        .iter()
        .map(|operand| operand.row_upper_bound())
        .collect::<TuplesResult<Vec<_>>>()?;
    assert_eq!(bounds, vec![2, 4]);
    Ok(())
}
