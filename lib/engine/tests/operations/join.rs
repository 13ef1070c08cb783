use crate::test_utils::{literal, rows_by, var, variable_names};
use rdf_tuples_engine::explain::format_tuples_tree;
use rdf_tuples_common::BoxedTuples;
use rdf_tuples_engine::TuplesOperations;
use rdf_tuples_model::{Constraint, TuplesResult};
use rdf_tuples_storage::MemStatementStore;

#[test]
fn join_with_union() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let lhs = literal(&["x"], &[&[1], &[6]])?;
    let first = literal(&["x", "y"], &[&[1, 2], &[1, 3], &[4, 1]])?;
    let second = literal(&["y", "x"], &[&[5, 1], &[6, 1], &[1, 7]])?;

    let union = operations.append(vec![first, second])?;
    let mut join = operations.join(vec![lhs, union])?;

    assert_eq!(variable_names(join.as_ref()), ["x", "y"]);
    insta::assert_snapshot!(format_tuples_tree(join.as_ref()), @r"
    UnboundJoin[~12] {?x ?y}
      LiteralTuples[=2] {?x}
      OrderedAppend[~6] {?x ?y}
        SortedTuples[=3] {?x ?y}
        SortedTuples[=3] {?x ?y}
    ");
    assert_eq!(
        rows_by(join.as_mut(), &["x", "y"])?,
        vec![vec![1, 2], vec![1, 3], vec![1, 5], vec![1, 6]]
    );
    assert_eq!(join.row_count()?, 4);
    Ok(())
}

#[test]
fn join_result_does_not_depend_on_operand_order() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let operands = || -> TuplesResult<_> {
        Ok([
            literal(&["x", "y"], &[&[1, 2], &[2, 3], &[3, 3]])?,
            literal(&["y", "z"], &[&[3, 7], &[3, 8], &[2, 9], &[4, 1]])?,
            literal(&["z"], &[&[7], &[9], &[1]])?,
        ])
    };

    let [a, b, c] = operands()?;
    let mut forward = operations.join(vec![a, b, c])?;
    let [a, b, c] = operands()?;
    let mut backward = operations.join(vec![c, b, a])?;

    let expected = vec![vec![1, 2, 9], vec![2, 3, 7], vec![3, 3, 7]];
    assert_eq!(rows_by(forward.as_mut(), &["x", "y", "z"])?, expected);
    assert_eq!(rows_by(backward.as_mut(), &["x", "y", "z"])?, expected);
    Ok(())
}

#[test]
fn nested_joins_are_flattened() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let inner = operations.join(vec![
        literal(&["x", "y"], &[&[1, 2], &[2, 3]])?,
        literal(&["y", "z"], &[&[2, 5], &[3, 6], &[3, 7]])?,
    ])?;
    let outer = operations.join(vec![inner, literal(&["z"], &[&[5], &[7]])?])?;

    assert_eq!(outer.operands().len(), 3);
    Ok(())
}

#[test]
fn single_row_operands_become_bindings() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let tuples = literal(&["x", "y"], &[&[1, 2], &[1, 3], &[4, 5]])?;
    let assignment = operations.assign(var("x"), 1)?;

    let mut join = operations.join(vec![tuples, assignment])?;
    assert_eq!(
        rows_by(join.as_mut(), &["x", "y"])?,
        vec![vec![1, 2], vec![1, 3]]
    );
    Ok(())
}

#[test]
fn conflicting_bindings_yield_empty_join() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let join = operations.join(vec![
        operations.assign(var("x"), 1)?,
        operations.assign(var("x"), 2)?,
        literal(&["x", "y"], &[&[1, 2], &[2, 3]])?,
    ])?;

    assert_eq!(join.row_count()?, 0);
    assert_eq!(variable_names(join.as_ref()), ["x", "y"]);
    Ok(())
}

#[test]
fn join_with_empty_operand_is_empty() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let join = operations.join(vec![
        literal(&["x", "y"], &[&[1, 2], &[2, 3]])?,
        literal(&["y"], &[])?,
    ])?;

    assert_eq!(join.row_count()?, 0);
    Ok(())
}

#[test]
fn join_of_unconstrained_operands_is_unconstrained() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let join = operations.join(vec![
        operations.unconstrained(),
        operations.unconstrained(),
    ])?;
    assert!(join.is_unconstrained()?);

    let tuples = literal(&["x"], &[&[1], &[2]])?;
    let join = operations.join(vec![operations.unconstrained(), tuples])?;
    assert_eq!(join.row_count()?, 2);
    Ok(())
}

#[test]
fn bindings_reresolve_statement_patterns() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let mut store = MemStatementStore::new();
    store.insert([[1, 10, 2, 20], [1, 10, 3, 20], [4, 10, 3, 20], [4, 11, 1, 20]])?;

    let constraint = Constraint::new(var("s"), 10, var("o"), 20);
    let pattern: BoxedTuples = Box::new(store.resolve(&constraint));
    let mut join = operations.join(vec![pattern, operations.assign(var("s"), 1)?])?;

    insta::assert_snapshot!(format_tuples_tree(join.as_ref()), @r"
    UnboundJoin[~2] {?s ?o}
      LiteralTuples[=1] {?s}
      StatementResolution[=2] {?o}
    ");
    assert_eq!(
        rows_by(join.as_mut(), &["s", "o"])?,
        vec![vec![1, 2], vec![1, 3]]
    );
    Ok(())
}

#[test]
fn reresolved_single_rows_fold_into_bindings() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let mut store = MemStatementStore::new();
    store.insert([[1, 10, 2, 20], [4, 11, 1, 20], [5, 11, 2, 20]])?;

    let constraint = Constraint::new(var("s"), 11, var("o"), 20);
    let pattern: BoxedTuples = Box::new(store.resolve(&constraint));
    let mut join = operations.join(vec![pattern, operations.assign(var("o"), 1)?])?;

    assert_eq!(join.name(), "LiteralTuples");
    assert_eq!(rows_by(join.as_mut(), &["s", "o"])?, vec![vec![4, 1]]);
    Ok(())
}
