use crate::test_utils::{literal, rows_by, var, variable_names};
use rdf_tuples_engine::explain::format_tuples_tree;
use rdf_tuples_engine::TuplesOperations;
use rdf_tuples_model::{TuplesResult, UNBOUND};
use rdf_tuples_physical::filter::{FilterExpr, FilterTerm};
use std::sync::Arc;

#[test]
fn optional_join_keeps_unmatched_rows() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let standard = literal(&["s"], &[&[1], &[2], &[3]])?;
    let optional = literal(&["o", "s"], &[&[7, 1], &[8, 1], &[9, 3]])?;

    let mut result = operations.optional_join(standard, optional, None)?;

    assert_eq!(variable_names(result.as_ref()), ["s", "o"]);
    insta::assert_snapshot!(format_tuples_tree(result.as_ref()), @r"
    LeftJoin[~9] {?s ?o}
      LiteralTuples[=3] {?s}
      SortedTuples[=3] {?s ?o}
    ");
    assert_eq!(
        rows_by(result.as_mut(), &["s", "o"])?,
        vec![vec![1, 7], vec![1, 8], vec![2, UNBOUND], vec![3, 9]]
    );
    Ok(())
}

#[test]
fn optional_join_filter_rejects_matches() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let standard = literal(&["s"], &[&[1], &[2]])?;
    let optional = literal(&["s", "o"], &[&[1, 7], &[1, 8], &[2, 9]])?;
    let filter = FilterExpr::SameTerm(FilterTerm::Variable(var("o")), FilterTerm::Node(8));

    let mut result = operations.optional_join(standard, optional, Some(Arc::new(filter)))?;

    assert_eq!(
        rows_by(result.as_mut(), &["s", "o"])?,
        vec![vec![1, 8], vec![2, UNBOUND]]
    );
    Ok(())
}

#[test]
fn optional_join_without_new_variables_returns_standard() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let standard = literal(&["s"], &[&[1], &[2]])?;
    let optional = literal(&["s"], &[&[1]])?;

    let mut result = operations.optional_join(standard, optional, None)?;

    assert_eq!(result.name(), "LiteralTuples");
    assert_eq!(rows_by(result.as_mut(), &["s"])?, vec![vec![1], vec![2]]);
    Ok(())
}

#[test]
fn optional_join_with_empty_optional_keeps_every_row() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let standard = literal(&["s"], &[&[1], &[2]])?;
    let optional = literal(&["s", "o"], &[])?;

    let mut result = operations.optional_join(standard, optional, None)?;

    assert_eq!(result.row_count()?, 2);
    assert_eq!(
        rows_by(result.as_mut(), &["s", "o"])?,
        vec![vec![1, UNBOUND], vec![2, UNBOUND]]
    );
    Ok(())
}
