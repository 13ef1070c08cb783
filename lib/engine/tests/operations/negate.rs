use crate::test_utils::{literal, rows_by, var, variable_names};
use rdf_tuples_engine::TuplesOperations;
use rdf_tuples_model::{Constraint, TuplesError, TuplesResult};
use rdf_tuples_storage::MemStatementStore;

fn store() -> TuplesResult<MemStatementStore> {
    let mut store = MemStatementStore::new();
    store.insert([
        [1, 2, 3, 9],
        [1, 2, 4, 9],
        [1, 2, 5, 9],
        [1, 3, 4, 9],
        [2, 2, 3, 9],
    ])?;
    Ok(store)
}

#[test]
fn negate_fixed_subject_and_predicate() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let store = store()?;

    let constraint = Constraint::new(1, 2, var("o"), var("g"));
    let mut negation = operations.negate(&constraint, &store)?;

    assert_eq!(
        variable_names(negation.as_ref()),
        ["subject", "predicate", "o", "g"]
    );
    assert_eq!(negation.row_count()?, 2);
    assert_eq!(
        rows_by(negation.as_mut(), &["subject", "predicate", "o"])?,
        vec![vec![1, 3, 4], vec![2, 2, 3]]
    );
    Ok(())
}

#[test]
fn negate_fixed_object() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let store = store()?;

    let mut negation = operations.negate(&Constraint::new(var("s"), var("p"), 4, 9), &store)?;
    assert_eq!(
        rows_by(negation.as_mut(), &["s", "p"])?,
        vec![vec![1, 2], vec![1, 2], vec![2, 2]]
    );
    Ok(())
}

#[test]
fn negate_absent_statement_is_unconstrained() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let store = store()?;

    let absent = operations.negate(&Constraint::new(1, 2, 7, var("g")), &store)?;
    assert!(absent.is_unconstrained()?);
    assert_eq!(absent.row_count()?, 5);

    let present = operations.negate(&Constraint::new(1, 2, 3, var("g")), &store)?;
    assert!(!present.is_unconstrained()?);
    assert_eq!(present.row_count()?, 4);
    Ok(())
}

#[test]
fn join_keeps_columns_of_absent_statement_negation() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let store = store()?;

    let absent = operations.negate(&Constraint::new(1, 2, 7, var("g")), &store)?;
    let numbers = literal(&["x"], &[&[10], &[11]])?;
    let mut join = operations.join(vec![absent, numbers])?;

    let mut names = variable_names(join.as_ref());
    names.sort_unstable();
    assert_eq!(names, ["g", "object", "predicate", "subject", "x"]);
    assert_eq!(join.row_count()?, 10);
    assert_eq!(
        rows_by(join.as_mut(), &["subject", "object", "x"])?[..4],
        [vec![1, 3, 10], vec![1, 3, 11], vec![1, 4, 10], vec![1, 4, 10]]
    );
    Ok(())
}

#[test]
fn project_absent_statement_negation_keeps_rows() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let store = store()?;

    let absent = operations.negate(&Constraint::new(1, 2, 7, var("g")), &store)?;
    let mut subjects = operations.project(absent, vec![var("subject")])?;

    assert!(!subjects.is_unconstrained()?);
    assert_eq!(rows_by(subjects.as_mut(), &["subject"])?, vec![vec![1], vec![2]]);
    Ok(())
}

#[test]
fn negate_rejects_variable_named_like_another_column() -> TuplesResult<()> {
    let operations = TuplesOperations::default();
    let store = store()?;

    let clashing = operations.negate(&Constraint::new(var("object"), 2, 7, 9), &store);
    assert!(matches!(clashing, Err(TuplesError::InvalidArgument(_))));

    let matching = operations.negate(&Constraint::new(1, 2, var("object"), var("g")), &store)?;
    assert_eq!(
        variable_names(matching.as_ref()),
        ["subject", "predicate", "object", "g"]
    );
    Ok(())
}
