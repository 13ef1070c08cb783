use crate::test_utils::{family_store, var};
use rdf_tuples_common::{collect_rows, Tuples};
use rdf_tuples_model::{Bindings, Cardinality, Constraint, TuplesResult};

#[test]
fn resolve_pattern_with_fixed_predicate() -> TuplesResult<()> {
    let store = family_store()?;
    let mut resolution = store.resolve(&Constraint::new(var("s"), 10, var("o"), var("g")));

    assert_eq!(resolution.variables(), &[var("o"), var("s"), var("g")]);
    assert_eq!(resolution.row_upper_bound()?, 3);
    insta::assert_debug_snapshot!(collect_rows(&mut resolution)?, @r"
    [
        [
            2,
            1,
            20,
        ],
        [
            3,
            1,
            20,
        ],
        [
            3,
            2,
            20,
        ],
    ]
    ");
    Ok(())
}

#[test]
fn resolve_fully_fixed_pattern() -> TuplesResult<()> {
    let store = family_store()?;
    let present = store.resolve(&Constraint::new(2, 11, 1, 21));
    let absent = store.resolve(&Constraint::new(2, 11, 3, 21));

    assert!(present.is_unconstrained()?);
    assert_eq!(present.row_cardinality()?, Cardinality::One);
    assert_eq!(absent.row_cardinality()?, Cardinality::Zero);
    Ok(())
}

#[test]
fn resolutions_do_not_see_later_modifications() -> TuplesResult<()> {
    let mut store = family_store()?;
    let resolution = store.resolve(&Constraint::new(var("s"), 11, var("o"), 21));
    store.insert([[1, 11, 1, 21]])?;

    assert_eq!(resolution.row_count()?, 2);
    assert_eq!(
        store
            .resolve(&Constraint::new(var("s"), 11, var("o"), 21))
            .row_count()?,
        3
    );
    Ok(())
}

#[test]
fn reresolved_pattern_uses_bindings() -> TuplesResult<()> {
    let store = family_store()?;
    let resolution = store.resolve(&Constraint::new(var("s"), var("p"), var("o"), 20));
    let mut bindings = Bindings::default();
    bindings.insert(var("s"), 1);

    let mut reresolved = resolution
        .reresolvable()
        .expect("resolutions are reresolvable")
        .reresolve(&bindings)?
        .expect("the binding affects the pattern");
    assert_eq!(reresolved.variables(), &[var("p"), var("o")]);
    assert_eq!(
        collect_rows(reresolved.as_mut())?,
        vec![vec![10, 2], vec![10, 3]]
    );
    Ok(())
}
