use crate::test_utils::family_store;
use rdf_tuples_common::{collect_rows, StatementStore};
use rdf_tuples_model::TuplesResult;

#[test]
fn find_tuples_for_bound_predicate() -> TuplesResult<()> {
    let store = family_store()?;
    let bound = [false, true, false, false];
    let mut tuples = store.find_tuples(bound)?;

    assert_eq!(store.column_order(bound), [1, 2, 0, 3]);
    insta::assert_debug_snapshot!(collect_rows(tuples.as_mut())?, @r"
    [
        [
            10,
            2,
            1,
            20,
        ],
        [
            10,
            3,
            1,
            20,
        ],
        [
            10,
            3,
            2,
            20,
        ],
        [
            11,
            1,
            2,
            21,
        ],
        [
            11,
            3,
            3,
            21,
        ],
    ]
    ");
    Ok(())
}

#[test]
fn store_tuples_seek_by_prefix() -> TuplesResult<()> {
    let store = family_store()?;
    let mut tuples = store.find_tuples([false, false, false, true])?;

    tuples.before_first(&[21], 0)?;
    let mut count = 0;
    while tuples.next()? {
        assert_eq!(tuples.column_value(0)?, 21);
        count += 1;
    }
    assert_eq!(count, 2);
    assert!(tuples.has_no_duplicates()?);
    Ok(())
}

#[test]
fn snapshots_ignore_later_modifications() -> TuplesResult<()> {
    let mut store = family_store()?;
    let mut tuples = store.find_tuples([false; 4])?;
    store.remove([[1, 10, 2, 20]])?;
    store.insert([[3, 10, 1, 20]])?;

    assert_eq!(collect_rows(tuples.as_mut())?.len(), 5);
    assert_eq!(collect_rows(store.find_tuples([false; 4])?.as_mut())?.len(), 5);
    assert!(!store.exists([Some(1), Some(10), Some(2), None])?);
    assert!(store.exists([Some(3), Some(10), Some(1), None])?);
    Ok(())
}
