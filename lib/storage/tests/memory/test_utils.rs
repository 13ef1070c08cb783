use rdf_tuples_model::{TuplesResult, Variable};
use rdf_tuples_storage::MemStatementStore;

/// A store with a small family graph in two graphs.
///
/// Nodes: 1 = alice, 2 = bob, 3 = carol, 10 = knows, 11 = likes, 20 = graph a, 21 = graph b.
pub fn family_store() -> TuplesResult<MemStatementStore> {
    let mut store = MemStatementStore::new();
    store.insert([
        [1, 10, 2, 20],
        [1, 10, 3, 20],
        [2, 10, 3, 20],
        [2, 11, 1, 21],
        [3, 11, 3, 21],
    ])?;
    Ok(store)
}

pub fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}
