use crate::index::{EncodedStatement, IndexPermutations};
use crate::memory::store_tuples::{equal_range, StoreTuples};
use crate::memory::StatementResolution;
use rdf_tuples_common::{BoxedTuples, StatementStore};
use rdf_tuples_model::{Constraint, NodeId, StorageError, TuplesResult};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Counts the modifications of a [MemStatementStore].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionNumber(u64);

impl VersionNumber {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for VersionNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// An in-memory statement store that keeps one sorted index per permutation.
///
/// Relations handed out by the store read a snapshot of the indexes. Modifying the store afterward
/// copies the affected indexes, so existing relations are never invalidated.
#[derive(Debug, Default)]
pub struct MemStatementStore {
    permutations: IndexPermutations,
    version: VersionNumber,
}

impl MemStatementStore {
    /// Creates a new empty [MemStatementStore].
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts statements given in subject, predicate, object, graph order.
    ///
    /// Returns the number of statements that were not present before. Nothing is inserted if one
    /// of the statements contains an invalid node.
    pub fn insert(
        &mut self,
        statements: impl IntoIterator<Item = [NodeId; 4]>,
    ) -> Result<usize, StorageError> {
        let statements = encode(statements)?;
        let count = self.permutations.insert(&statements);
        if count > 0 {
            self.version = self.version.next();
        }
        tracing::debug!("Inserted {count} statements, store is at {}", self.version);
        Ok(count)
    }

    /// Removes statements given in subject, predicate, object, graph order.
    ///
    /// Returns the number of statements that were present before.
    pub fn remove(
        &mut self,
        statements: impl IntoIterator<Item = [NodeId; 4]>,
    ) -> Result<usize, StorageError> {
        let statements = encode(statements)?;
        let count = self.permutations.remove(&statements);
        if count > 0 {
            self.version = self.version.next();
        }
        tracing::debug!("Removed {count} statements, store is at {}", self.version);
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.permutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permutations.is_empty()
    }

    pub fn version(&self) -> VersionNumber {
        self.version
    }

    /// Returns a stable view of the current statements.
    pub fn snapshot(&self) -> IndexPermutations {
        self.permutations.clone()
    }

    /// Resolves `constraint` against the current statements.
    pub fn resolve(&self, constraint: &Constraint) -> StatementResolution {
        StatementResolution::new(constraint.clone(), self.snapshot())
    }
}

fn encode(
    statements: impl IntoIterator<Item = [NodeId; 4]>,
) -> Result<Vec<EncodedStatement>, StorageError> {
    statements
        .into_iter()
        .map(EncodedStatement::try_new)
        .collect()
}

impl StatementStore for MemStatementStore {
    fn find_tuples(&self, bound: [bool; 4]) -> TuplesResult<BoxedTuples> {
        let (components, rows) = self.permutations.choose_index(bound);
        Ok(Box::new(StoreTuples::new(components, Arc::clone(rows))))
    }

    fn column_order(&self, bound: [bool; 4]) -> [usize; 4] {
        self.permutations.choose_index(bound).0.statement_positions()
    }

    fn exists(&self, pattern: [Option<NodeId>; 4]) -> TuplesResult<bool> {
        let (components, rows) = self.permutations.choose_index(pattern.map(|node| node.is_some()));
        let positions = components.statement_positions();
        let key: Vec<NodeId> = positions
            .iter()
            .map_while(|position| pattern[*position])
            .collect();
        let found = rows[equal_range(rows, &key)].iter().any(|row| {
            positions
                .iter()
                .zip(row.0)
                .all(|(position, value)| pattern[*position].map_or(true, |node| node == value))
        });
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_tuples_common::collect_rows;

    #[test]
    fn version_advances_on_modification() -> Result<(), StorageError> {
        let mut store = MemStatementStore::new();
        assert_eq!(store.insert([[1, 2, 3, 4]])?, 1);
        assert_eq!(store.insert([[1, 2, 3, 4]])?, 0);
        assert_eq!(store.version().to_string(), "v1");

        assert_eq!(store.remove([[1, 2, 3, 4]])?, 1);
        assert!(store.is_empty());
        assert_eq!(store.version().to_string(), "v2");
        Ok(())
    }

    #[test]
    fn invalid_statements_are_not_inserted() {
        let mut store = MemStatementStore::new();
        let result = store.insert([[1, 2, 3, 4], [1, -2, 3, 4]]);
        assert!(matches!(result, Err(StorageError::InvalidNode(-2))));
        assert!(store.is_empty());
    }

    #[test]
    fn exists_checks_patterns() -> TuplesResult<()> {
        let mut store = MemStatementStore::new();
        store.insert([[1, 2, 3, 4], [5, 2, 6, 4]])?;

        assert!(store.exists([Some(5), None, Some(6), None])?);
        assert!(store.exists([None, None, None, None])?);
        assert!(!store.exists([Some(1), None, Some(6), None])?);
        Ok(())
    }

    #[test]
    fn find_tuples_matches_column_order() -> TuplesResult<()> {
        let mut store = MemStatementStore::new();
        store.insert([[1, 2, 3, 4]])?;

        let bound = [false, false, true, false];
        let mut tuples = store.find_tuples(bound)?;
        assert_eq!(store.column_order(bound), [2, 0, 1, 3]);
        assert_eq!(collect_rows(tuples.as_mut())?, vec![vec![3, 1, 2, 4]]);
        Ok(())
    }
}
