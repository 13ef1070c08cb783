use crate::index::IndexComponents;
use rdf_tuples_model::{NodeId, StorageError};
use std::sync::Arc;

/// A statement in subject, predicate, object, graph order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EncodedStatement(pub [NodeId; 4]);

impl EncodedStatement {
    /// Creates a new [EncodedStatement].
    ///
    /// Returns an error if a node is not a valid node identifier.
    pub fn try_new(nodes: [NodeId; 4]) -> Result<Self, StorageError> {
        if let Some(invalid) = nodes.iter().find(|node| **node <= 0) {
            return Err(StorageError::InvalidNode(*invalid));
        }
        Ok(Self(nodes))
    }

    /// Reorders the nodes for an index with the given `components`.
    pub fn for_index(&self, components: IndexComponents) -> IndexStatement {
        IndexStatement(components.statement_positions().map(|position| self.0[position]))
    }
}

/// A statement that is sorted for some index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexStatement(pub [NodeId; 4]);

/// The sorted statements of one index.
pub type IndexRows = Arc<Vec<IndexStatement>>;

/// Represents a set of multiple indexes, each of which sorts the statements in a different order
/// (e.g., SPOG, POSG). Different statement patterns require different orders, so that their fixed
/// positions form a prefix.
///
/// The statements of each index are shared copy-on-write. Cloning an [IndexPermutations] is cheap
/// and yields a stable snapshot that later modifications of the original do not affect.
#[derive(Debug, Clone)]
pub struct IndexPermutations {
    indexes: Vec<(IndexComponents, IndexRows)>,
}

impl Default for IndexPermutations {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexPermutations {
    /// Creates a new [IndexPermutations] with an empty index for each of [IndexComponents::ALL].
    pub fn new() -> Self {
        Self {
            indexes: IndexComponents::ALL
                .iter()
                .map(|components| (*components, IndexRows::default()))
                .collect(),
        }
    }

    /// Finds the index with the given `components`.
    pub fn find_index(&self, components: IndexComponents) -> Option<&IndexRows> {
        self.indexes
            .iter()
            .find(|(candidate, _)| *candidate == components)
            .map(|(_, rows)| rows)
    }

    /// Chooses the index for a pattern whose `bound` statement positions are known.
    pub fn choose_index(&self, bound: [bool; 4]) -> (IndexComponents, &IndexRows) {
        let preferred = IndexComponents::for_bound_mask(bound);
        match self.find_index(preferred) {
            Some(rows) => (preferred, rows),
            None => {
                let (components, rows) = self.any_index();
                (*components, rows)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.any_index().1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts `statements`. Returns the number of statements that were not present before.
    pub fn insert(&mut self, statements: &[EncodedStatement]) -> usize {
        let mut count = 0;
        for (components, rows) in &mut self.indexes {
            let rows = Arc::make_mut(rows);
            count = 0;
            for statement in statements {
                let statement = statement.for_index(*components);
                if let Err(position) = rows.binary_search(&statement) {
                    rows.insert(position, statement);
                    count += 1;
                }
            }
        }
        count
    }

    /// Removes `statements`. Returns the number of statements that were present before.
    pub fn remove(&mut self, statements: &[EncodedStatement]) -> usize {
        let mut count = 0;
        for (components, rows) in &mut self.indexes {
            let rows = Arc::make_mut(rows);
            count = 0;
            for statement in statements {
                let statement = statement.for_index(*components);
                if let Ok(position) = rows.binary_search(&statement) {
                    rows.remove(position);
                    count += 1;
                }
            }
        }
        count
    }

    fn any_index(&self) -> &(IndexComponents, IndexRows) {
        &self.indexes[0]
    }
}
