use rustc_hash::FxHashSet;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Duplicate indexed component given.")]
pub struct IndexComponentsCreationError;

/// Represents what part of a statement is indexed at the given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexComponent {
    /// The subject
    Subject,
    /// The predicate
    Predicate,
    /// The object
    Object,
    /// The graph (meta node)
    Graph,
}

impl IndexComponent {
    /// Returns the position of the component in a statement in subject, predicate, object, graph
    /// order.
    pub fn statement_position(self) -> usize {
        match self {
            IndexComponent::Subject => 0,
            IndexComponent::Predicate => 1,
            IndexComponent::Object => 2,
            IndexComponent::Graph => 3,
        }
    }
}

impl Display for IndexComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexComponent::Subject => write!(f, "S"),
            IndexComponent::Predicate => write!(f, "P"),
            IndexComponent::Object => write!(f, "O"),
            IndexComponent::Graph => write!(f, "G"),
        }
    }
}

/// Represents a list of *disjunct* index components, i.e., the sort order of one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexComponents([IndexComponent; 4]);

impl IndexComponents {
    /// A SPOG index.
    pub const SPOG: IndexComponents = IndexComponents([
        IndexComponent::Subject,
        IndexComponent::Predicate,
        IndexComponent::Object,
        IndexComponent::Graph,
    ]);

    /// A POSG index.
    pub const POSG: IndexComponents = IndexComponents([
        IndexComponent::Predicate,
        IndexComponent::Object,
        IndexComponent::Subject,
        IndexComponent::Graph,
    ]);

    /// An OSPG index.
    pub const OSPG: IndexComponents = IndexComponents([
        IndexComponent::Object,
        IndexComponent::Subject,
        IndexComponent::Predicate,
        IndexComponent::Graph,
    ]);

    /// A GSPO index.
    pub const GSPO: IndexComponents = IndexComponents([
        IndexComponent::Graph,
        IndexComponent::Subject,
        IndexComponent::Predicate,
        IndexComponent::Object,
    ]);

    /// A GPOS index.
    pub const GPOS: IndexComponents = IndexComponents([
        IndexComponent::Graph,
        IndexComponent::Predicate,
        IndexComponent::Object,
        IndexComponent::Subject,
    ]);

    /// A GOSP index.
    pub const GOSP: IndexComponents = IndexComponents([
        IndexComponent::Graph,
        IndexComponent::Object,
        IndexComponent::Subject,
        IndexComponent::Predicate,
    ]);

    /// All indexes maintained by a store.
    pub const ALL: [IndexComponents; 6] = [
        Self::SPOG,
        Self::POSG,
        Self::OSPG,
        Self::GSPO,
        Self::GPOS,
        Self::GOSP,
    ];

    /// Tries to create a new [IndexComponents].
    ///
    /// Returns an error if an [IndexComponent] appears more than once.
    pub fn try_new(
        components: [IndexComponent; 4],
    ) -> Result<Self, IndexComponentsCreationError> {
        let distinct = components.iter().collect::<FxHashSet<_>>();
        if distinct.len() != components.len() {
            return Err(IndexComponentsCreationError);
        }

        Ok(IndexComponents(components))
    }

    /// Returns a reference to the inner array.
    pub fn inner(&self) -> &[IndexComponent; 4] {
        &self.0
    }

    /// Chooses the index whose leading components are exactly the `bound` statement positions.
    ///
    /// `bound` is given in subject, predicate, object, graph order.
    pub fn for_bound_mask(bound: [bool; 4]) -> Self {
        match bound {
            [false, true, _, false] => Self::POSG,
            [_, false, true, false] => Self::OSPG,
            [_, false, false, true] | [true, true, false, true] => Self::GSPO,
            [false, true, _, true] => Self::GPOS,
            [_, false, true, true] => Self::GOSP,
            _ => Self::SPOG,
        }
    }

    /// Returns, for each position of this index, the statement position it holds.
    pub fn statement_positions(&self) -> [usize; 4] {
        self.0.map(IndexComponent::statement_position)
    }

    /// Returns, for each statement position, the position of this index that holds it.
    pub fn index_positions(&self) -> [usize; 4] {
        let mut result = [0; 4];
        for (index_position, statement_position) in
            self.statement_positions().into_iter().enumerate()
        {
            result[statement_position] = index_position;
        }
        result
    }
}

impl Display for IndexComponents {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for component in &self.0 {
            write!(f, "{component}")?;
        }
        Ok(())
    }
}
