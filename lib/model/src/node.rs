use oxrdf::Variable;
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter};

/// The identifier of an RDF node as handed out by the node pool.
///
/// The algebra never looks at lexical forms. Two rows bind the same node if and only if their
/// identifiers are equal.
pub type NodeId = i64;

/// Marks a column that carries no value in the current row.
///
/// This is the only sentinel that may appear in a row. Positions of a constraint that are not
/// constrained at all are modelled with [Option::None] instead.
pub const UNBOUND: NodeId = 0;

/// Variable bindings that are known to hold for every row of a join.
pub type Bindings = FxHashMap<Variable, NodeId>;

/// A coarse classification of the number of rows in a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cardinality {
    /// The relation has no rows.
    Zero,
    /// The relation has exactly one row.
    One,
    /// The relation has more than one row.
    Many,
}

impl Cardinality {
    /// Classifies an exact row count.
    pub fn from_row_count(row_count: u64) -> Self {
        match row_count {
            0 => Cardinality::Zero,
            1 => Cardinality::One,
            _ => Cardinality::Many,
        }
    }
}

impl Display for Cardinality {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::Zero => f.write_str("ZERO"),
            Cardinality::One => f.write_str("ONE"),
            Cardinality::Many => f.write_str("MANY"),
        }
    }
}
