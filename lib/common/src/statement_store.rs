use crate::BoxedTuples;
use rdf_tuples_model::{NodeId, TuplesResult};
use std::fmt::Debug;

/// The storage layer as seen by the relation algebra.
///
/// Statement positions are always addressed in subject, predicate, object, graph order.
///
/// # Consistency
///
/// Relations returned by a store must read a stable snapshot for their whole lifetime, even if
/// the store is modified afterward.
pub trait StatementStore: Debug {
    /// Returns every statement of the store as a sorted relation with four columns.
    ///
    /// `bound` flags the positions that the caller intends to fix. The store picks a native order
    /// in which these positions lead, so that they form a prefix.
    fn find_tuples(&self, bound: [bool; 4]) -> TuplesResult<BoxedTuples>;

    /// Returns, for each column of [StatementStore::find_tuples], the statement position it holds.
    fn column_order(&self, bound: [bool; 4]) -> [usize; 4];

    /// Returns whether a statement matching `pattern` exists. [None] matches any node.
    fn exists(&self, pattern: [Option<NodeId>; 4]) -> TuplesResult<bool>;
}
