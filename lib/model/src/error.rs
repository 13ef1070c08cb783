use oxrdf::Variable;
use std::error::Error;
use thiserror::Error;

/// The result type of every relation operation.
pub type TuplesResult<T> = Result<T, TuplesError>;

/// A failure while building or evaluating a relation.
///
/// Evaluation is never retried. Operators that fail while driving an operand wrap the error with
/// [TuplesError::Operand] so that the failing part of a plan can be located.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TuplesError {
    #[error("Prefix of length {prefix_length} is too long for a relation with {arity} columns")]
    InvalidPrefix { prefix_length: usize, arity: usize },
    #[error("The cursor is not positioned on a row")]
    NoCurrentRow,
    #[error("The cursor has not been positioned with before_first")]
    NotPositioned,
    #[error("Column {column} does not exist in a relation with {arity} columns")]
    InvalidColumn { column: usize, arity: usize },
    #[error("The variable {0} is not part of the relation")]
    UnknownVariable(Variable),
    #[error("Unable to subtract: no common variables")]
    NoCommonVariables,
    #[error("Unable to meet ordering constraints, bound variables: {0}")]
    UnsatisfiableOrdering(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{operator} failed on operand {operand}")]
    Operand {
        operator: &'static str,
        operand: usize,
        #[source]
        source: Box<TuplesError>,
    },
    #[error("Unable to iterate to the next tuples element while filtering")]
    Filter(#[source] Box<TuplesError>),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TuplesError {
    /// Creates a new [TuplesError::InvalidArgument].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        TuplesError::InvalidArgument(message.into())
    }

    /// Wraps this error with the operator and the operand index that produced it.
    #[must_use]
    pub fn in_operand(self, operator: &'static str, operand: usize) -> Self {
        TuplesError::Operand {
            operator,
            operand,
            source: Box::new(self),
        }
    }
}

/// An error related to the storage collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// A statement contained a node that cannot be stored.
    #[error("Node {0} cannot be stored; node identifiers must be positive")]
    InvalidNode(i64),
    /// The storage is in an inconsistent state.
    #[error("Storage is corrupted: {0}")]
    Corruption(String),
    #[doc(hidden)]
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync + 'static>),
}
