use rdf_tuples_model::{TuplesError, TuplesResult};

/// The position of a cursor relative to the rows of its relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CursorState {
    /// `before_first` has not been called yet.
    #[default]
    Unpositioned,
    /// Positioned before a row; `next` has not been called since.
    BeforeRow,
    /// Positioned on a row.
    OnRow,
    /// All rows have been read.
    Exhausted,
}

impl CursorState {
    /// Fails unless the cursor has been positioned with `before_first`.
    pub(crate) fn ensure_positioned(self) -> TuplesResult<()> {
        match self {
            CursorState::Unpositioned => Err(TuplesError::NotPositioned),
            _ => Ok(()),
        }
    }

    /// Fails unless the cursor is on a row.
    pub(crate) fn ensure_on_row(self) -> TuplesResult<()> {
        match self {
            CursorState::OnRow => Ok(()),
            _ => Err(TuplesError::NoCurrentRow),
        }
    }

    /// Returns the state after `next` returned `has_row`.
    pub(crate) fn after_next(has_row: bool) -> Self {
        if has_row {
            CursorState::OnRow
        } else {
            CursorState::Exhausted
        }
    }
}
