use std::fmt::{Display, Formatter};

const SUBJECT: usize = 0;
const PREDICATE: usize = 1;
const OBJECT: usize = 2;

/// How [super::ConstrainedNegationTuples] skips the block of rows that match the fixed positions.
///
/// Each strategy expects the backing relation to be sorted in the order of its name, so that the
/// matching rows form one contiguous block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipStrategy {
    /// Subject, predicate and object are fixed. At most one row is skipped.
    SingleStatement,
    /// The subject and optionally the predicate are fixed.
    Spo,
    /// The predicate and optionally the object are fixed.
    Pos,
    /// Only the object is fixed.
    Osp,
    /// Subject and object are fixed.
    Sop,
    /// Nothing is fixed, so every row is excluded.
    Unconstrained,
}

impl SkipStrategy {
    /// Selects the strategy for the fixed positions.
    pub fn for_fixed(subject: bool, predicate: bool, object: bool) -> Self {
        match (subject, predicate, object) {
            (true, true, true) => SkipStrategy::SingleStatement,
            (true, _, false) => SkipStrategy::Spo,
            (false, true, _) => SkipStrategy::Pos,
            (false, false, true) => SkipStrategy::Osp,
            (true, false, true) => SkipStrategy::Sop,
            (false, false, false) => SkipStrategy::Unconstrained,
        }
    }

    /// Returns the statement positions that identify the excluded block, in sort order.
    pub fn exclusion_positions(self, fixed: [bool; 3]) -> Vec<usize> {
        let order: &[usize] = match self {
            SkipStrategy::SingleStatement | SkipStrategy::Spo => &[SUBJECT, PREDICATE, OBJECT],
            SkipStrategy::Pos => &[PREDICATE, OBJECT, SUBJECT],
            SkipStrategy::Osp => &[OBJECT, SUBJECT, PREDICATE],
            SkipStrategy::Sop => &[SUBJECT, OBJECT, PREDICATE],
            SkipStrategy::Unconstrained => &[],
        };
        order
            .iter()
            .copied()
            .filter(|position| fixed[*position])
            .collect()
    }
}

impl Display for SkipStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipStrategy::SingleStatement => f.write_str("SPO!"),
            SkipStrategy::Spo => f.write_str("SPO"),
            SkipStrategy::Pos => f.write_str("POS"),
            SkipStrategy::Osp => f.write_str("OSP"),
            SkipStrategy::Sop => f.write_str("SOP"),
            SkipStrategy::Unconstrained => f.write_str("none"),
        }
    }
}
