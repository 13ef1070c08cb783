use rdf_tuples_model::NodeId;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// A lexicographic row order over a sequence of columns.
///
/// Two relations are sorted compatibly if their comparators are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowComparator {
    columns: Arc<[usize]>,
}

impl RowComparator {
    /// Creates a new [RowComparator] that compares `columns` in the given order.
    pub fn new(columns: impl Into<Arc<[usize]>>) -> Self {
        Self {
            columns: columns.into(),
        }
    }

    /// Creates a comparator that orders by all `arity` columns from left to right.
    pub fn natural(arity: usize) -> Self {
        Self::new((0..arity).collect::<Vec<_>>())
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Returns whether this comparator orders by the columns from left to right. Only then can a
    /// prefix seek use the order.
    pub fn is_natural(&self) -> bool {
        self.columns
            .iter()
            .enumerate()
            .all(|(position, column)| position == *column)
    }

    /// Compares two rows.
    pub fn compare(&self, lhs: &[NodeId], rhs: &[NodeId]) -> Ordering {
        for column in self.columns.iter() {
            match lhs.get(*column).cmp(&rhs.get(*column)) {
                Ordering::Equal => {}
                other => return other,
            }
        }
        Ordering::Equal
    }
}

impl Display for RowComparator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Lexical(")?;
        for (position, column) in self.columns.iter().enumerate() {
            if position > 0 {
                f.write_str(",")?;
            }
            write!(f, "{column}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_comparator_orders_lexicographically() {
        let comparator = RowComparator::natural(2);
        assert!(comparator.is_natural());
        assert_eq!(comparator.compare(&[1, 9], &[2, 0]), Ordering::Less);
        assert_eq!(comparator.compare(&[1, 9], &[1, 3]), Ordering::Greater);
        assert_eq!(comparator.compare(&[4, 4], &[4, 4]), Ordering::Equal);
    }

    #[test]
    fn reordered_comparator() {
        let comparator = RowComparator::new(vec![1, 0]);
        assert!(!comparator.is_natural());
        assert_eq!(comparator.compare(&[1, 9], &[2, 0]), Ordering::Greater);
        assert_eq!(comparator.to_string(), "Lexical(1,0)");
    }
}
