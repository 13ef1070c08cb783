mod annotation;
mod comparator;
mod statement_store;
mod tuples;
mod util;

pub use annotation::{DefinablePrefix, MandatoryBinding, Reresolvable};
pub use comparator::RowComparator;
pub use statement_store::StatementStore;
pub use tuples::{BoxedTuples, Tuples};
pub use util::{check_column, check_prefix, close_all, collect_rows, read_row};
