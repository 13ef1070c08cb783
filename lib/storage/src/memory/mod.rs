mod resolution;
mod store;
mod store_tuples;

pub use resolution::StatementResolution;
pub use store::{MemStatementStore, VersionNumber};
pub use store_tuples::StoreTuples;
