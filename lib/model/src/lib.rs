mod constraint;
mod error;
mod node;

pub use constraint::*;
pub use error::*;
pub use node::*;

// Re-export some oxrdf types.
pub use oxrdf::{Variable, VariableNameParseError, VariableRef};
