#![doc(test(attr(deny(warnings))))]

//! Turns relations into executable plans.
//!
//! [TuplesOperations] is the entry point. It picks the physical operator that fits its inputs,
//! folds single-row join operands into constant bindings and orders the remaining join operands
//! by an estimate of their cost. The [explain] module renders the resulting operator trees.

mod config;
pub mod explain;
mod operations;
mod planner;

pub use config::{DistinctStrategy, TuplesConfig};
pub use operations::TuplesOperations;
