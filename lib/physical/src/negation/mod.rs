//! Negation of a single statement pattern.

mod constrained;
mod strategy;

pub use constrained::ConstrainedNegationTuples;
pub use strategy::SkipStrategy;
