//! Constraint types for version matching

mod comparator;
mod multi_constraint;
mod operator;

pub use comparator::{Comparator, Precision};
pub use multi_constraint::Constraint;
pub use operator::{InvalidOperatorError, Operator};
