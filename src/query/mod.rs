//! Attribute query support: LIKE patterns and typed where-clauses.

mod clause;
mod pattern;

pub use clause::{delimit_field, WhereClause};
pub use pattern::LikePattern;
