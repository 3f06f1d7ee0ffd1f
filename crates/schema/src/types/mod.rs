//! The recursive type-spec grammar and the pure functions over it.
//!
//! - [`TypeSpec`] — the closed grammar of shapes a value can be declared as.
//! - [`check`] — structural validation with path tracking and aggregation.
//! - [`coerce`] — best-effort, explicitly enumerated conversions.
//! - [`Constraint`] — predicates layered on top of a type match.

mod check;
mod coerce;
mod constraints;
mod custom;
mod spec;

pub use check::check;
pub use coerce::coerce;
pub use constraints::{Constraint, apply_constraints};
pub use custom::Validatable;
pub use spec::{ArrayBounds, TypeSpec};
