//! Fluent statement builder.
//!
//! ## Design
//!
//! - Clauses accumulate as typed fragments; SQL text exists only after compilation.
//! - WHERE is a flat list of predicates in call order, each carrying its own
//!   `AND`/`OR`. The first connector is never written, and standard SQL precedence
//!   applies (`a AND b OR c` is `(a AND b) OR c`). Use `where_group` to force
//!   other precedence.
//! - Values never enter SQL text. Each one is bound under a generated key
//!   (`:wa1_id`, `:wi2_status`, ...) numbered by a single [`BindCounter`] that
//!   sub-builders borrow and hand back, so keys stay unique across subqueries and
//!   groups.
//! - Terminal operations take the accumulated state by value. The builder is empty
//!   afterwards, on success and on failure alike.

mod clause;
mod compile;
mod query;
mod state;

pub use clause::{JoinKind, SortDirection, SubqueryOp};
pub use compile::{BuildMode, BuiltQuery};
pub use query::{QueryBuilder, SQL_TARGET};
pub use state::BindCounter;

#[cfg(test)]
mod tests;
