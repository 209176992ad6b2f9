//! Convenient imports for typical `fluentql` usage.
//!
//! ```ignore
//! use fluentql::prelude::*;
//! ```

pub use crate::{
    Bindings, BuildMode, Connection, ExecutionResult, FromValue, QbError, QbResult, QueryBuilder,
    Row, SubqueryOp, Value,
};

#[cfg(feature = "sqlite")]
pub use crate::SqliteConnection;
