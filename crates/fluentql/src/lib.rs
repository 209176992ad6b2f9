//! # fluentql
//!
//! A fluent SQL statement builder with named bind keys.
//!
//! ## Features
//!
//! - **Values never enter SQL text**: every literal is bound under a generated key
//!   (`:wa1_id`) and travels to the database separately
//! - **Nested sub-builders**: grouped conditions and subqueries share one key
//!   counter, so keys never collide
//! - **Reset after execute**: terminal operations consume the accumulated state
//! - **Pluggable database**: anything implementing [`Connection`]; SQLite is built in
//! - **Monitoring**: hooks, timing, statistics and `tracing` logs via
//!   [`InstrumentedConnection`]
//!
//! ## Example
//!
//! ```ignore
//! use fluentql::{QueryBuilder, SqliteConnection, SubqueryOp};
//!
//! let db = SqliteConnection::open_in_memory()?;
//! let mut qb = QueryBuilder::new(&db);
//!
//! // SELECT * FROM `users` WHERE `status` = :wa1_status
//! //   AND `id` IN (SELECT `user_id` FROM `orders` WHERE `total` > :wa2_total)
//! //   ORDER BY `name` ASC LIMIT 10
//! let users = qb
//!     .table("users")
//!     .and_where("status", "active")
//!     .where_sub("id", SubqueryOp::In, |s| {
//!         s.table("orders").select("user_id").and_where_op("total", ">", 100);
//!     })
//!     .order_by("name")
//!     .limit(10)
//!     .get()?;
//!
//! // the builder is empty again
//! let id = qb.table("users").insert([("name", "ada")])?;
//! let n = qb.table("users").and_where("id", id).delete()?;
//! ```

pub mod builder;
pub mod client;
pub mod error;
pub mod ident;
pub mod monitor;
pub mod prelude;
pub mod row;
pub mod value;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{
    BindCounter, BuildMode, BuiltQuery, JoinKind, QueryBuilder, SortDirection, SubqueryOp,
};
pub use client::{Connection, ExecutionResult};
pub use error::{QbError, QbResult};
pub use ident::{ColumnList, format_column, format_columns};
pub use monitor::{
    CompositeHook, CompositeMonitor, HookAction, InstrumentedConnection, LoggingMonitor,
    MonitorConfig, NoopMonitor, QueryContext, QueryHook, QueryMonitor, QueryResult, QueryStats,
    QueryType, StatsMonitor, TracingSqlHook,
};
pub use row::Row;
pub use value::{Bindings, FromValue, Value};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;
