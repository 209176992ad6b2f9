//! The database collaborator contract.
//!
//! The builder never talks to a driver directly. Anything that can run a statement
//! with named bind keys (`:wa1_id`) and hand back rows, an affected-row count and the
//! last generated identifier can back a [`QueryBuilder`](crate::QueryBuilder).

use crate::error::QbResult;
use crate::row::Row;
use crate::value::{Bindings, Value};

/// A database connection the builder delegates execution to.
///
/// Errors are the collaborator's own and are propagated to the caller unchanged.
pub trait Connection {
    /// Run SQL without bindings and return all rows.
    fn query(&self, sql: &str) -> QbResult<Vec<Row>>;

    /// Run SQL without bindings and return the number of affected rows.
    fn exec(&self, sql: &str) -> QbResult<u64>;

    /// Prepare `sql` (which references bind keys) and execute it with `bindings`.
    fn execute(&self, sql: &str, bindings: &Bindings) -> QbResult<ExecutionResult>;

    /// Identifier generated by the most recent INSERT on this connection.
    fn last_insert_id(&self) -> QbResult<Value>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn query(&self, sql: &str) -> QbResult<Vec<Row>> {
        (**self).query(sql)
    }

    fn exec(&self, sql: &str) -> QbResult<u64> {
        (**self).exec(sql)
    }

    fn execute(&self, sql: &str, bindings: &Bindings) -> QbResult<ExecutionResult> {
        (**self).execute(sql, bindings)
    }

    fn last_insert_id(&self) -> QbResult<Value> {
        (**self).last_insert_id()
    }
}

/// Outcome of one prepared execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    rows: Vec<Row>,
    affected: u64,
}

impl ExecutionResult {
    /// Result of a statement that produced rows.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self { rows, affected: 0 }
    }

    /// Result of a statement that changed rows.
    pub fn with_affected(affected: u64) -> Self {
        Self {
            rows: Vec::new(),
            affected,
        }
    }

    /// Number of rows produced.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows changed by INSERT/UPDATE/DELETE.
    pub fn affected_row_count(&self) -> u64 {
        self.affected
    }

    /// All rows, in result order.
    pub fn fetch_all(self) -> Vec<Row> {
        self.rows
    }

    /// The first row, if any. Extra rows are ignored.
    pub fn fetch_one(self) -> Option<Row> {
        self.rows.into_iter().next()
    }

    /// The first column of the first row, if any.
    pub fn fetch_scalar(self) -> Option<Value> {
        self.fetch_one().and_then(Row::into_first)
    }
}
