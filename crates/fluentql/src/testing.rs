//! In-memory connection that records every statement it receives.

use crate::client::{Connection, ExecutionResult};
use crate::error::{QbError, QbResult};
use crate::row::Row;
use crate::value::{Bindings, Value};
use std::cell::{Cell, RefCell};

#[derive(Default)]
pub(crate) struct RecordingConnection {
    calls: RefCell<Vec<(String, Bindings)>>,
    rows: Vec<Row>,
    affected: u64,
    failure: Option<String>,
    next_id: Cell<i64>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn with_affected(affected: u64) -> Self {
        Self {
            affected,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Bindings)> {
        self.calls.borrow().clone()
    }

    pub fn last_sql(&self) -> String {
        self.calls
            .borrow()
            .last()
            .map(|(sql, _)| sql.clone())
            .unwrap_or_default()
    }

    pub fn last_bindings(&self) -> Bindings {
        self.calls
            .borrow()
            .last()
            .map(|(_, bindings)| bindings.clone())
            .unwrap_or_default()
    }

    fn record(&self, sql: &str, bindings: &Bindings) -> QbResult<()> {
        self.calls
            .borrow_mut()
            .push((sql.to_string(), bindings.clone()));
        match &self.failure {
            Some(message) => Err(QbError::Connection(message.clone())),
            None => Ok(()),
        }
    }
}

impl Connection for RecordingConnection {
    fn query(&self, sql: &str) -> QbResult<Vec<Row>> {
        self.record(sql, &Bindings::new())?;
        Ok(self.rows.clone())
    }

    fn exec(&self, sql: &str) -> QbResult<u64> {
        self.record(sql, &Bindings::new())?;
        Ok(self.affected)
    }

    fn execute(&self, sql: &str, bindings: &Bindings) -> QbResult<ExecutionResult> {
        self.record(sql, bindings)?;
        if sql.starts_with("INSERT") {
            self.next_id.set(self.next_id.get() + 1);
        }
        if self.rows.is_empty() {
            Ok(ExecutionResult::with_affected(self.affected))
        } else {
            Ok(ExecutionResult::with_rows(self.rows.clone()))
        }
    }

    fn last_insert_id(&self) -> QbResult<Value> {
        Ok(Value::Int(self.next_id.get()))
    }
}
