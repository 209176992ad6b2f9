//! [`Connection`] over SQLite via `rusqlite`.
//!
//! SQLite understands everything the builder emits: backtick-quoted identifiers,
//! `:name` placeholders and `LIMIT offset, count`.

use crate::client::{Connection, ExecutionResult};
use crate::error::QbResult;
use crate::row::Row;
use crate::value::{Bindings, Value};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Params, Statement, ToSql};
use std::path::Path;
use std::sync::Arc;

/// A SQLite database connection.
///
/// ```ignore
/// use fluentql::{QueryBuilder, SqliteConnection};
///
/// let db = SqliteConnection::open_in_memory()?;
/// db.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
/// let id = QueryBuilder::new(&db).table("users").insert([("name", "ada")])?;
/// ```
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> QbResult<Self> {
        Ok(Self::from(rusqlite::Connection::open(path)?))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> QbResult<Self> {
        Ok(Self::from(rusqlite::Connection::open_in_memory()?))
    }

    /// Run one or more `;`-separated statements, e.g. a schema.
    pub fn execute_batch(&self, sql: &str) -> QbResult<()> {
        Ok(self.conn.execute_batch(sql)?)
    }

    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }

    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }
}

impl From<rusqlite::Connection> for SqliteConnection {
    fn from(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }
}

impl Connection for SqliteConnection {
    fn query(&self, sql: &str) -> QbResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        collect_rows(&mut stmt, [])
    }

    fn exec(&self, sql: &str) -> QbResult<u64> {
        let affected = self.conn.execute(sql, [])?;
        Ok(affected as u64)
    }

    fn execute(&self, sql: &str, bindings: &Bindings) -> QbResult<ExecutionResult> {
        let mut stmt = self.conn.prepare(sql)?;
        let params: Vec<(&str, &dyn ToSql)> = bindings
            .iter()
            .map(|(key, value)| (key, value as &dyn ToSql))
            .collect();

        if stmt.column_count() > 0 {
            let rows = collect_rows(&mut stmt, params.as_slice())?;
            Ok(ExecutionResult::with_rows(rows))
        } else {
            let affected = stmt.execute(params.as_slice())?;
            Ok(ExecutionResult::with_affected(affected as u64))
        }
    }

    fn last_insert_id(&self) -> QbResult<Value> {
        Ok(Value::Int(self.conn.last_insert_rowid()))
    }
}

fn collect_rows<P: Params>(stmt: &mut Statement<'_>, params: P) -> QbResult<Vec<Row>> {
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..columns.len())
            .map(|idx| row.get_ref(idx).map(Value::from))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        out.push(Row::new(columns.clone(), values));
    }
    Ok(out)
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::Int(n),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Bool(b) => ToSqlOutput::Borrowed(ValueRef::Integer(i64::from(*b))),
            Value::Int(n) => ToSqlOutput::Borrowed(ValueRef::Integer(*n)),
            Value::Float(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
        })
    }
}
