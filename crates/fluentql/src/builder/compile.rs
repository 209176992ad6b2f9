//! Compilation of accumulated state into SQL text.
//!
//! Compilation is a pure function of [`QueryState`]: it never touches bindings or the
//! counter. The same walk produces either bind-key SQL (for execution) or
//! literal-substituted SQL (for display only, see [`QueryBuilder::to_raw_sql`]).
//!
//! [`QueryBuilder::to_raw_sql`]: super::QueryBuilder::to_raw_sql

use super::clause::{Predicate, PredicateNode, SubquerySource};
use super::state::QueryState;
use crate::error::{QbError, QbResult};
use crate::value::Bindings;
use std::borrow::Cow;
use std::fmt::Write as _;

/// Shape of the statement to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// `SELECT <columns> FROM ...` honoring LIMIT.
    #[default]
    SelectAll,
    /// Like `SelectAll`, but always `LIMIT 1`.
    SelectSingle,
    /// `SELECT COUNT(*) as aggregate FROM ...`, never limited.
    Count,
    /// `DELETE FROM ...`.
    Delete,
    /// `UPDATE ... SET` with the assignments generated by `update()`.
    Update,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::SelectAll => "select",
            BuildMode::SelectSingle => "select_single",
            BuildMode::Count => "count",
            BuildMode::Delete => "delete",
            BuildMode::Update => "update",
        }
    }
}

/// A compiled statement: SQL referencing bind keys, plus the values for those keys.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    sql: String,
    bindings: Bindings,
    mode: BuildMode,
}

impl BuiltQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn into_parts(self) -> (String, Bindings) {
        (self.sql, self.bindings)
    }
}

/// How bind keys are written into the SQL text.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Placeholders<'a> {
    /// Write the key itself (`:wa1_id`).
    Keys,
    /// Write the bound value as a literal (`5`, `'ada'`).
    Literals(&'a Bindings),
}

impl Placeholders<'_> {
    fn resolve<'k>(&self, key: &'k str) -> Cow<'k, str> {
        match self {
            Placeholders::Keys => Cow::Borrowed(key),
            Placeholders::Literals(bindings) => match bindings.get(key) {
                Some(value) => Cow::Owned(value.to_sql_literal()),
                None => Cow::Borrowed(key),
            },
        }
    }

    /// Substitute every known key occurring in raw SQL text.
    ///
    /// Longer keys are replaced first so `:wr1_raw` never clobbers `:wr12_raw`.
    fn resolve_raw<'s>(&self, sql: &'s str) -> Cow<'s, str> {
        let Placeholders::Literals(bindings) = self else {
            return Cow::Borrowed(sql);
        };
        let mut keys: Vec<&str> = bindings.keys().filter(|k| sql.contains(k)).collect();
        if keys.is_empty() {
            return Cow::Borrowed(sql);
        }
        keys.sort_by_key(|k| std::cmp::Reverse(k.len()));
        let mut out = sql.to_string();
        for key in keys {
            if let Some(value) = bindings.get(key) {
                out = out.replace(key, &value.to_sql_literal());
            }
        }
        Cow::Owned(out)
    }
}

impl QueryState {
    /// Compile into bind-key SQL and a copy of the bindings.
    pub fn build(&self, mode: BuildMode) -> QbResult<BuiltQuery> {
        let sql = self.compile(mode)?;
        Ok(BuiltQuery {
            sql,
            bindings: self.bindings.clone(),
            mode,
        })
    }

    /// Compile into bind-key SQL, consuming the state.
    pub fn into_built(self, mode: BuildMode) -> QbResult<BuiltQuery> {
        let sql = self.compile(mode)?;
        Ok(BuiltQuery {
            sql,
            bindings: self.bindings,
            mode,
        })
    }

    fn compile(&self, mode: BuildMode) -> QbResult<String> {
        self.validate()?;
        if mode == BuildMode::Update && self.assignments.is_empty() {
            return Err(QbError::validation("UPDATE requires at least one assignment"));
        }
        Ok(render(self, mode, Placeholders::Keys))
    }
}

/// Render `state` in `mode`. Callers validate first.
pub(crate) fn render(state: &QueryState, mode: BuildMode, ph: Placeholders<'_>) -> String {
    let mut sql = String::with_capacity(128);

    match mode {
        BuildMode::SelectAll | BuildMode::SelectSingle => {
            sql.push_str("SELECT ");
            if state.columns.is_empty() {
                sql.push('*');
            } else {
                sql.push_str(&state.columns.join(", "));
            }
            sql.push_str(" FROM ");
            sql.push_str(&state.table);
        }
        BuildMode::Count => {
            sql.push_str("SELECT COUNT(*) as aggregate FROM ");
            sql.push_str(&state.table);
        }
        BuildMode::Delete => {
            sql.push_str("DELETE FROM ");
            sql.push_str(&state.table);
        }
        BuildMode::Update => {
            sql.push_str("UPDATE ");
            sql.push_str(&state.table);
            sql.push_str(" SET ");
            for (i, (column, key)) in state.assignments.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                let _ = write!(sql, "{column} = {}", ph.resolve(key));
            }
        }
    }

    for join in &state.joins {
        let _ = write!(sql, " {} {} ON {}", join.kind.as_str(), join.table, join.on);
    }

    if !state.predicates.is_empty() {
        sql.push_str(" WHERE ");
        write_predicates(&mut sql, &state.predicates, ph);
    }

    if let Some(group) = &state.group_by {
        sql.push_str(" GROUP BY ");
        sql.push_str(group);
    }

    if !state.order.is_empty() {
        sql.push_str(" ORDER BY ");
        for (i, term) in state.order.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            let _ = write!(sql, "{} {}", term.column, term.direction.as_str());
        }
    }

    match mode {
        BuildMode::SelectSingle => sql.push_str(" LIMIT 1"),
        BuildMode::Count => {}
        _ => {
            if let Some(limit) = state.limit.render() {
                sql.push_str(" LIMIT ");
                sql.push_str(&limit);
            }
        }
    }

    sql
}

/// Join predicates by their connectors; the first connector is never written.
fn write_predicates(sql: &mut String, predicates: &[Predicate], ph: Placeholders<'_>) {
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            sql.push(' ');
            sql.push_str(predicate.connector.as_str());
            sql.push(' ');
        }
        write_node(sql, &predicate.node, ph);
    }
}

fn write_node(sql: &mut String, node: &PredicateNode, ph: Placeholders<'_>) {
    match node {
        PredicateNode::Compare { column, op, key } => {
            let _ = write!(sql, "{column} {op} {}", ph.resolve(key));
        }
        PredicateNode::InList {
            column,
            keys,
            negated,
        } => {
            let _ = write!(sql, "{column} {}IN (", if *negated { "NOT " } else { "" });
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&ph.resolve(key));
            }
            sql.push(')');
        }
        PredicateNode::Between { column, start, end } => {
            let _ = write!(
                sql,
                "{column} BETWEEN {} AND {}",
                ph.resolve(start),
                ph.resolve(end)
            );
        }
        PredicateNode::NullCheck { column, negated } => {
            let _ = write!(sql, "{column} IS {}NULL", if *negated { "NOT " } else { "" });
        }
        PredicateNode::Raw(text) => sql.push_str(&ph.resolve_raw(text)),
        PredicateNode::Group(inner) => {
            sql.push('(');
            write_predicates(sql, inner, ph);
            sql.push(')');
        }
        PredicateNode::Subquery { column, op, source } => {
            let _ = write!(sql, "{column} {} (", op.as_str());
            match source {
                SubquerySource::Query(child) => {
                    sql.push_str(&render(child, BuildMode::SelectAll, ph));
                }
                SubquerySource::Raw(text) => sql.push_str(text),
            }
            sql.push(')');
        }
    }
}
