use super::clause::{
    Connector, Join, JoinKind, OrderTerm, Predicate, PredicateNode, SortDirection, SubqueryOp,
    SubquerySource, normalize_operator,
};
use super::compile::{BuildMode, BuiltQuery, Placeholders, render};
use super::state::{BindCounter, BuildError, QueryState};
use crate::client::{Connection, ExecutionResult};
use crate::error::{QbError, QbResult};
use crate::ident::{ColumnList, format_column, format_columns};
use crate::row::Row;
use crate::value::{Bindings, FromValue, Value};

/// `tracing` target for statement events.
pub const SQL_TARGET: &str = "fluentql.sql";

/// Fluent statement builder bound to a [`Connection`].
///
/// Chainable calls accumulate clauses; terminal calls (`get`, `first`, `scalar`,
/// `count`, `insert`, `update`, `delete`, `to_raw_sql`, `all`) compile, execute and
/// leave the builder empty, whether or not they succeed.
///
/// Invalid input to a chainable call (an unknown operator, a `?` count mismatch) is
/// remembered and returned by the next terminal call.
///
/// # Example
/// ```ignore
/// use fluentql::QueryBuilder;
///
/// let mut qb = QueryBuilder::new(&conn);
/// let rows = qb
///     .table("users")
///     .and_where("status", "active")
///     .where_group(|g| {
///         g.and_where_op("age", ">=", 18).or_where("role", "admin");
///     })
///     .order_by_desc("created_at")
///     .limit(10)
///     .get()?;
/// ```
pub struct QueryBuilder<'c, C: Connection + ?Sized> {
    conn: &'c C,
    state: QueryState,
}

impl<'c, C: Connection + ?Sized> QueryBuilder<'c, C> {
    /// Create an empty builder over `conn`.
    pub fn new(conn: &'c C) -> Self {
        Self {
            conn,
            state: QueryState::default(),
        }
    }

    /// Sub-builder continuing this builder's bind counter.
    fn child(&self) -> Self {
        Self {
            conn: self.conn,
            state: QueryState::with_counter(self.state.counter),
        }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &'c C {
        self.conn
    }

    /// Current bind counter.
    pub fn counter(&self) -> BindCounter {
        self.state.counter
    }

    // ==================== Target and projection ====================

    /// Set the target table (`"users"`, `"users as u"`).
    pub fn table(&mut self, name: &str) -> &mut Self {
        self.state.table = format_columns(name);
        self
    }

    /// Append projected columns. Without any, `*` is selected.
    pub fn select(&mut self, columns: impl ColumnList) -> &mut Self {
        let formatted = format_columns(columns);
        if !formatted.is_empty() {
            self.state.columns.push(formatted);
        }
        self
    }

    /// Append `SUM(column) [AS alias]`.
    pub fn select_sum(&mut self, column: &str, alias: Option<&str>) -> &mut Self {
        self.select_aggregate("SUM", column, alias)
    }

    /// Append `COUNT(column) [AS alias]`.
    pub fn select_count(&mut self, column: &str, alias: Option<&str>) -> &mut Self {
        self.select_aggregate("COUNT", column, alias)
    }

    /// Append `DISTINCT(column) [AS alias]`.
    pub fn select_distinct(&mut self, column: &str, alias: Option<&str>) -> &mut Self {
        self.select_aggregate("DISTINCT", column, alias)
    }

    fn select_aggregate(&mut self, func: &str, column: &str, alias: Option<&str>) -> &mut Self {
        let mut expr = format!("{func}({})", format_column(column));
        if let Some(alias) = alias {
            expr.push_str(" AS ");
            expr.push_str(&format_column(alias));
        }
        self.state.columns.push(expr);
        self
    }

    // ==================== WHERE ====================

    fn push(&mut self, connector: Connector, node: PredicateNode) -> &mut Self {
        self.state.predicates.push(Predicate { connector, node });
        self
    }

    fn compare(&mut self, connector: Connector, column: &str, op: &str, value: Value) -> &mut Self {
        let Some(op) = normalize_operator(op) else {
            self.state.defer(BuildError::Validation(format!(
                "unsupported comparison operator '{op}'"
            )));
            return self;
        };
        let key = self.state.bind(connector.key_kind(), column, value);
        self.push(
            connector,
            PredicateNode::Compare {
                column: format_column(column),
                op,
                key,
            },
        )
    }

    /// `AND column = value`.
    pub fn and_where(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(Connector::And, column, "=", value.into())
    }

    /// `AND column <op> value`. Unknown operators are reported at build time.
    pub fn and_where_op(&mut self, column: &str, op: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(Connector::And, column, op, value.into())
    }

    /// `OR column = value`.
    pub fn or_where(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(Connector::Or, column, "=", value.into())
    }

    /// `OR column <op> value`.
    pub fn or_where_op(&mut self, column: &str, op: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(Connector::Or, column, op, value.into())
    }

    fn in_list<V: Into<Value>>(
        &mut self,
        connector: Connector,
        column: &str,
        values: impl IntoIterator<Item = V>,
        negated: bool,
    ) -> &mut Self {
        let kind = if negated { "wni" } else { "wi" };
        let keys = values
            .into_iter()
            .map(|value| self.state.bind(kind, column, value.into()))
            .collect();
        self.push(
            connector,
            PredicateNode::InList {
                column: format_column(column),
                keys,
                negated,
            },
        )
    }

    /// `AND column IN (...)`. An empty list renders `IN ()`.
    pub fn where_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.in_list(Connector::And, column, values, false)
    }

    /// `OR column IN (...)`.
    pub fn or_where_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.in_list(Connector::Or, column, values, false)
    }

    /// `AND column NOT IN (...)`.
    pub fn where_not_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.in_list(Connector::And, column, values, true)
    }

    /// `OR column NOT IN (...)`.
    pub fn or_where_not_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.in_list(Connector::Or, column, values, true)
    }

    fn between(&mut self, connector: Connector, column: &str, start: Value, end: Value) -> &mut Self {
        let start = self.state.bind("wbs", column, start);
        let end = self.state.bind("wbe", column, end);
        self.push(
            connector,
            PredicateNode::Between {
                column: format_column(column),
                start,
                end,
            },
        )
    }

    /// `AND column BETWEEN start AND end`.
    pub fn where_between(
        &mut self,
        column: &str,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> &mut Self {
        self.between(Connector::And, column, start.into(), end.into())
    }

    /// `OR column BETWEEN start AND end`.
    pub fn or_where_between(
        &mut self,
        column: &str,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> &mut Self {
        self.between(Connector::Or, column, start.into(), end.into())
    }

    fn null_check(&mut self, connector: Connector, column: &str, negated: bool) -> &mut Self {
        self.push(
            connector,
            PredicateNode::NullCheck {
                column: format_column(column),
                negated,
            },
        )
    }

    /// `AND column IS NULL`.
    pub fn is_null(&mut self, column: &str) -> &mut Self {
        self.null_check(Connector::And, column, false)
    }

    /// `AND column IS NOT NULL`.
    pub fn is_not_null(&mut self, column: &str) -> &mut Self {
        self.null_check(Connector::And, column, true)
    }

    /// `OR column IS NULL`.
    pub fn or_is_null(&mut self, column: &str) -> &mut Self {
        self.null_check(Connector::Or, column, false)
    }

    /// `OR column IS NOT NULL`.
    pub fn or_is_not_null(&mut self, column: &str) -> &mut Self {
        self.null_check(Connector::Or, column, true)
    }

    /// `AND <sql>`, inserted verbatim.
    ///
    /// # Safety
    ///
    /// This directly concatenates SQL. The caller must ensure safety.
    pub fn where_raw(&mut self, sql: &str) -> &mut Self {
        self.push(Connector::And, PredicateNode::Raw(sql.to_string()))
    }

    /// `OR <sql>`, inserted verbatim.
    pub fn or_where_raw(&mut self, sql: &str) -> &mut Self {
        self.push(Connector::Or, PredicateNode::Raw(sql.to_string()))
    }

    fn raw_bind<V: Into<Value>>(
        &mut self,
        connector: Connector,
        template: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let placeholder_count = template.matches('?').count();
        if placeholder_count != values.len() {
            self.state.defer(BuildError::Validation(format!(
                "raw predicate '{template}' has {placeholder_count} '?', but {} values provided",
                values.len()
            )));
            return self;
        }

        let mut parts = template.split('?');
        let mut sql = parts.next().unwrap_or_default().to_string();
        for (part, value) in parts.zip(values) {
            sql.push_str(&self.state.bind("wr", "raw", value));
            sql.push_str(part);
        }
        self.push(connector, PredicateNode::Raw(sql))
    }

    /// `AND <sql>` where each `?` is bound to the next value.
    pub fn where_raw_bind<V: Into<Value>>(
        &mut self,
        template: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.raw_bind(Connector::And, template, values)
    }

    /// `OR <sql>` where each `?` is bound to the next value.
    pub fn or_where_raw_bind<V: Into<Value>>(
        &mut self,
        template: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.raw_bind(Connector::Or, template, values)
    }

    /// Take back the counter, bindings and any misuse of a finished sub-builder.
    fn adopt(&mut self, mut child: QueryState) -> QueryState {
        self.state.counter = child.counter;
        if let Some(err) = child.build_error.take() {
            self.state.defer(err);
        }
        if let Err(err) = self.state.bindings.merge(std::mem::take(&mut child.bindings)) {
            self.state.defer(BuildError::from_error(err));
        }
        child
    }

    fn group<F>(&mut self, connector: Connector, configure: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder<'c, C>),
    {
        let mut child = self.child();
        configure(&mut child);
        let child = self.adopt(child.state);
        if child.predicates.is_empty() {
            return self;
        }
        self.push(connector, PredicateNode::Group(child.predicates))
    }

    /// `AND ( ... )` with the predicates added by `configure`.
    ///
    /// A group that ends up empty adds nothing.
    pub fn where_group<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder<'c, C>),
    {
        self.group(Connector::And, configure)
    }

    /// `OR ( ... )` with the predicates added by `configure`.
    pub fn or_where_group<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder<'c, C>),
    {
        self.group(Connector::Or, configure)
    }

    fn sub<F>(&mut self, connector: Connector, column: &str, op: SubqueryOp, configure: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder<'c, C>),
    {
        let mut child = self.child();
        configure(&mut child);
        let child = self.adopt(child.state);
        if child.table.is_empty() {
            self.state.defer(BuildError::MissingTable);
            return self;
        }
        self.push(
            connector,
            PredicateNode::Subquery {
                column: format_column(column),
                op,
                source: SubquerySource::Query(Box::new(child)),
            },
        )
    }

    /// `AND column <op> (SELECT ...)` built by `configure`.
    ///
    /// The subquery's bind keys continue this builder's numbering and are merged into
    /// this builder's bindings.
    pub fn where_sub<F>(&mut self, column: &str, op: SubqueryOp, configure: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder<'c, C>),
    {
        self.sub(Connector::And, column, op, configure)
    }

    /// `OR column <op> (SELECT ...)` built by `configure`.
    pub fn or_where_sub<F>(&mut self, column: &str, op: SubqueryOp, configure: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder<'c, C>),
    {
        self.sub(Connector::Or, column, op, configure)
    }

    /// `AND column <op> (<sql>)`, with `sql` inserted verbatim.
    pub fn where_sub_raw(&mut self, column: &str, op: SubqueryOp, sql: &str) -> &mut Self {
        self.push(
            Connector::And,
            PredicateNode::Subquery {
                column: format_column(column),
                op,
                source: SubquerySource::Raw(sql.to_string()),
            },
        )
    }

    /// `OR column <op> (<sql>)`, with `sql` inserted verbatim.
    pub fn or_where_sub_raw(&mut self, column: &str, op: SubqueryOp, sql: &str) -> &mut Self {
        self.push(
            Connector::Or,
            PredicateNode::Subquery {
                column: format_column(column),
                op,
                source: SubquerySource::Raw(sql.to_string()),
            },
        )
    }

    // ==================== JOIN ====================

    fn add_join(
        &mut self,
        kind: JoinKind,
        reference_table: &str,
        reference_column: &str,
        local_column: &str,
    ) -> &mut Self {
        if self.state.table.is_empty() {
            self.state.defer(BuildError::Validation(
                "join requires table() to be called first".to_string(),
            ));
            return self;
        }
        let table = format_column(reference_table);
        let on = format!(
            "{}.{} = {}.{}",
            reference_name(&self.state.table),
            format_column(local_column),
            reference_name(&table),
            format_column(reference_column),
        );
        self.state.joins.push(Join { kind, table, on });
        self
    }

    /// `JOIN reference_table ON <table>.local_column = reference_table.reference_column`.
    pub fn join(&mut self, reference_table: &str, reference_column: &str, local_column: &str) -> &mut Self {
        self.add_join(JoinKind::Plain, reference_table, reference_column, local_column)
    }

    /// `INNER JOIN`, see [`join`](Self::join).
    pub fn inner_join(&mut self, reference_table: &str, reference_column: &str, local_column: &str) -> &mut Self {
        self.add_join(JoinKind::Inner, reference_table, reference_column, local_column)
    }

    /// `LEFT JOIN`, see [`join`](Self::join).
    pub fn left_join(&mut self, reference_table: &str, reference_column: &str, local_column: &str) -> &mut Self {
        self.add_join(JoinKind::Left, reference_table, reference_column, local_column)
    }

    /// `RIGHT JOIN`, see [`join`](Self::join).
    pub fn right_join(&mut self, reference_table: &str, reference_column: &str, local_column: &str) -> &mut Self {
        self.add_join(JoinKind::Right, reference_table, reference_column, local_column)
    }

    /// `CROSS JOIN`, see [`join`](Self::join).
    pub fn cross_join(&mut self, reference_table: &str, reference_column: &str, local_column: &str) -> &mut Self {
        self.add_join(JoinKind::Cross, reference_table, reference_column, local_column)
    }

    /// `OUTER JOIN`, see [`join`](Self::join).
    pub fn outer_join(&mut self, reference_table: &str, reference_column: &str, local_column: &str) -> &mut Self {
        self.add_join(JoinKind::Outer, reference_table, reference_column, local_column)
    }

    // ==================== ORDER / GROUP / LIMIT ====================

    /// `ORDER BY column ASC`.
    pub fn order_by(&mut self, column: &str) -> &mut Self {
        self.push_order(column, SortDirection::Asc)
    }

    /// `ORDER BY column DESC`.
    pub fn order_by_desc(&mut self, column: &str) -> &mut Self {
        self.push_order(column, SortDirection::Desc)
    }

    /// `ORDER BY column <direction>` with `direction` one of `asc` / `desc`.
    pub fn order_by_dir(&mut self, column: &str, direction: &str) -> &mut Self {
        match SortDirection::parse(direction) {
            Some(direction) => self.push_order(column, direction),
            None => {
                self.state.defer(BuildError::Validation(format!(
                    "unsupported sort direction '{direction}'"
                )));
                self
            }
        }
    }

    fn push_order(&mut self, column: &str, direction: SortDirection) -> &mut Self {
        self.state.order.push(OrderTerm {
            column: format_column(column),
            direction,
        });
        self
    }

    /// `GROUP BY columns`. Replaces any previous grouping.
    pub fn group_by(&mut self, columns: impl ColumnList) -> &mut Self {
        let formatted = format_columns(columns);
        self.state.group_by = (!formatted.is_empty()).then_some(formatted);
        self
    }

    /// `LIMIT count`.
    pub fn limit(&mut self, count: u64) -> &mut Self {
        self.state.limit.count = Some(count);
        self
    }

    /// `LIMIT offset, count`.
    pub fn limit_range(&mut self, offset: u64, count: u64) -> &mut Self {
        self.state.limit.offset = Some(offset);
        self.state.limit.count = Some(count);
        self
    }

    /// Skip `offset` rows. Without a limit, every remaining row is returned.
    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.state.limit.offset = Some(offset);
        self
    }

    // ==================== Pure compilation ====================

    /// Compile the accumulated state without executing or resetting.
    ///
    /// [`BuildMode::Update`] needs assignments, which only [`update`](Self::update)
    /// generates, so it fails here.
    pub fn build(&self, mode: BuildMode) -> QbResult<BuiltQuery> {
        self.state.build(mode)
    }

    /// SELECT SQL with bind keys, for inspection. Does not validate.
    pub fn to_sql(&self) -> String {
        render(&self.state, BuildMode::SelectAll, Placeholders::Keys)
    }

    /// Values bound so far.
    pub fn bindings(&self) -> &Bindings {
        &self.state.bindings
    }

    // ==================== Terminal operations ====================

    /// Hand the accumulated state to a terminal operation and leave a fresh one.
    fn take_state(&mut self) -> QueryState {
        std::mem::take(&mut self.state)
    }

    fn run(&mut self, mode: BuildMode) -> QbResult<ExecutionResult> {
        let built = self.take_state().into_built(mode).inspect_err(|err| {
            tracing::warn!(target: SQL_TARGET, mode = mode.as_str(), error = %err, "statement rejected");
        })?;
        self.execute(mode.as_str(), built.sql(), built.bindings())
    }

    fn execute(&self, op: &'static str, sql: &str, bindings: &Bindings) -> QbResult<ExecutionResult> {
        tracing::debug!(target: SQL_TARGET, op, bindings = bindings.len(), sql, "executing statement");
        self.conn.execute(sql, bindings).inspect_err(|err| {
            tracing::warn!(target: SQL_TARGET, op, error = %err, "statement failed");
        })
    }

    /// Fetch every matching row.
    pub fn get(&mut self) -> QbResult<Vec<Row>> {
        Ok(self.run(BuildMode::SelectAll)?.fetch_all())
    }

    /// Fetch the first matching row (`LIMIT 1`).
    pub fn first(&mut self) -> QbResult<Option<Row>> {
        Ok(self.run(BuildMode::SelectSingle)?.fetch_one())
    }

    /// First column of the first matching row.
    pub fn scalar(&mut self) -> QbResult<Option<Value>> {
        Ok(self.run(BuildMode::SelectAll)?.fetch_scalar())
    }

    /// `COUNT(*)` of matching rows. LIMIT is ignored.
    pub fn count(&mut self) -> QbResult<i64> {
        match self.run(BuildMode::Count)?.fetch_scalar() {
            Some(value) => i64::from_value(&value).map_err(|msg| QbError::decode("aggregate", msg)),
            None => Ok(0),
        }
    }

    /// Insert one row from `(column, value)` pairs; returns the generated identifier.
    ///
    /// Only the table is kept. Accumulated predicates, joins and their bindings are
    /// discarded, as in [`all`](Self::all); a pending misuse error is still reported.
    pub fn insert<I, K, V>(&mut self, values: I) -> QbResult<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let taken = self.take_state();
        let mut state = QueryState {
            table: taken.table,
            build_error: taken.build_error,
            ..QueryState::default()
        };
        let mut columns = Vec::new();
        let mut keys = Vec::new();
        for (column, value) in values {
            let column = column.as_ref();
            keys.push(state.bind("ins", column, value.into()));
            columns.push(format_column(column));
        }
        state.validate()?;
        if columns.is_empty() {
            return Err(QbError::validation("INSERT requires at least one value"));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            state.table,
            columns.join(", "),
            keys.join(", ")
        );
        self.execute("insert", &sql, &state.bindings)?;
        self.conn.last_insert_id()
    }

    /// Update matching rows from `(column, value)` pairs.
    ///
    /// Returns `true` when the connection reports success, even if no row matched.
    pub fn update<I, K, V>(&mut self, values: I) -> QbResult<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut state = self.take_state();
        for (column, value) in values {
            let column = column.as_ref();
            let key = state.bind("upt", column, value.into());
            state.assignments.push((format_column(column), key));
        }
        let built = state.into_built(BuildMode::Update)?;
        self.execute("update", built.sql(), built.bindings())?;
        Ok(true)
    }

    /// Delete matching rows; returns the affected-row count.
    pub fn delete(&mut self) -> QbResult<u64> {
        Ok(self.run(BuildMode::Delete)?.affected_row_count())
    }

    /// SELECT SQL with bound values written in place of keys.
    ///
    /// For display and logging only: text values are quoted but not escaped.
    pub fn to_raw_sql(&mut self) -> QbResult<String> {
        let state = self.take_state();
        state.validate()?;
        Ok(render(
            &state,
            BuildMode::SelectAll,
            Placeholders::Literals(&state.bindings),
        ))
    }

    /// Every row of the configured table, projecting `columns` (all when empty).
    ///
    /// Other accumulated clauses are discarded.
    pub fn all(&mut self, columns: impl ColumnList) -> QbResult<Vec<Row>> {
        let state = self.take_state();
        if state.table.is_empty() {
            return Err(QbError::MissingTable);
        }
        let columns = format_columns(columns);
        let projection = if columns.is_empty() { "*" } else { columns.as_str() };
        self.raw_query(&format!("SELECT {projection} FROM {}", state.table))
    }

    // ==================== Pass-through ====================

    /// Run hand-written SQL without bindings and return its rows.
    pub fn raw_query(&self, sql: &str) -> QbResult<Vec<Row>> {
        tracing::debug!(target: SQL_TARGET, op = "raw_query", sql, "executing statement");
        self.conn.query(sql)
    }

    /// Run hand-written SQL with named bindings.
    pub fn raw_execute(&self, sql: &str, bindings: &Bindings) -> QbResult<ExecutionResult> {
        self.execute("raw_execute", sql, bindings)
    }

    /// Run hand-written SQL without bindings; returns the affected-row count.
    pub fn exec_raw(&self, sql: &str) -> QbResult<u64> {
        tracing::debug!(target: SQL_TARGET, op = "exec_raw", sql, "executing statement");
        self.conn.exec(sql)
    }
}

impl<C: Connection + ?Sized> std::fmt::Debug for QueryBuilder<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Name a formatted table expression is referenced by: its alias when it has one.
fn reference_name(table: &str) -> &str {
    table.rsplit_once(" AS ").map_or(table, |(_, alias)| alias)
}
