use super::config::MonitorConfig;
use super::monitors::{CompositeHook, NoopMonitor};
use super::types::{HookAction, QueryContext, QueryHook, QueryMonitor, QueryResult, QueryType};
use crate::client::{Connection, ExecutionResult};
use crate::error::{QbError, QbResult};
use crate::row::Row;
use crate::value::{Bindings, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A [`Connection`] wrapper that runs hooks and reports to monitors.
///
/// Hooks always run. Monitors only receive events once monitoring is enabled via
/// [`MonitorConfig::enable_monitoring`] or [`enable_monitoring`](Self::enable_monitoring).
///
/// # Example
/// ```ignore
/// use fluentql::monitor::{InstrumentedConnection, MonitorConfig, StatsMonitor};
/// use fluentql::QueryBuilder;
/// use std::time::Duration;
///
/// let conn = InstrumentedConnection::new(sqlite)
///     .with_config(
///         MonitorConfig::new()
///             .with_slow_query_threshold(Duration::from_millis(50))
///             .enable_monitoring(),
///     )
///     .with_monitor(StatsMonitor::new());
///
/// let rows = QueryBuilder::new(&conn).table("users").get()?;
/// ```
pub struct InstrumentedConnection<C> {
    conn: C,
    monitor: Arc<dyn QueryMonitor>,
    hook: Option<Arc<dyn QueryHook>>,
    config: MonitorConfig,
}

impl<C: Connection> InstrumentedConnection<C> {
    /// Wrap `conn` with no hooks and monitoring disabled.
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            monitor: Arc::new(NoopMonitor),
            hook: None,
            config: MonitorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_monitor<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitor = Arc::new(monitor);
        self
    }

    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Replace any hook with `hook`.
    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Add a hook after any existing one.
    pub fn add_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_hook_arc(Arc::new(hook))
    }

    pub fn add_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = Some(match self.hook.take() {
            None => hook,
            Some(existing) => Arc::new(CompositeHook::new().add_arc(existing).add_arc(hook)),
        });
        self
    }

    pub fn enable_monitoring(mut self) -> Self {
        self.config.monitoring_enabled = true;
        self
    }

    pub fn disable_monitoring(mut self) -> Self {
        self.config.monitoring_enabled = false;
        self
    }

    pub fn is_monitoring_enabled(&self) -> bool {
        self.config.monitoring_enabled
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut MonitorConfig {
        &mut self.config
    }

    pub fn inner(&self) -> &C {
        &self.conn
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    /// Like [`Connection::execute`], with `tag` attached to the reported context.
    pub fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        bindings: &Bindings,
    ) -> QbResult<ExecutionResult> {
        self.execute_inner(sql, bindings, Some(tag))
    }

    fn apply_hook(&self, ctx: &mut QueryContext) -> QbResult<()> {
        let Some(hook) = &self.hook else {
            return Ok(());
        };

        match hook.before_query(ctx) {
            HookAction::Continue => Ok(()),
            HookAction::ModifySql(sql) => {
                ctx.query_type = QueryType::from_sql(&sql);
                ctx.sql = sql;
                Ok(())
            }
            HookAction::Abort(reason) => Err(QbError::validation(format!(
                "statement aborted by hook: {reason}"
            ))),
        }
    }

    fn report_result(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        if !self.config.monitoring_enabled {
            return;
        }

        if let Some(hook) = &self.hook {
            hook.after_query(ctx, duration, result);
        }

        self.monitor.on_query_complete(ctx, duration, result);

        if self.config.is_slow(duration) {
            self.monitor.on_slow_query(ctx, duration);
        }
    }

    /// Hook, time, run and report one statement.
    fn instrument<T>(
        &self,
        mut ctx: QueryContext,
        run: impl FnOnce(&str) -> QbResult<T>,
        summarize: impl FnOnce(&T) -> QueryResult,
    ) -> QbResult<T> {
        self.apply_hook(&mut ctx)?;

        if self.config.monitoring_enabled {
            self.monitor.on_query_start(&ctx);
        }

        let start = Instant::now();
        let result = run(&ctx.sql);
        let duration = start.elapsed();

        let query_result = match &result {
            Ok(value) => summarize(value),
            Err(e) => QueryResult::error(e.to_string()),
        };

        self.report_result(&ctx, duration, &query_result);
        result
    }

    fn execute_inner(
        &self,
        sql: &str,
        bindings: &Bindings,
        tag: Option<&str>,
    ) -> QbResult<ExecutionResult> {
        let mut ctx = QueryContext::new(sql, bindings.len());
        if let Some(tag) = tag {
            ctx.tag = Some(tag.to_string());
        }
        self.instrument(
            ctx,
            |sql| self.conn.execute(sql, bindings),
            |result| {
                if result.row_count() > 0 {
                    QueryResult::Rows(result.row_count())
                } else {
                    QueryResult::Affected(result.affected_row_count())
                }
            },
        )
    }
}

impl<C: Connection> Connection for InstrumentedConnection<C> {
    fn query(&self, sql: &str) -> QbResult<Vec<Row>> {
        self.instrument(
            QueryContext::new(sql, 0),
            |sql| self.conn.query(sql),
            |rows| QueryResult::Rows(rows.len()),
        )
    }

    fn exec(&self, sql: &str) -> QbResult<u64> {
        self.instrument(
            QueryContext::new(sql, 0),
            |sql| self.conn.exec(sql),
            |n| QueryResult::Affected(*n),
        )
    }

    fn execute(&self, sql: &str, bindings: &Bindings) -> QbResult<ExecutionResult> {
        self.execute_inner(sql, bindings, None)
    }

    fn last_insert_id(&self) -> QbResult<Value> {
        self.conn.last_insert_id()
    }
}
