use super::shorten_sql;
use super::types::{HookAction, QueryContext, QueryHook, QueryType};
use tracing::Level;

/// Logs every statement before it runs, under target `fluentql.sql`.
///
/// The logged SQL carries bind keys only, never bound values. As a hook it fires
/// whether or not monitoring is enabled.
///
/// ```ignore
/// use fluentql::monitor::{QueryType, TracingSqlHook};
/// use tracing::Level;
///
/// // writes only, at INFO, whole SQL
/// let hook = TracingSqlHook::new()
///     .level(Level::INFO)
///     .only([QueryType::Insert, QueryType::Update, QueryType::Delete])
///     .no_truncate();
/// ```
#[derive(Debug, Clone)]
pub struct TracingSqlHook {
    level: Level,
    max_sql_length: Option<usize>,
    kinds: Option<Vec<QueryType>>,
}

impl Default for TracingSqlHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            kinds: None,
        }
    }
}

impl TracingSqlHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Cut logged SQL after `len` bytes (on a char boundary).
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Log only statements of the given kinds.
    pub fn only(mut self, kinds: impl IntoIterator<Item = QueryType>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub(crate) fn logs(&self, kind: QueryType) -> bool {
        self.kinds.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        shorten_sql(sql, self.max_sql_length).into_owned()
    }
}

macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl QueryHook for TracingSqlHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        if !self.logs(ctx.query_type) {
            return HookAction::Continue;
        }

        let sql = shorten_sql(&ctx.sql, self.max_sql_length);
        emit_at_level!(
            self.level,
            target: "fluentql.sql",
            kind = ctx.query_type.as_str(),
            tag = ctx.tag.as_deref().unwrap_or("-"),
            bind_keys = ctx.binding_count,
            fields = ?ctx.fields,
            sql = %sql,
            "statement"
        );
        HookAction::Continue
    }
}
