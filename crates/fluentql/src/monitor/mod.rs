//! Statement monitoring and hooks.
//!
//! [`InstrumentedConnection`] wraps any [`Connection`](crate::Connection) and:
//! - runs a [`QueryHook`] before each statement (inspect, rewrite or abort),
//! - times each statement and reports it to a [`QueryMonitor`],
//! - flags statements slower than [`MonitorConfig::slow_query_threshold`].
//!
//! # Example
//!
//! ```rust,ignore
//! use fluentql::monitor::{InstrumentedConnection, LoggingMonitor, MonitorConfig, TracingSqlHook};
//! use std::time::Duration;
//!
//! let config = MonitorConfig::new()
//!     .with_slow_query_threshold(Duration::from_millis(100))
//!     .enable_monitoring();
//!
//! let conn = InstrumentedConnection::new(sqlite)
//!     .with_config(config)
//!     .with_monitor(LoggingMonitor::new())
//!     .with_hook(TracingSqlHook::new());
//! ```

use std::borrow::Cow;

mod config;
mod instrumented;
mod monitors;
mod tracing_hook;
mod types;


pub use config::MonitorConfig;
pub use instrumented::InstrumentedConnection;
pub use monitors::{
    CompositeHook, CompositeMonitor, LoggingMonitor, NoopMonitor, QueryStats, StatsMonitor,
};
pub use tracing_hook::TracingSqlHook;
pub use types::{HookAction, QueryContext, QueryHook, QueryMonitor, QueryResult, QueryType};

/// `sql` cut after `max` bytes with a `...` marker; unchanged when short enough.
pub(crate) fn shorten_sql(sql: &str, max: Option<usize>) -> Cow<'_, str> {
    match max {
        Some(max) if sql.len() > max => {
            Cow::Owned(format!("{}...", truncate_sql_bytes(sql, max)))
        }
        _ => Cow::Borrowed(sql),
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
