//! Accumulated statement state and bind-key generation.

use super::clause::{Join, LimitClause, OrderTerm, Predicate};
use crate::error::QbError;
use crate::ident::key_fragment;
use crate::value::{Bindings, Value};

/// Monotonic counter that numbers bind keys.
///
/// One counter is shared by a builder and every sub-builder created under it: the
/// parent hands its counter to the child and takes it back after the callback, so
/// keys stay unique across the whole statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindCounter(u32);

impl BindCounter {
    /// Counter whose next key will be numbered `value + 1`.
    pub fn starting_at(value: u32) -> Self {
        Self(value)
    }

    /// Last number handed out (0 if none yet).
    pub fn current(self) -> u32 {
        self.0
    }

    /// Generate the next key: `:<kind><n>_<column>`.
    pub(crate) fn key(&mut self, kind: &str, column: &str) -> String {
        self.0 += 1;
        format!(":{kind}{}_{}", self.0, key_fragment(column))
    }
}

/// Misuse recorded by a fluent call, reported by the next build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BuildError {
    Validation(String),
    Collision(String),
    MissingTable,
}

impl BuildError {
    pub fn to_error(&self) -> QbError {
        match self {
            BuildError::Validation(msg) => QbError::Validation(msg.clone()),
            BuildError::Collision(key) => QbError::BindingCollision(key.clone()),
            BuildError::MissingTable => QbError::MissingTable,
        }
    }

    pub fn from_error(err: QbError) -> Self {
        match err {
            QbError::BindingCollision(key) => BuildError::Collision(key),
            QbError::MissingTable => BuildError::MissingTable,
            QbError::Validation(msg) => BuildError::Validation(msg),
            other => BuildError::Validation(other.to_string()),
        }
    }
}

/// Everything a builder has accumulated for the statement in progress.
///
/// `Default` is the freshly-reset state; terminal operations `mem::take` it.
#[derive(Debug, Default)]
pub(crate) struct QueryState {
    /// Formatted table expression (empty until `table()` is called).
    pub table: String,
    /// Formatted projection fragments.
    pub columns: Vec<String>,
    pub predicates: Vec<Predicate>,
    pub joins: Vec<Join>,
    pub order: Vec<OrderTerm>,
    /// Formatted GROUP BY column.
    pub group_by: Option<String>,
    pub limit: LimitClause,
    /// `(formatted column, bind key)` pairs for UPDATE ... SET.
    pub assignments: Vec<(String, String)>,
    pub bindings: Bindings,
    pub counter: BindCounter,
    pub build_error: Option<BuildError>,
}

impl QueryState {
    /// State for a sub-builder continuing `counter`.
    pub fn with_counter(counter: BindCounter) -> Self {
        Self {
            counter,
            ..Self::default()
        }
    }

    /// Remember the first misuse; later ones are dropped.
    pub fn defer(&mut self, err: BuildError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    /// Generate a key of `kind` for `column` and bind `value` under it.
    pub fn bind(&mut self, kind: &str, column: &str, value: Value) -> String {
        let key = self.counter.key(kind, column);
        if let Err(err) = self.bindings.bind(key.clone(), value) {
            self.defer(BuildError::from_error(err));
        }
        key
    }

    /// Fail with the recorded misuse, or when no table has been set.
    pub fn validate(&self) -> Result<(), QbError> {
        if let Some(err) = &self.build_error {
            return Err(err.to_error());
        }
        if self.table.is_empty() {
            return Err(QbError::MissingTable);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_numbered_and_sanitized() {
        let mut counter = BindCounter::default();
        assert_eq!(counter.key("wa", "id"), ":wa1_id");
        assert_eq!(counter.key("wo", "users.id"), ":wo2_users_id");
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn counter_continues_from_start() {
        let mut counter = BindCounter::starting_at(4);
        assert_eq!(counter.key("wi", "x"), ":wi5_x");
    }

    #[test]
    fn first_misuse_wins() {
        let mut state = QueryState::default();
        state.defer(BuildError::Validation("first".into()));
        state.defer(BuildError::MissingTable);
        assert!(matches!(state.validate(), Err(QbError::Validation(m)) if m == "first"));
    }

    #[test]
    fn missing_table_is_reported() {
        let state = QueryState::default();
        assert!(matches!(state.validate(), Err(QbError::MissingTable)));
    }

    #[test]
    fn duplicate_key_is_deferred_as_collision() {
        let mut state = QueryState::default();
        state.table = "`t`".into();
        state.bindings.bind(":wa1_id", 1).unwrap();
        state.bind("wa", "id", Value::Int(2));
        assert!(state.validate().unwrap_err().is_binding_collision());
    }
}
