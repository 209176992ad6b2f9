//! Column and table formatting.
//!
//! [`format_columns`] turns loose column specifications into quoted SQL fragments:
//!
//! - `users` → `` `users` ``
//! - `u.name` → `` `u`.`name` ``
//! - `u.*` → `` `u`.* `` and `*` → `*`
//! - `name as n` / `name AS n` → `` `name` AS `n` ``
//! - `a.b, c as d` → `` `a`.`b`, `c` AS `d` ``
//!
//! Already-quoted input is accepted, so formatting twice gives the same result.
//! Quoting is cosmetic: identifiers are **not** escaped, and this module is not an
//! injection boundary. Only values passed through bindings are safe.
//!
//! # Example
//! ```ignore
//! use fluentql::ident::format_columns;
//!
//! assert_eq!(format_columns("a.b, c as d"), "`a`.`b`, `c` AS `d`");
//! assert_eq!(format_columns(["id", "u.*"]), "`id`, `u`.*");
//! ```

use regex::Regex;
use std::sync::LazyLock;

static ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\s+as\s+(.+)$").expect("alias pattern is valid")
});

/// A column specification: a single name, a comma-separated list, or a sequence.
pub trait ColumnList {
    /// Split into individual, trimmed, non-empty column expressions.
    fn column_parts(self) -> Vec<String>;
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

impl ColumnList for &str {
    fn column_parts(self) -> Vec<String> {
        split_list(self)
    }
}

impl ColumnList for String {
    fn column_parts(self) -> Vec<String> {
        split_list(&self)
    }
}

impl ColumnList for &String {
    fn column_parts(self) -> Vec<String> {
        split_list(self)
    }
}

impl ColumnList for &[&str] {
    fn column_parts(self) -> Vec<String> {
        self.iter().flat_map(|s| split_list(s)).collect()
    }
}

impl<const N: usize> ColumnList for [&str; N] {
    fn column_parts(self) -> Vec<String> {
        self.iter().flat_map(|s| split_list(s)).collect()
    }
}

impl ColumnList for Vec<&str> {
    fn column_parts(self) -> Vec<String> {
        self.as_slice().column_parts()
    }
}

impl ColumnList for Vec<String> {
    fn column_parts(self) -> Vec<String> {
        self.iter().flat_map(|s| split_list(s)).collect()
    }
}

/// Format a column specification into a comma-joined, quoted SQL fragment.
///
/// An empty specification yields an empty string; callers decide what that means
/// (the compiler substitutes `*` for an empty projection).
pub fn format_columns(columns: impl ColumnList) -> String {
    columns
        .column_parts()
        .iter()
        .map(|part| format_column(part))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format one column expression (no commas).
pub fn format_column(column: &str) -> String {
    let column = column.trim();
    if let Some(caps) = ALIAS.captures(column) {
        let (expr, alias) = (&caps[1], caps[2].trim());
        return format!("{} AS {}", format_dotted(expr), quote_part(alias));
    }
    format_dotted(column)
}

fn format_dotted(expr: &str) -> String {
    expr.trim()
        .split('.')
        .map(quote_part)
        .collect::<Vec<_>>()
        .join(".")
}

fn quote_part(part: &str) -> String {
    let name = part.trim().trim_matches('`');
    if name == "*" {
        name.to_string()
    } else {
        quote_identifier(name)
    }
}

/// Wrap a bare name in backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{name}`")
}

/// Bind-key-safe rendition of a column expression: every character that is not
/// ASCII alphanumeric or `_` becomes `_`.
pub(crate) fn key_fragment(column: &str) -> String {
    column
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
