//! Typed clause fragments accumulated by the builder.
//!
//! Column and table names are stored already formatted; bind keys are stored as
//! generated. Rendering happens in [`super::compile`].

use super::state::QueryState;

/// How a predicate attaches to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn as_str(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }

    /// Prefix for bind keys of plain comparisons (`wa` / `wo`).
    pub(crate) fn key_kind(self) -> &'static str {
        match self {
            Connector::And => "wa",
            Connector::Or => "wo",
        }
    }
}

/// Comparison operators accepted by `where_op` / `or_where_op`.
const COMPARISON_OPERATORS: &[&str] = &[
    "=", "!=", "<>", "<", "<=", ">", ">=", "<=>", "LIKE", "NOT LIKE",
];

/// Normalize a caller-supplied comparison operator.
///
/// Keywords are matched case-insensitively and inner whitespace is collapsed, so
/// `"not  like"` becomes `NOT LIKE`. Unknown operators yield `None`.
pub(crate) fn normalize_operator(op: &str) -> Option<&'static str> {
    let normalized = op
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();
    COMPARISON_OPERATORS
        .iter()
        .copied()
        .find(|candidate| *candidate == normalized)
}

/// Relation between a column and a subquery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubqueryOp {
    /// `column = (SELECT ...)`
    Eq,
    /// `column != (SELECT ...)`
    Ne,
    /// `column IN (SELECT ...)`
    In,
    /// `column NOT IN (SELECT ...)`
    NotIn,
}

impl SubqueryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            SubqueryOp::Eq => "=",
            SubqueryOp::Ne => "!=",
            SubqueryOp::In => "IN",
            SubqueryOp::NotIn => "NOT IN",
        }
    }
}

/// Right-hand side of a subquery predicate.
#[derive(Debug)]
pub(crate) enum SubquerySource {
    /// A child builder's accumulated state, compiled as a plain SELECT.
    Query(Box<QueryState>),
    /// Caller-supplied SQL, inserted verbatim.
    Raw(String),
}

#[derive(Debug)]
pub(crate) enum PredicateNode {
    Compare {
        column: String,
        op: &'static str,
        key: String,
    },
    InList {
        column: String,
        keys: Vec<String>,
        negated: bool,
    },
    Between {
        column: String,
        start: String,
        end: String,
    },
    NullCheck {
        column: String,
        negated: bool,
    },
    /// Inserted verbatim. May reference bind keys generated by `where_raw_bind`.
    Raw(String),
    Group(Vec<Predicate>),
    Subquery {
        column: String,
        op: SubqueryOp,
        source: SubquerySource,
    },
}

#[derive(Debug)]
pub(crate) struct Predicate {
    pub connector: Connector,
    pub node: PredicateNode,
}

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Plain,
    Inner,
    Left,
    Right,
    Cross,
    Outer,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Plain => "JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Cross => "CROSS JOIN",
            JoinKind::Outer => "OUTER JOIN",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub on: String,
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Parse `asc` / `desc` in any case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct OrderTerm {
    pub column: String,
    pub direction: SortDirection,
}

/// Largest row count every supported dialect accepts in `LIMIT`.
pub(crate) const UNBOUNDED_LIMIT: u64 = i64::MAX as u64;

/// `LIMIT N` or `LIMIT offset, N`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LimitClause {
    pub count: Option<u64>,
    pub offset: Option<u64>,
}

impl LimitClause {
    pub fn is_empty(&self) -> bool {
        self.count.is_none() && self.offset.is_none()
    }

    /// Text after the `LIMIT` keyword, if any.
    pub fn render(&self) -> Option<String> {
        match (self.offset, self.count) {
            (None, None) => None,
            (None, Some(count)) => Some(count.to_string()),
            (Some(offset), count) => Some(format!(
                "{offset}, {}",
                count.unwrap_or(UNBOUNDED_LIMIT)
            )),
        }
    }
}
