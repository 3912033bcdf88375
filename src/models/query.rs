//! Query-related data models.
//!
//! This module defines the values shared by the query builder and the
//! database executor: bind parameters, rendered statements and row limits.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Hard ceiling on rows returned by a single statement.
pub const MAX_ROW_LIMIT: u32 = 1000;

/// Default query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// One result row: column name to unconverted column value.
pub type Row = serde_json::Map<String, JsonValue>;

/// SQL flavour a statement is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    Postgres,
    Sqlite,
}

impl SqlDialect {
    /// Positional placeholder for the `n`th bind parameter (1-based).
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Self::Postgres => format!("${}", n),
            Self::Sqlite => "?".to_string(),
        }
    }

    /// Case-insensitive pattern operator.
    ///
    /// SQLite's `LIKE` already ignores ASCII case.
    pub fn like_operator(&self) -> &'static str {
        match self {
            Self::Postgres => "ILIKE",
            Self::Sqlite => "LIKE",
        }
    }

    /// Resolve the dialect from a connection URL scheme.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgresql"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// A bind parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    /// NULL value
    Null,
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    Text(String),
}

impl From<bool> for QueryParam {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u32> for QueryParam {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for QueryParam {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Option<&str>> for QueryParam {
    fn from(v: Option<&str>) -> Self {
        v.map(Self::from).unwrap_or(Self::Null)
    }
}

/// A rendered SQL statement ready for execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl Statement {
    /// A statement without bind parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Add a parameter to this statement.
    pub fn with_param(mut self, param: impl Into<QueryParam>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Clamp a caller-supplied limit to `[1, ceiling]`, falling back to `default`.
pub fn effective_limit(requested: Option<u32>, default: u32, ceiling: u32) -> u32 {
    let ceiling = ceiling.max(1);
    requested.unwrap_or(default).clamp(1, ceiling)
}
