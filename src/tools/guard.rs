//! Read-only guard for caller-supplied SQL.
//!
//! The default check is textual: the trimmed statement must start with
//! `SELECT` (any case), and a `LIMIT` clause is appended unless the text
//! already contains the word `limit` anywhere. The substring test can be
//! fooled by a string literal or a subquery limit; that is accepted.
//!
//! Strict mode additionally parses the statement with sqlparser and accepts
//! exactly one query statement.

use crate::error::{DbError, DbResult};
use crate::models::SqlDialect;
use sqlparser::ast::{SetExpr, Statement};
use sqlparser::dialect::{Dialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

const SELECT_ONLY: &str = "Only SELECT queries are allowed. Query must start with 'SELECT'.";

/// A raw statement that passed the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedQuery {
    /// Statement to execute.
    pub sql: String,
    /// Whether `LIMIT n` was appended.
    pub limit_appended: bool,
}

/// Check `query` and bound it to `limit` rows.
///
/// `strict` selects the parser dialect when strict validation is enabled.
/// Nothing here touches the database.
pub fn guard_raw_query(query: &str, limit: u32, strict: Option<SqlDialect>) -> DbResult<GuardedQuery> {
    let trimmed = query.trim();
    if !trimmed.to_lowercase().starts_with("select") {
        return Err(DbError::security(SELECT_ONLY));
    }

    let body = trimmed.trim_end_matches(|c: char| c == ';' || c.is_whitespace());

    if let Some(dialect) = strict {
        validate_single_select(body, dialect)?;
    }

    if body.to_lowercase().contains("limit") {
        Ok(GuardedQuery {
            sql: body.to_string(),
            limit_appended: false,
        })
    } else {
        Ok(GuardedQuery {
            sql: format!("{} LIMIT {}", body, limit),
            limit_appended: true,
        })
    }
}

fn parser_dialect(dialect: SqlDialect) -> Box<dyn Dialect> {
    match dialect {
        SqlDialect::Postgres => Box::new(PostgreSqlDialect {}),
        SqlDialect::Sqlite => Box::new(SQLiteDialect {}),
    }
}

/// Parse-based check: exactly one query statement, no `SELECT ... INTO`.
pub fn validate_single_select(sql: &str, dialect: SqlDialect) -> DbResult<()> {
    let parser = parser_dialect(dialect);
    let statements = Parser::parse_sql(parser.as_ref(), sql)
        .map_err(|e| DbError::security(format!("Failed to parse SQL statement: {}", e)))?;

    match statements.as_slice() {
        [] => Err(DbError::security("Empty SQL statement")),
        [Statement::Query(query)] => {
            if let SetExpr::Select(select) = query.body.as_ref()
                && select.into.is_some()
            {
                return Err(DbError::security("SELECT ... INTO is not allowed"));
            }
            Ok(())
        }
        [_] => Err(DbError::security(SELECT_ONLY)),
        _ => Err(DbError::security(
            "Multiple statements are not allowed. Submit a single SELECT query.",
        )),
    }
}
