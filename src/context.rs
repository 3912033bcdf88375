//! Shared state handed to every protocol session.

use crate::db::ProfileExecutor;
use crate::models::{MAX_ROW_LIMIT, SqlDialect, TableName};
use std::sync::Arc;

/// Read-only state shared by all sessions.
///
/// Built once at startup; sessions only ever hold it through an `Arc`.
#[derive(Clone)]
pub struct ServerContext {
    pub executor: Arc<dyn ProfileExecutor>,
    pub table: TableName,
    pub strict_sql: bool,
    /// Ceiling applied to every caller-supplied limit.
    pub max_rows: u32,
}

impl ServerContext {
    pub fn new(executor: Arc<dyn ProfileExecutor>, table: TableName) -> Self {
        Self {
            executor,
            table,
            strict_sql: false,
            max_rows: MAX_ROW_LIMIT,
        }
    }

    pub fn with_strict_sql(mut self, strict: bool) -> Self {
        self.strict_sql = strict;
        self
    }

    pub fn with_max_rows(mut self, max_rows: u32) -> Self {
        self.max_rows = max_rows.max(1);
        self
    }

    pub fn dialect(&self) -> SqlDialect {
        self.executor.dialect()
    }

    /// Parser dialect for raw SQL validation, when strict mode is on.
    pub fn strict_dialect(&self) -> Option<SqlDialect> {
        self.strict_sql.then(|| self.dialect())
    }
}

impl std::fmt::Debug for ServerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerContext")
            .field("dialect", &self.dialect())
            .field("table", &self.table)
            .field("strict_sql", &self.strict_sql)
            .field("max_rows", &self.max_rows)
            .finish()
    }
}
