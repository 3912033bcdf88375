//! Query execution engine.
//!
//! This module provides the executor the tools run statements through:
//! - Prepared, positionally bound statements only
//! - Row ceiling (enforced via streaming - only fetches needed rows)
//! - Per-statement timeout
//!
//! # Architecture
//!
//! `ProfileExecutor` is the seam between the tools and the database. The
//! pool-backed implementation dispatches to database-specific submodules:
//! - `postgres`: PostgreSQL fetch and parameter binding
//! - `sqlite`: SQLite fetch and parameter binding

use crate::db::normalize::RowSet;
use crate::db::pool::DbPool;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{QueryParam, Row, SqlDialect, Statement};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs rendered statements against the profile table's database.
#[async_trait]
pub trait ProfileExecutor: Send + Sync {
    /// SQL flavour statements must be rendered in.
    fn dialect(&self) -> SqlDialect;

    /// Run one read statement and return its rows.
    async fn fetch(&self, statement: &Statement) -> DbResult<RowSet>;

    /// Release held resources. Called once at shutdown.
    async fn close(&self) {}
}

/// Executor backed by a connection pool.
#[derive(Debug, Clone)]
pub struct PoolExecutor {
    pool: DbPool,
    query_timeout: Duration,
    max_rows: u32,
}

impl PoolExecutor {
    pub fn new(pool: DbPool, query_timeout: Duration, max_rows: u32) -> Self {
        Self {
            pool,
            query_timeout,
            max_rows: max_rows.max(1),
        }
    }

    pub fn max_rows(&self) -> u32 {
        self.max_rows
    }
}

#[async_trait]
impl ProfileExecutor for PoolExecutor {
    fn dialect(&self) -> SqlDialect {
        self.pool.dialect()
    }

    async fn fetch(&self, statement: &Statement) -> DbResult<RowSet> {
        let start = Instant::now();

        debug!(
            sql = %statement.sql,
            params = statement.params.len(),
            max_rows = self.max_rows,
            timeout_secs = self.query_timeout.as_secs(),
            "Executing statement"
        );

        let rows = match &self.pool {
            DbPool::Postgres(p) => {
                let rows =
                    postgres::fetch_rows(p, statement, self.max_rows, self.query_timeout).await?;
                process_rows(rows, self.max_rows)
            }
            DbPool::SQLite(p) => {
                let rows =
                    sqlite::fetch_rows(p, statement, self.max_rows, self.query_timeout).await?;
                process_rows(rows, self.max_rows)
            }
        };

        debug!(
            rows = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Statement complete"
        );
        Ok(RowSet::Rows(rows))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Convert fetched rows to JSON, dropping anything past the ceiling.
fn process_rows<R: RowToJson>(rows: Vec<R>, max_rows: u32) -> Vec<Row> {
    let total_rows = rows.len();
    if total_rows > max_rows as usize {
        warn!(total_rows, limit = max_rows, "Result truncated at the row ceiling");
    }
    rows.iter()
        .take(max_rows as usize)
        .map(RowToJson::to_json_map)
        .collect()
}

// =============================================================================
// Common Helper Functions
// =============================================================================

fn collect_rows<R>(results: Vec<Result<R, sqlx::Error>>) -> DbResult<Vec<R>> {
    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        rows.push(result.map_err(DbError::from)?);
    }
    Ok(rows)
}

fn timeout_error(operation: &str, timeout: Duration) -> DbError {
    DbError::timeout(operation, timeout.as_secs())
}

/// Saturate an integer bind to INT4, the type of the profile counters.
/// A clamped threshold still compares correctly against any INT4 value.
fn int4_param(v: i64) -> i32 {
    i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX })
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================
//
// Each module below provides the same interface adapted to its database type.
// One extra row is fetched so truncation can be detected.

mod postgres {
    use super::*;
    use sqlx::PgPool;
    use sqlx::postgres::{PgArguments, PgRow};

    pub async fn fetch_rows(
        pool: &PgPool,
        statement: &Statement,
        max_rows: u32,
        query_timeout: Duration,
    ) -> DbResult<Vec<PgRow>> {
        let fetch_limit = max_rows as usize + 1;
        let mut query = sqlx::query(&statement.sql);
        for param in &statement.params {
            query = bind_param(query, param);
        }
        let rows_future = query.fetch(pool).take(fetch_limit).collect::<Vec<_>>();

        match timeout(query_timeout, rows_future).await {
            Ok(results) => collect_rows(results),
            Err(_) => Err(timeout_error("query execution", query_timeout)),
        }
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
        param: &'q QueryParam,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
        match param {
            QueryParam::Null => query.bind(None::<String>),
            QueryParam::Bool(v) => query.bind(*v),
            QueryParam::Int(v) => query.bind(int4_param(*v)),
            QueryParam::Text(v) => query.bind(v.as_str()),
        }
    }
}

mod sqlite {
    use super::*;
    use sqlx::SqlitePool;
    use sqlx::sqlite::{SqliteArguments, SqliteRow};

    pub async fn fetch_rows(
        pool: &SqlitePool,
        statement: &Statement,
        max_rows: u32,
        query_timeout: Duration,
    ) -> DbResult<Vec<SqliteRow>> {
        let fetch_limit = max_rows as usize + 1;
        let mut query = sqlx::query(&statement.sql);
        for param in &statement.params {
            query = bind_param(query, param);
        }
        let rows_future = query.fetch(pool).take(fetch_limit).collect::<Vec<_>>();

        match timeout(query_timeout, rows_future).await {
            Ok(results) => collect_rows(results),
            Err(_) => Err(timeout_error("query execution", query_timeout)),
        }
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
        param: &'q QueryParam,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
        match param {
            QueryParam::Null => query.bind(None::<String>),
            QueryParam::Bool(v) => query.bind(*v),
            QueryParam::Int(v) => query.bind(*v),
            QueryParam::Text(v) => query.bind(v.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use tempfile::NamedTempFile;

    #[test]
    fn test_int4_param_saturates() {
        assert_eq!(int4_param(3), 3);
        assert_eq!(int4_param(i64::from(u32::MAX)), i32::MAX);
        assert_eq!(int4_param(i64::from(i32::MAX) + 1), i32::MAX);
        assert_eq!(int4_param(i64::MIN), i32::MIN);
    }

    async fn seeded_executor(max_rows: u32) -> (PoolExecutor, std::path::PathBuf) {
        let path = NamedTempFile::new().unwrap().into_temp_path().keep().unwrap();
        let url = format!("sqlite:{}", path.display());

        let setup = sqlx::SqlitePool::connect(&url).await.unwrap();
        sqlx::query(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT, active BOOLEAN, score REAL, created TIMESTAMP, raw BLOB)",
        )
        .execute(&setup)
        .await
        .unwrap();
        for i in 1..=5 {
            sqlx::query("INSERT INTO items (id, name, active, score, created, raw) VALUES (?, ?, ?, ?, ?, ?)")
                .bind(i)
                .bind(format!("item-{i}"))
                .bind(i % 2 == 0)
                .bind(i as f64 / 2.0)
                .bind("2024-05-01 10:00:00")
                .bind(vec![0xFFu8, i as u8])
                .execute(&setup)
                .await
                .unwrap();
        }
        setup.close().await;

        let config = DatabaseConfig::parse(&url).unwrap();
        let pool = DbPool::connect(&config, Duration::from_secs(5)).await.unwrap();
        (PoolExecutor::new(pool, Duration::from_secs(5), max_rows), path)
    }

    fn rows(set: RowSet) -> Vec<Row> {
        crate::db::normalize::normalize(set)
    }

    #[tokio::test]
    async fn test_fetch_with_bound_params() {
        let (executor, path) = seeded_executor(100).await;
        let stmt = Statement::raw("SELECT id, name, active FROM items WHERE active = ? AND id >= ? ORDER BY id")
            .with_param(true)
            .with_param(3u32);
        let result = rows(executor.fetch(&stmt).await.unwrap());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["id"], 4);
        assert_eq!(result[0]["name"], "item-4");
        assert_eq!(result[0]["active"], true);
        executor.close().await;
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_value_conversion() {
        let (executor, path) = seeded_executor(100).await;
        let stmt = Statement::raw("SELECT score, created, raw, COUNT(*) AS n FROM items WHERE id = 1");
        let result = rows(executor.fetch(&stmt).await.unwrap());
        assert_eq!(result[0]["score"], 0.5);
        assert_eq!(result[0]["created"], "2024-05-01 10:00:00");
        assert_eq!(result[0]["raw"], "/wE=");
        assert_eq!(result[0]["n"], 1);
        executor.close().await;
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_row_ceiling_truncates() {
        let (executor, path) = seeded_executor(2).await;
        let result = rows(
            executor
                .fetch(&Statement::raw("SELECT id FROM items ORDER BY id"))
                .await
                .unwrap(),
        );
        assert_eq!(result.len(), 2);
        assert_eq!(executor.max_rows(), 2);
        executor.close().await;
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_database_error_surfaces() {
        let (executor, path) = seeded_executor(10).await;
        let err = executor
            .fetch(&Statement::raw("SELECT nope FROM items"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Database { .. }));
        assert!(err.message().contains("nope"));
        executor.close().await;
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_writes_are_refused() {
        let (executor, path) = seeded_executor(10).await;
        let result = executor
            .fetch(&Statement::raw("DELETE FROM items"))
            .await;
        assert!(result.is_err());
        let count = rows(
            executor
                .fetch(&Statement::raw("SELECT COUNT(*) AS n FROM items"))
                .await
                .unwrap(),
        );
        assert_eq!(count[0]["n"], 5);
        executor.close().await;
        let _ = std::fs::remove_file(path);
    }
}
