//! Shared fixtures: a temporary SQLite profile table served read-only.

#![allow(dead_code)]

use profile_network_mcp::config::DatabaseConfig;
use profile_network_mcp::context::ServerContext;
use profile_network_mcp::db::{DbPool, PoolExecutor, ProfileExecutor};
use profile_network_mcp::models::{Row, TableName};
use rmcp::model::CallToolResult;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

pub const CREATE_TABLE: &str = "CREATE TABLE hs_linkedin_network (
    id INTEGER PRIMARY KEY,
    urn VARCHAR,
    username VARCHAR UNIQUE NOT NULL,
    first_name VARCHAR,
    last_name VARCHAR,
    is_creator BOOLEAN,
    is_open_to_work BOOLEAN,
    is_hiring BOOLEAN,
    profile_picture TEXT,
    summary TEXT,
    headline TEXT,
    city VARCHAR,
    country VARCHAR,
    fulltime_count INTEGER,
    internship_count INTEGER,
    is_headstarter_affiliated BOOLEAN,
    most_recent_company_name VARCHAR,
    most_recent_company_username VARCHAR,
    most_recent_company_title TEXT,
    most_recent_company_logo TEXT,
    most_recent_company_year VARCHAR,
    most_recent_school VARCHAR,
    most_recent_school_degree TEXT,
    most_recent_school_month INTEGER,
    most_recent_school_year INTEGER
)";

/// (id, username, first, last, creator, open, hiring, affiliated,
///  city, country, fulltime, internship, company, school)
type Seed = (
    i64,
    &'static str,
    &'static str,
    &'static str,
    bool,
    bool,
    bool,
    bool,
    Option<&'static str>,
    Option<&'static str>,
    Option<i64>,
    Option<i64>,
    Option<&'static str>,
    Option<&'static str>,
);

pub const PROFILES: [Seed; 5] = [
    (1, "jdoe", "John", "Doe", false, true, false, true,
        Some("New York"), Some("United States"), Some(3), Some(1), Some("Acme"), Some("MIT")),
    (2, "asmith", "Alice", "Smith", true, false, true, false,
        Some("York"), Some("United Kingdom"), Some(5), Some(0), Some("Globex"), Some("Oxford")),
    (3, "bchan", "Bob", "Chan", true, true, false, true,
        Some("Toronto"), Some("Canada"), Some(1), Some(2), Some("Acme Corp"), Some("Waterloo")),
    (4, "cnull", "Cara", "Null", false, false, false, false,
        None, None, None, Some(1), None, None),
    (5, "dlee", "Dan", "Lee", false, true, true, true,
        Some("new york"), Some("United States"), Some(0), Some(0), Some("100%_Pure"), None),
];

/// A seeded database file and a read-only context over it.
pub struct Fixture {
    pub ctx: Arc<ServerContext>,
    pub path: PathBuf,
}

impl Fixture {
    pub async fn seeded() -> Self {
        Self::build(true, false).await
    }

    pub async fn empty() -> Self {
        Self::build(false, false).await
    }

    pub async fn strict() -> Self {
        Self::build(true, true).await
    }

    async fn build(seed: bool, strict: bool) -> Self {
        let path = NamedTempFile::new()
            .unwrap()
            .into_temp_path()
            .keep()
            .unwrap();
        let url = format!("sqlite:{}", path.display());

        // Seed through a separate writable pool.
        let setup = sqlx::SqlitePool::connect(&url).await.unwrap();
        sqlx::query(CREATE_TABLE).execute(&setup).await.unwrap();
        if seed {
            for p in PROFILES {
                sqlx::query(
                    "INSERT INTO hs_linkedin_network (id, urn, username, first_name, last_name, \
                     is_creator, is_open_to_work, is_hiring, is_headstarter_affiliated, city, country, \
                     fulltime_count, internship_count, most_recent_company_name, most_recent_school, \
                     headline, most_recent_company_logo) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(p.0)
                .bind(format!("urn:li:member:{}", p.0))
                .bind(p.1)
                .bind(p.2)
                .bind(p.3)
                .bind(p.4)
                .bind(p.5)
                .bind(p.6)
                .bind(p.7)
                .bind(p.8)
                .bind(p.9)
                .bind(p.10)
                .bind(p.11)
                .bind(p.12)
                .bind(p.13)
                .bind(format!("{} {} headline", p.2, p.3))
                .bind("https://example.com/logo.png")
                .execute(&setup)
                .await
                .unwrap();
            }
        }
        setup.close().await;

        let config = DatabaseConfig::parse(&url).unwrap();
        let pool = DbPool::connect(&config, Duration::from_secs(5))
            .await
            .unwrap();
        let executor: Arc<dyn ProfileExecutor> = Arc::new(PoolExecutor::new(
            pool,
            Duration::from_secs(5),
            1000,
        ));
        let ctx = ServerContext::new(executor, TableName::default()).with_strict_sql(strict);
        Self {
            ctx: Arc::new(ctx),
            path,
        }
    }

    pub async fn teardown(self) {
        self.ctx.executor.close().await;
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Text of the first content block.
pub fn body(result: &CallToolResult) -> String {
    result.content[0]
        .as_text()
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error == Some(true)
}

/// Parse a rows envelope.
pub fn rows(result: &CallToolResult) -> Vec<Row> {
    assert!(!is_error(result), "unexpected error: {}", body(result));
    serde_json::from_str(&body(result)).unwrap()
}

pub fn usernames(result: &CallToolResult) -> Vec<String> {
    rows(result)
        .iter()
        .map(|r| r["username"].as_str().unwrap_or_default().to_string())
        .collect()
}
