//! Read-only resources: live table schema and aggregate statistics.
//!
//! A database failure never surfaces as a protocol error here; it is
//! rendered into the resource text instead. Only an unknown URI is an error.

use crate::context::ServerContext;
use crate::db::normalize;
use crate::error::{DbError, DbResult};
use crate::models::{ProfileColumn, Row, SqlDialect, Statement, TableName};
use crate::tools::envelope;
use rmcp::model::ReadResourceResult;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, warn};

pub const SCHEMA_URI: &str = "schema://profile-network";
pub const STATS_URI: &str = "stats://profile-network";

/// A resource advertised by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const RESOURCES: [ResourceSpec; 2] = [
    ResourceSpec {
        uri: SCHEMA_URI,
        name: "profile-network-schema",
        description: "Column definitions of the profile network table",
    },
    ResourceSpec {
        uri: STATS_URI,
        name: "profile-network-stats",
        description: "Aggregate counts over the profile network table",
    },
];

/// Labelled aggregate columns, in display order.
const STAT_LINES: [(&str, &str); 8] = [
    ("total_profiles", "Total Profiles"),
    ("open_to_work_count", "Open to Work"),
    ("hiring_count", "Currently Hiring"),
    ("creator_count", "Creators"),
    ("affiliated_count", "Affiliated"),
    ("unique_cities", "Unique Cities"),
    ("unique_countries", "Unique Countries"),
    ("unique_companies", "Unique Companies"),
];

/// Column introspection statement for the configured table.
pub fn schema_statement(table: &TableName, dialect: SqlDialect) -> Statement {
    match dialect {
        SqlDialect::Postgres => Statement::raw(
            "SELECT column_name::text AS column_name, data_type::text AS data_type, \
             is_nullable::text AS is_nullable \
             FROM information_schema.columns \
             WHERE table_schema = COALESCE($1, current_schema()) AND table_name = $2 \
             ORDER BY ordinal_position",
        )
        .with_param(table.schema())
        .with_param(table.table()),
        SqlDialect::Sqlite => {
            let source = if table.schema().is_some() {
                "pragma_table_info(?, ?)"
            } else {
                "pragma_table_info(?)"
            };
            let statement = Statement::raw(format!(
                "SELECT name AS column_name, type AS data_type, \
                 CASE WHEN \"notnull\" = 0 THEN 'YES' ELSE 'NO' END AS is_nullable \
                 FROM {} ORDER BY cid",
                source
            ))
            .with_param(table.table());
            match table.schema() {
                Some(schema) => statement.with_param(schema),
                None => statement,
            }
        }
    }
}

/// Single-row aggregate statement for the configured table.
pub fn stats_statement(table: &TableName) -> Statement {
    let flag = |col: ProfileColumn| format!("COUNT(CASE WHEN {} = TRUE THEN 1 END)", col);
    Statement::raw(format!(
        "SELECT COUNT(*) AS total_profiles, \
         {} AS open_to_work_count, \
         {} AS hiring_count, \
         {} AS creator_count, \
         {} AS affiliated_count, \
         COUNT(DISTINCT {}) AS unique_cities, \
         COUNT(DISTINCT {}) AS unique_countries, \
         COUNT(DISTINCT {}) AS unique_companies \
         FROM {}",
        flag(ProfileColumn::IsOpenToWork),
        flag(ProfileColumn::IsHiring),
        flag(ProfileColumn::IsCreator),
        flag(ProfileColumn::IsHeadstarterAffiliated),
        ProfileColumn::City,
        ProfileColumn::Country,
        ProfileColumn::MostRecentCompanyName,
        table.qualified(),
    ))
}

/// Render introspected columns.
pub fn render_schema(table: &TableName, rows: &[Row]) -> String {
    if rows.is_empty() {
        return format!("No profile network table found ({})", table);
    }
    rows.iter().fold(
        format!("Profile Network Table ({}):\n", table),
        |mut acc, row| {
            let name = text_field(row, "column_name");
            let data_type = text_field(row, "data_type");
            let nullability = if text_field(row, "is_nullable").eq_ignore_ascii_case("YES") {
                "nullable"
            } else {
                "not null"
            };
            acc.push_str(&format!("Column: {} ({}, {})\n", name, data_type, nullability));
            acc
        },
    )
}

/// Render the aggregate row. Missing or null counts read as 0.
pub fn render_stats(rows: &[Row]) -> String {
    let empty = Row::new();
    let row = rows.first().unwrap_or(&empty);
    STAT_LINES
        .iter()
        .fold("Profile Network Statistics:".to_string(), |mut acc, (key, label)| {
            acc.push_str(&format!("\n{}: {}", label, count_field(row, key)));
            acc
        })
}

fn text_field(row: &Row, key: &str) -> String {
    match row.get(key) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn count_field(row: &Row, key: &str) -> i64 {
    match row.get(key) {
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(JsonValue::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Handler for resource reads.
pub struct ResourceHandler {
    ctx: Arc<ServerContext>,
}

impl ResourceHandler {
    pub fn new(ctx: Arc<ServerContext>) -> Self {
        Self { ctx }
    }

    async fn fetch(&self, statement: &Statement) -> DbResult<Vec<Row>> {
        Ok(normalize(self.ctx.executor.fetch(statement).await?))
    }

    /// Read a resource by URI.
    pub async fn read(&self, uri: &str) -> DbResult<ReadResourceResult> {
        match uri {
            SCHEMA_URI => Ok(envelope::resource(uri, self.schema_text().await)),
            STATS_URI => Ok(envelope::resource(uri, self.stats_text().await)),
            _ => Err(DbError::unknown_resource(uri)),
        }
    }

    async fn schema_text(&self) -> String {
        let statement = schema_statement(&self.ctx.table, self.ctx.dialect());
        match self.fetch(&statement).await {
            Ok(rows) => {
                info!(resource = SCHEMA_URI, columns = rows.len(), "Schema read");
                render_schema(&self.ctx.table, &rows)
            }
            Err(e) => {
                warn!(resource = SCHEMA_URI, error = %e, "Schema read failed");
                format!("Error fetching profile network schema: {}", e.message())
            }
        }
    }

    async fn stats_text(&self) -> String {
        match self.fetch(&stats_statement(&self.ctx.table)).await {
            Ok(rows) => {
                info!(resource = STATS_URI, "Stats read");
                render_stats(&rows)
            }
            Err(e) => {
                warn!(resource = STATS_URI, error = %e, "Stats read failed");
                format!("Error fetching profile network stats: {}", e.message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryParam;
    use serde_json::json;

    fn row(value: JsonValue) -> Row {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_schema_statement_postgres_binds_schema_and_table() {
        let table = TableName::parse("network.people").unwrap();
        let stmt = schema_statement(&table, SqlDialect::Postgres);
        assert!(stmt.sql.contains("COALESCE($1, current_schema())"));
        assert_eq!(
            stmt.params,
            vec![QueryParam::from("network"), QueryParam::from("people")]
        );

        let stmt = schema_statement(&TableName::default(), SqlDialect::Postgres);
        assert_eq!(stmt.params[0], QueryParam::Null);
    }

    #[test]
    fn test_schema_statement_sqlite() {
        let stmt = schema_statement(&TableName::default(), SqlDialect::Sqlite);
        assert!(stmt.sql.contains("pragma_table_info(?)"));
        assert_eq!(stmt.params, vec![QueryParam::from("hs_linkedin_network")]);
    }

    #[test]
    fn test_stats_statement_shape() {
        let stmt = stats_statement(&TableName::default());
        assert!(stmt.sql.ends_with("FROM hs_linkedin_network"));
        assert!(stmt.sql.contains("COUNT(CASE WHEN is_hiring = TRUE THEN 1 END) AS hiring_count"));
        assert!(stmt.sql.contains("COUNT(DISTINCT most_recent_company_name)"));
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_render_schema() {
        let rows = vec![
            row(json!({"column_name": "id", "data_type": "integer", "is_nullable": "NO"})),
            row(json!({"column_name": "city", "data_type": "text", "is_nullable": "YES"})),
        ];
        let text = render_schema(&TableName::default(), &rows);
        assert_eq!(
            text,
            "Profile Network Table (hs_linkedin_network):\n\
             Column: id (integer, not null)\n\
             Column: city (text, nullable)\n"
        );
        assert!(render_schema(&TableName::default(), &[]).starts_with("No profile network table"));
    }

    #[test]
    fn test_render_stats_nulls_and_missing_as_zero() {
        let rows = vec![row(json!({
            "total_profiles": 12,
            "open_to_work_count": "3",
            "hiring_count": null,
        }))];
        let text = render_stats(&rows);
        assert!(text.contains("Total Profiles: 12"));
        assert!(text.contains("Open to Work: 3"));
        assert!(text.contains("Currently Hiring: 0"));
        assert!(text.contains("Unique Companies: 0"));

        let text = render_stats(&[]);
        assert_eq!(text.matches(": 0").count(), STAT_LINES.len());
    }

    #[test]
    fn test_resource_catalog() {
        let uris: Vec<_> = RESOURCES.iter().map(|r| r.uri).collect();
        assert_eq!(uris, vec![SCHEMA_URI, STATS_URI]);
    }
}
