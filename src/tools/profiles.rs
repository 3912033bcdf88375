//! Profile tool handlers.
//!
//! One method per tool. Each renders its query for the configured table and
//! dialect, runs it through the shared executor and wraps the outcome in an
//! envelope. Nothing here returns an error to the caller.

use crate::context::ServerContext;
use crate::db::normalize;
use crate::error::DbResult;
use crate::models::{Row, Statement, effective_limit};
use crate::query::builder;
use crate::query::criteria::RAW_QUERY_DEFAULT_LIMIT;
use crate::query::{
    AffiliatedInput, CreatorInput, GetProfileInput, HiringInput, LocationInput, OpenToWorkInput,
    QueryDescriptor, RawQueryInput, SearchProfilesInput,
};
use crate::tools::envelope;
use crate::tools::guard::guard_raw_query;
use rmcp::model::CallToolResult;
use std::sync::Arc;
use tracing::{debug, info, warn};

const RAW_QUERY_ERROR: &str = "SQL Error";
const GET_PROFILE_ERROR: &str = "Error fetching profile";
const SEARCH_ERROR: &str = "Error searching profiles";
const LOCATION_ERROR: &str = "Error getting profiles by location";
const OPEN_TO_WORK_ERROR: &str = "Error getting open to work profiles";
const HIRING_ERROR: &str = "Error getting hiring profiles";
const CREATOR_ERROR: &str = "Error getting creator profiles";
const AFFILIATED_ERROR: &str = "Error getting affiliated profiles";

/// Longest SQL prefix written to the log.
const LOGGED_SQL_CHARS: usize = 120;

/// Handler for the profile tools.
pub struct ProfileToolHandler {
    ctx: Arc<ServerContext>,
}

impl ProfileToolHandler {
    pub fn new(ctx: Arc<ServerContext>) -> Self {
        Self { ctx }
    }

    async fn fetch(&self, statement: &Statement) -> DbResult<Vec<Row>> {
        let set = self.ctx.executor.fetch(statement).await?;
        Ok(normalize(set))
    }

    async fn run(&self, descriptor: &QueryDescriptor) -> DbResult<Vec<Row>> {
        let statement = descriptor.render(&self.ctx.table, self.ctx.dialect());
        self.fetch(&statement).await
    }

    /// Shared path for the list-returning tools.
    async fn list(
        &self,
        tool: &'static str,
        error_prefix: &str,
        descriptor: DbResult<QueryDescriptor>,
    ) -> CallToolResult {
        let descriptor = match descriptor {
            Ok(d) => d,
            Err(e) => {
                debug!(tool, error = %e, "Rejected tool arguments");
                return envelope::failure(error_prefix, &e);
            }
        };

        match self.run(&descriptor).await {
            Ok(rows) => {
                info!(
                    tool,
                    rows = rows.len(),
                    limit = descriptor.limit(),
                    filters = descriptor.predicates().len(),
                    "Tool complete"
                );
                envelope::rows(&rows)
            }
            Err(e) => {
                warn!(tool, error = %e, "Tool failed");
                envelope::failure(error_prefix, &e)
            }
        }
    }

    /// Run caller-written SQL after the read-only guard.
    pub async fn raw_query(&self, input: RawQueryInput) -> CallToolResult {
        let limit = effective_limit(input.limit, RAW_QUERY_DEFAULT_LIMIT, self.ctx.max_rows);
        let guarded = match guard_raw_query(&input.query, limit, self.ctx.strict_dialect()) {
            Ok(g) => g,
            Err(e) => {
                warn!(
                    tool = "raw-query",
                    query = %abbreviate(&input.query),
                    error = %e,
                    "Refused raw query"
                );
                return envelope::failure(RAW_QUERY_ERROR, &e);
            }
        };

        info!(
            tool = "raw-query",
            query = %abbreviate(&guarded.sql),
            limit,
            limit_appended = guarded.limit_appended,
            "Executing raw query"
        );

        match self.fetch(&Statement::raw(guarded.sql)).await {
            Ok(rows) => {
                info!(tool = "raw-query", rows = rows.len(), "Tool complete");
                envelope::rows(&rows)
            }
            Err(e) => {
                warn!(tool = "raw-query", error = %e, "Raw query failed");
                envelope::failure(RAW_QUERY_ERROR, &e)
            }
        }
    }

    /// Look up one profile by username or URN.
    ///
    /// No match is a success with an explanatory message.
    pub async fn get_profile(&self, input: GetProfileInput) -> CallToolResult {
        let descriptor = builder::get_profile(&input);
        let identifier = input.identifier.as_str();

        match self.run(&descriptor).await {
            Ok(rows) => match rows.first() {
                Some(row) => {
                    info!(tool = "get-profile", "Profile found");
                    envelope::row(row)
                }
                None => {
                    info!(tool = "get-profile", identifier, "No profile found");
                    envelope::text(format!("No profile found with identifier: {}", identifier))
                }
            },
            Err(e) => {
                warn!(tool = "get-profile", error = %e, "Tool failed");
                envelope::failure(GET_PROFILE_ERROR, &e)
            }
        }
    }

    pub async fn search_profiles(&self, input: SearchProfilesInput) -> CallToolResult {
        let descriptor = builder::search_profiles(&input, self.ctx.max_rows);
        self.list("search-profiles", SEARCH_ERROR, Ok(descriptor))
            .await
    }

    pub async fn profiles_by_location(&self, input: LocationInput) -> CallToolResult {
        let descriptor = builder::profiles_by_location(&input, self.ctx.max_rows);
        self.list("profiles-by-location", LOCATION_ERROR, descriptor)
            .await
    }

    pub async fn open_to_work_profiles(&self, input: OpenToWorkInput) -> CallToolResult {
        let descriptor = builder::open_to_work_profiles(&input, self.ctx.max_rows);
        self.list("open-to-work-profiles", OPEN_TO_WORK_ERROR, Ok(descriptor))
            .await
    }

    pub async fn hiring_profiles(&self, input: HiringInput) -> CallToolResult {
        let descriptor = builder::hiring_profiles(&input, self.ctx.max_rows);
        self.list("hiring-profiles", HIRING_ERROR, Ok(descriptor))
            .await
    }

    pub async fn creator_profiles(&self, input: CreatorInput) -> CallToolResult {
        let descriptor = builder::creator_profiles(&input, self.ctx.max_rows);
        self.list("creator-profiles", CREATOR_ERROR, Ok(descriptor))
            .await
    }

    pub async fn affiliated_profiles(&self, input: AffiliatedInput) -> CallToolResult {
        let descriptor = builder::affiliated_profiles(&input, self.ctx.max_rows);
        self.list("affiliated-profiles", AFFILIATED_ERROR, Ok(descriptor))
            .await
    }
}

/// First few characters of a statement, for logging.
fn abbreviate(sql: &str) -> String {
    let sql = sql.trim();
    match sql.char_indices().nth(LOGGED_SQL_CHARS) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}
