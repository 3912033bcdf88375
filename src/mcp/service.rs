//! MCP service implementation using rmcp.
//!
//! `ProfileService` registers the eight profile tools through rmcp's tool
//! macros and serves the two read-only resources. The `ServerHandler` impl is
//! written by hand so that malformed arguments come back as an error envelope
//! instead of a protocol error.

use crate::context::ServerContext;
use crate::query::{
    AffiliatedInput, CreatorInput, GetProfileInput, HiringInput, LocationInput, OpenToWorkInput,
    RawQueryInput, SearchProfilesInput,
};
use crate::tools::{
    AFFILIATED_PROFILES, CREATOR_PROFILES, GET_PROFILE, HIRING_PROFILES, OPEN_TO_WORK_PROFILES,
    PROFILES_BY_LOCATION, ProfileToolHandler, RAW_QUERY, RESOURCES, ResourceHandler,
    SEARCH_PROFILES, TOOL_NAMES, envelope,
};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::{ToolCallContext, ToolRouter},
    handler::server::wrapper::Parameters,
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, Implementation, ListResourcesResult,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, RawResource,
        JsonObject, ReadResourceRequestParam, ReadResourceResult, ServerCapabilities,
        ServerInfo,
    },
    service::RequestContext,
    tool, tool_router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

fn decode<T: DeserializeOwned>(arguments: serde_json::Value) -> Result<(), String> {
    serde_json::from_value::<T>(arguments)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Error envelope for arguments that do not decode into the tool's input,
/// `None` when they do.
pub fn argument_error(tool: &str, arguments: Option<&JsonObject>) -> Option<CallToolResult> {
    let value = serde_json::Value::Object(arguments.cloned().unwrap_or_default());
    let decoded = match tool {
        RAW_QUERY => decode::<RawQueryInput>(value),
        GET_PROFILE => decode::<GetProfileInput>(value),
        SEARCH_PROFILES => decode::<SearchProfilesInput>(value),
        PROFILES_BY_LOCATION => decode::<LocationInput>(value),
        OPEN_TO_WORK_PROFILES => decode::<OpenToWorkInput>(value),
        HIRING_PROFILES => decode::<HiringInput>(value),
        CREATOR_PROFILES => decode::<CreatorInput>(value),
        AFFILIATED_PROFILES => decode::<AffiliatedInput>(value),
        _ => Ok(()),
    };
    decoded.err().map(|message| {
        warn!(tool, error = %message, "Invalid tool arguments");
        envelope::invalid_parameters(message)
    })
}

#[derive(Clone)]
pub struct ProfileService {
    /// Shared executor, table and limits
    ctx: Arc<ServerContext>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl ProfileService {
    pub fn new(ctx: Arc<ServerContext>) -> Self {
        Self {
            ctx,
            tool_router: Self::tool_router(),
        }
    }

    fn tools(&self) -> ProfileToolHandler {
        ProfileToolHandler::new(self.ctx.clone())
    }

    /// Names of the registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect()
    }
}

#[tool_router]
impl ProfileService {
    #[tool(
        name = "raw-query",
        description = "Execute SELECT queries against the profile network table with automatic LIMIT protection.\nThe table holds professional profile data: personal info, work status, location, experience and education.\nOnly SELECT statements are allowed."
    )]
    async fn raw_query(
        &self,
        Parameters(input): Parameters<RawQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tools().raw_query(input).await)
    }

    #[tool(
        name = "get-profile",
        description = "Get a specific profile by username or URN.\nReturns complete profile information including personal details, work status, location, experience counts and most recent company/school."
    )]
    async fn get_profile(
        &self,
        Parameters(input): Parameters<GetProfileInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tools().get_profile(input).await)
    }

    #[tool(
        name = "search-profiles",
        description = "Advanced search of profiles with multiple filter options.\nFilter by work status (open to work, hiring), creator status, affiliation, location (city, country), company, school and experience levels."
    )]
    async fn search_profiles(
        &self,
        Parameters(input): Parameters<SearchProfilesInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tools().search_profiles(input).await)
    }

    #[tool(
        name = "profiles-by-location",
        description = "Get profiles from specific geographic locations.\nAt least one of city or country is required. Partial matching by default; set exactMatch for exact values."
    )]
    async fn profiles_by_location(
        &self,
        Parameters(input): Parameters<LocationInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tools().profiles_by_location(input).await)
    }

    #[tool(
        name = "open-to-work-profiles",
        description = "Get profiles of people who are currently open to work.\nUseful for finding available talent. Can filter by location, company and minimum total experience."
    )]
    async fn open_to_work_profiles(
        &self,
        Parameters(input): Parameters<OpenToWorkInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tools().open_to_work_profiles(input).await)
    }

    #[tool(
        name = "hiring-profiles",
        description = "Get profiles of people who are currently hiring.\nUseful for job seekers looking for hiring managers. Can filter by location and company."
    )]
    async fn hiring_profiles(
        &self,
        Parameters(input): Parameters<HiringInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tools().hiring_profiles(input).await)
    }

    #[tool(
        name = "creator-profiles",
        description = "Get profiles of content creators and thought leaders.\nCan filter by location, company and affiliation."
    )]
    async fn creator_profiles(
        &self,
        Parameters(input): Parameters<CreatorInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tools().creator_profiles(input).await)
    }

    #[tool(
        name = "affiliated-profiles",
        description = "Get profiles of people affiliated with the network's community.\nCan filter by work status, creator status and location."
    )]
    async fn affiliated_profiles(
        &self,
        Parameters(input): Parameters<AffiliatedInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.tools().affiliated_profiles(input).await)
    }
}

impl ServerHandler for ProfileService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "profile-network-mcp".to_owned(),
                title: Some("Profile Network MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(format!(
                "Read-only tools over the profile network table `{table}`.\n\
                \n\
                ## Workflow\n\
                1. Read `schema://profile-network` to see the columns\n\
                2. Prefer the structured tools (`search-profiles`, `profiles-by-location`, ...)\n\
                3. Use `raw-query` only for questions the structured tools cannot answer\n\
                \n\
                ## Limits\n\
                - Every result is capped at {max_rows} rows\n\
                - `raw-query` accepts SELECT statements only and appends a LIMIT when none is present",
                table = self.ctx.table,
                max_rows = self.ctx.max_rows,
            )),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tool_router.list_all()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.to_string();
        if !TOOL_NAMES.contains(&name.as_str()) {
            return Err(McpError::invalid_params(
                format!("Unknown tool: {}", name),
                None,
            ));
        }

        if let Some(result) = argument_error(&name, request.arguments.as_ref()) {
            return Ok(result);
        }

        debug!(tool = %name, "Tool call");
        let tcc = ToolCallContext::new(self, request, context);
        match self.tool_router.call(tcc).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(tool = %name, error = %e.message, "Invalid tool arguments");
                Ok(envelope::invalid_parameters(e.message))
            }
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = RESOURCES
            .iter()
            .map(|spec| {
                RawResource {
                    description: Some(spec.description.to_string()),
                    mime_type: Some("text/plain".to_string()),
                    ..RawResource::new(spec.uri, spec.name)
                }
                .no_annotation()
            })
            .collect();
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        ResourceHandler::new(self.ctx.clone())
            .read(&request.uri)
            .await
            .map_err(McpError::from)
    }
}
