//! MCP tool and resource implementations.
//!
//! - `guard`: read-only check for caller-written SQL
//! - `profiles`: the eight profile tools
//! - `resources`: schema and statistics resources
//! - `envelope`: uniform success/error responses

pub mod envelope;
pub mod guard;
pub mod profiles;
pub mod resources;

pub use profiles::ProfileToolHandler;
pub use resources::{RESOURCES, ResourceHandler, ResourceSpec};

pub const RAW_QUERY: &str = "raw-query";
pub const GET_PROFILE: &str = "get-profile";
pub const SEARCH_PROFILES: &str = "search-profiles";
pub const PROFILES_BY_LOCATION: &str = "profiles-by-location";
pub const OPEN_TO_WORK_PROFILES: &str = "open-to-work-profiles";
pub const HIRING_PROFILES: &str = "hiring-profiles";
pub const CREATOR_PROFILES: &str = "creator-profiles";
pub const AFFILIATED_PROFILES: &str = "affiliated-profiles";

/// Every tool the server registers.
pub const TOOL_NAMES: [&str; 8] = [
    RAW_QUERY,
    GET_PROFILE,
    SEARCH_PROFILES,
    PROFILES_BY_LOCATION,
    OPEN_TO_WORK_PROFILES,
    HIRING_PROFILES,
    CREATOR_PROFILES,
    AFFILIATED_PROFILES,
];
