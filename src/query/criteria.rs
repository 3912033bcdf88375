//! Filter criteria accepted by each tool.
//!
//! Every field is optional. A present field means "apply this predicate";
//! an absent one leaves that dimension unconstrained. An empty string counts
//! as absent; any other string is matched as given.

use schemars::JsonSchema;
use serde::Deserialize;

/// Per-operation default row caps.
pub const RAW_QUERY_DEFAULT_LIMIT: u32 = 100;
pub const SEARCH_DEFAULT_LIMIT: u32 = 25;
pub const LOCATION_DEFAULT_LIMIT: u32 = 50;
pub const OPEN_TO_WORK_DEFAULT_LIMIT: u32 = 50;
pub const HIRING_DEFAULT_LIMIT: u32 = 50;
pub const CREATOR_DEFAULT_LIMIT: u32 = 50;
pub const AFFILIATED_DEFAULT_LIMIT: u32 = 100;

/// Value of an optional string filter, `None` when empty.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Input for the raw-query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawQueryInput {
    /// The SQL query to execute against the profile table. Must start with SELECT.
    pub query: String,
    /// Maximum number of rows to return (default: 100)
    #[serde(default)]
    #[schemars(extend("default" = RAW_QUERY_DEFAULT_LIMIT))]
    pub limit: Option<u32>,
}

/// Input for the get-profile tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetProfileInput {
    /// Username or URN to search for
    pub identifier: String,
}

/// Input for the search-profiles tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchProfilesInput {
    /// Filter by users open to work
    #[serde(default)]
    pub is_open_to_work: Option<bool>,
    /// Filter by users who are hiring
    #[serde(default)]
    pub is_hiring: Option<bool>,
    /// Filter by creator status
    #[serde(default)]
    pub is_creator: Option<bool>,
    /// Filter by Headstarter affiliation
    #[serde(default, alias = "isHeadstarterAffiliated")]
    pub is_affiliated: Option<bool>,
    /// Filter by city (partial match)
    #[serde(default)]
    pub city: Option<String>,
    /// Filter by country (partial match)
    #[serde(default)]
    pub country: Option<String>,
    /// Filter by most recent company name (partial match)
    #[serde(default)]
    pub company: Option<String>,
    /// Filter by most recent school (partial match)
    #[serde(default)]
    pub school: Option<String>,
    /// Minimum number of full-time experiences
    #[serde(default)]
    pub min_fulltime_experience: Option<u32>,
    /// Minimum number of internship experiences
    #[serde(default)]
    pub min_internship_experience: Option<u32>,
    /// Maximum number of profiles to return (default: 25)
    #[serde(default)]
    #[schemars(extend("default" = SEARCH_DEFAULT_LIMIT))]
    pub limit: Option<u32>,
}

/// Input for the profiles-by-location tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    /// City name (partial match supported)
    #[serde(default)]
    pub city: Option<String>,
    /// Country name (partial match supported)
    #[serde(default)]
    pub country: Option<String>,
    /// Whether to use exact match or partial match for location (default: false)
    #[serde(default)]
    #[schemars(extend("default" = false))]
    pub exact_match: bool,
    /// Maximum number of profiles to return (default: 50)
    #[serde(default)]
    #[schemars(extend("default" = LOCATION_DEFAULT_LIMIT))]
    pub limit: Option<u32>,
}

/// Input for the open-to-work-profiles tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenToWorkInput {
    /// Filter by city
    #[serde(default)]
    pub city: Option<String>,
    /// Filter by country
    #[serde(default)]
    pub country: Option<String>,
    /// Filter by most recent company
    #[serde(default)]
    pub company: Option<String>,
    /// Minimum total experience (fulltime + internship count)
    #[serde(default)]
    pub min_experience: Option<u32>,
    /// Maximum number of profiles to return (default: 50)
    #[serde(default)]
    #[schemars(extend("default" = OPEN_TO_WORK_DEFAULT_LIMIT))]
    pub limit: Option<u32>,
}

/// Input for the hiring-profiles tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HiringInput {
    /// Filter by city
    #[serde(default)]
    pub city: Option<String>,
    /// Filter by country
    #[serde(default)]
    pub country: Option<String>,
    /// Filter by company name
    #[serde(default)]
    pub company: Option<String>,
    /// Maximum number of profiles to return (default: 50)
    #[serde(default)]
    #[schemars(extend("default" = HIRING_DEFAULT_LIMIT))]
    pub limit: Option<u32>,
}

/// Input for the creator-profiles tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorInput {
    /// Filter by city
    #[serde(default)]
    pub city: Option<String>,
    /// Filter by country
    #[serde(default)]
    pub country: Option<String>,
    /// Filter by company name
    #[serde(default)]
    pub company: Option<String>,
    /// Filter by Headstarter affiliation
    #[serde(default, alias = "isHeadstarterAffiliated")]
    pub is_affiliated: Option<bool>,
    /// Maximum number of profiles to return (default: 50)
    #[serde(default)]
    #[schemars(extend("default" = CREATOR_DEFAULT_LIMIT))]
    pub limit: Option<u32>,
}

/// Input for the affiliated-profiles tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AffiliatedInput {
    /// Filter by users open to work
    #[serde(default)]
    pub is_open_to_work: Option<bool>,
    /// Filter by users who are hiring
    #[serde(default)]
    pub is_hiring: Option<bool>,
    /// Filter by creator status
    #[serde(default)]
    pub is_creator: Option<bool>,
    /// Filter by city
    #[serde(default)]
    pub city: Option<String>,
    /// Filter by country
    #[serde(default)]
    pub country: Option<String>,
    /// Maximum number of profiles to return (default: 100)
    #[serde(default)]
    #[schemars(extend("default" = AFFILIATED_DEFAULT_LIMIT))]
    pub limit: Option<u32>,
}
