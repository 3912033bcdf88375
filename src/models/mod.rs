//! Data models for the profile network server.
//!
//! This module re-exports all model types used throughout the application.

pub mod profile;
pub mod query;

pub use profile::{ColumnGroup, DEFAULT_PROFILE_TABLE, ProfileColumn, TableName};
pub use query::{
    DEFAULT_QUERY_TIMEOUT_SECS, MAX_ROW_LIMIT, QueryParam, Row, SqlDialect, Statement,
    effective_limit,
};
