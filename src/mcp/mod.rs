//! MCP server integration module.
//!
//! Connects the MCP protocol to the profile tool and resource handlers
//! using the rmcp framework.

pub mod service;

pub use service::ProfileService;
