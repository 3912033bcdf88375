//! Profile Network MCP Server Library
//!
//! This library exposes a single professional-network profile table to AI
//! assistants through MCP (Model Context Protocol) tools and resources, plus
//! an optional HTTP proxy that relays free-text prompts to an LLM.

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod proxy;
pub mod query;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use context::ServerContext;
pub use error::DbError;
pub use mcp::ProfileService;
