//! Uniform tool and resource responses.
//!
//! Tool failures are never raised to the protocol layer. They come back as a
//! text block with the error flag set, prefixed according to the error kind.
//! Resource reads never set an error flag; failures are folded into the text.

use crate::error::{DbError, ErrorKind};
use crate::models::Row;
use rmcp::model::{CallToolResult, Content, ReadResourceResult, ResourceContents};

/// Prefix used for refused raw statements.
pub const SECURITY_PREFIX: &str = "Security Error";
/// Prefix used for validation failures.
pub const VALIDATION_PREFIX: &str = "Error";

/// Success envelope carrying rows as pretty-printed JSON.
pub fn rows(rows: &[Row]) -> CallToolResult {
    match serde_json::to_string_pretty(rows) {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => failure(
            "Error serializing results",
            &DbError::internal(e.to_string()),
        ),
    }
}

/// Success envelope carrying one row.
pub fn row(row: &Row) -> CallToolResult {
    match serde_json::to_string_pretty(row) {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => failure(
            "Error serializing results",
            &DbError::internal(e.to_string()),
        ),
    }
}

/// Success envelope carrying plain text.
pub fn text(message: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(message.into())])
}

/// Render an error as envelope text.
///
/// `execution_prefix` names the failed operation and is only used for
/// execution errors.
pub fn error_text(execution_prefix: &str, err: &DbError) -> String {
    let prefix = match err.kind() {
        ErrorKind::Validation => VALIDATION_PREFIX,
        ErrorKind::Security => SECURITY_PREFIX,
        ErrorKind::Execution => execution_prefix,
    };
    format!("{}: {}", prefix, err.message())
}

/// Error envelope for a failed tool call.
pub fn failure(execution_prefix: &str, err: &DbError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(error_text(execution_prefix, err))])
}

/// Error envelope for arguments that did not match the tool's schema.
pub fn invalid_parameters(detail: impl std::fmt::Display) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!(
        "{}: Invalid parameters: {}",
        VALIDATION_PREFIX, detail
    ))])
}

/// Resource body; always a success at the protocol level.
pub fn resource(uri: &str, text: impl Into<String>) -> ReadResourceResult {
    ReadResourceResult {
        contents: vec![ResourceContents::text(text.into(), uri)],
    }
}
