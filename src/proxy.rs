//! Free-text prompt proxy.
//!
//! Forwards a caller's prompt to the OpenAI Responses API with this server
//! attached as an MCP tool, then relays the model's text output. The proxy
//! never builds SQL itself.

use crate::models::{ColumnGroup, ProfileColumn, TableName};
use crate::tools::TOOL_NAMES;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Label the LLM sees for this server's tool.
pub const SERVER_LABEL: &str = "profile-network-mcp";

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Proxy configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Failed to parse upstream response: {0}")]
    Decode(String),
}

/// Settings for the proxy, taken from the server configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// URL the LLM provider uses to reach this server's MCP endpoint.
    pub mcp_url: String,
    pub table: TableName,
}

/// Body accepted by the proxy route.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: String,
    pub tools: Vec<McpToolSpec>,
}

/// An `mcp` tool entry for the Responses API.
#[derive(Debug, Clone, Serialize)]
pub struct McpToolSpec {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub server_label: String,
    pub server_url: String,
    pub require_approval: ApprovalPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalPolicy {
    pub never: ToolFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolFilter {
    pub tool_names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct UpstreamErrorBody {
    error: UpstreamErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
struct UpstreamErrorDetail {
    message: String,
}

impl ResponsesResponse {
    /// Concatenated `output_text` blocks of all message items.
    fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content.iter())
            .filter(|block| block.content_type == "output_text")
            .filter_map(|block| block.text.as_deref())
            .collect()
    }
}

/// Describe the profile table for the model, one section per column group.
pub fn schema_prompt(table: &TableName) -> String {
    let mut out = format!(
        "You have access to a database table called '{}' through the {} server with the following schema:\n",
        table, SERVER_LABEL
    );
    for group in ColumnGroup::ALL {
        let _ = write!(out, "\n- {}:\n", group.title());
        for column in ProfileColumn::ALL.iter().filter(|c| c.group() == group) {
            let (sql_type, description) = column.describe();
            let _ = writeln!(out, "  * {} ({}): {}", column, sql_type, description);
        }
    }
    out
}

/// Wrap a user prompt in the instruction block sent upstream.
pub fn format_prompt(table: &TableName, prompt: &str) -> String {
    format!(
        "<INSTRUCTIONS>\n\
         You are a helpful assistant that finds information about people in a professional network.\n\
         {schema}\n\
         Use this schema to answer questions about their careers, education and professional status.\n\
         Focus on information relevant to the user's query.\n\
         Do NOT include {logo} in your response.\n\
         </INSTRUCTIONS>\n\
         \n\
         Here is the user's query:\n\
         <USER_QUERY>\n\
         {prompt}\n\
         </USER_QUERY>\n",
        schema = schema_prompt(table),
        logo = ProfileColumn::MostRecentCompanyLogo,
        prompt = prompt,
    )
}

/// Relays prompts to the LLM provider.
pub struct PromptProxy {
    config: ProxyConfig,
    http_client: reqwest::Client,
}

impl PromptProxy {
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        if config.api_key.trim().is_empty() {
            return Err(ProxyError::Config("API key cannot be empty".to_string()));
        }
        let http_client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Request body sent to the Responses API.
    pub fn build_request(&self, prompt: &str) -> ResponsesRequest {
        ResponsesRequest {
            model: self.config.model.clone(),
            input: format_prompt(&self.config.table, prompt),
            tools: vec![McpToolSpec {
                tool_type: "mcp".to_string(),
                server_label: SERVER_LABEL.to_string(),
                server_url: self.config.mcp_url.clone(),
                require_approval: ApprovalPolicy {
                    never: ToolFilter {
                        tool_names: TOOL_NAMES.iter().map(|s| s.to_string()).collect(),
                    },
                },
            }],
        }
    }

    /// Forward a prompt and return the model's text output.
    pub async fn forward(&self, prompt: &str) -> Result<String, ProxyError> {
        let url = format!("{}/v1/responses", self.config.base_url.trim_end_matches('/'));

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
                .map_err(|_| ProxyError::Config("Invalid API key format".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        info!(model = %self.config.model, server_label = SERVER_LABEL, "Sending prompt upstream");

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<UpstreamErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| ProxyError::Decode(e.to_string()))?;
        let output = parsed.output_text();
        debug!(output_len = output.len(), "Received upstream response");
        Ok(output)
    }
}

fn error_body(status: StatusCode, error: &str, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// `POST {proxy-path}` handler.
pub async fn handle_prompt(
    State(proxy): State<Arc<PromptProxy>>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Rejected proxy request");
            return error_body(
                StatusCode::BAD_REQUEST,
                "Invalid request",
                rejection.body_text(),
            );
        }
    };

    info!(prompt_len = request.prompt.len(), "Received prompt");
    match proxy.forward(&request.prompt).await {
        Ok(output) => (
            StatusCode::OK,
            Json(serde_json::json!({ "output": output })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Prompt proxy failed");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                e.to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProxyConfig {
        ProxyConfig {
            api_key: "sk-test".to_string(),
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4.1".to_string(),
            mcp_url: "https://example.com/mcp".to_string(),
            table: TableName::default(),
        }
    }

    #[test]
    fn test_rejects_empty_key() {
        let mut cfg = config();
        cfg.api_key = "  ".to_string();
        assert!(matches!(PromptProxy::new(cfg), Err(ProxyError::Config(_))));
    }

    #[test]
    fn test_schema_prompt_lists_every_column() {
        let text = schema_prompt(&TableName::default());
        assert!(text.contains("'hs_linkedin_network'"));
        for column in ProfileColumn::ALL {
            assert!(text.contains(&format!("* {} (", column)), "{column}");
        }
        for group in ColumnGroup::ALL {
            assert!(text.contains(group.title()));
        }
    }

    #[test]
    fn test_request_shape() {
        let proxy = PromptProxy::new(config()).unwrap();
        let body = serde_json::to_value(proxy.build_request("who is hiring?")).unwrap();
        assert_eq!(body["model"], "gpt-4.1");
        assert_eq!(body["tools"][0]["type"], "mcp");
        assert_eq!(body["tools"][0]["server_label"], SERVER_LABEL);
        assert_eq!(body["tools"][0]["server_url"], "https://example.com/mcp");
        let names = body["tools"][0]["require_approval"]["never"]["tool_names"]
            .as_array()
            .unwrap();
        assert_eq!(names.len(), TOOL_NAMES.len());
        let input = body["input"].as_str().unwrap();
        assert!(input.contains("<USER_QUERY>\nwho is hiring?\n</USER_QUERY>"));
    }

    #[test]
    fn test_output_text_joins_message_blocks() {
        let parsed: ResponsesResponse = serde_json::from_value(serde_json::json!({
            "output": [
                {"type": "mcp_list_tools", "tools": []},
                {"type": "mcp_call", "name": "search-profiles"},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "Found "},
                    {"type": "refusal", "refusal": "x"},
                    {"type": "output_text", "text": "3 people."}
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(parsed.output_text(), "Found 3 people.");
    }
}
