//! Integration tests for the prompt proxy against a mocked Responses API.

use profile_network_mcp::context::ServerContext;
use profile_network_mcp::db::{ProfileExecutor, RowSet};
use profile_network_mcp::error::DbResult;
use profile_network_mcp::models::{SqlDialect, Statement, TableName};
use profile_network_mcp::proxy::{PromptProxy, ProxyConfig, ProxyError};
use profile_network_mcp::transport::HttpTransport;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

struct NoRows;

#[async_trait::async_trait]
impl ProfileExecutor for NoRows {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Postgres
    }

    async fn fetch(&self, _statement: &Statement) -> DbResult<RowSet> {
        Ok(RowSet::empty())
    }
}

fn proxy(base_url: &str) -> PromptProxy {
    PromptProxy::new(ProxyConfig {
        api_key: "sk-test".to_string(),
        base_url: base_url.to_string(),
        model: "gpt-4.1".to_string(),
        mcp_url: "https://profiles.example.com/mcp".to_string(),
        table: TableName::default(),
    })
    .unwrap()
}

fn reply(text: &str) -> String {
    json!({
        "id": "resp_1",
        "output": [
            {"type": "mcp_call", "name": "search-profiles", "output": "[]"},
            {"type": "message", "role": "assistant", "content": [
                {"type": "output_text", "text": text}
            ]}
        ]
    })
    .to_string()
}

/// Serve the HTTP transport on an ephemeral port and return its base URL.
async fn serve(proxy: PromptProxy) -> String {
    let ctx = Arc::new(ServerContext::new(Arc::new(NoRows), TableName::default()));
    let app = HttpTransport::new(ctx, "127.0.0.1", 0, "/mcp")
        .with_proxy(Arc::new(proxy), "/prompt")
        .router();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_forward_returns_output_text() {
    let mut upstream = mockito::Server::new_async().await;
    let mock = upstream
        .mock("POST", "/v1/responses")
        .match_header("authorization", "Bearer sk-test")
        .match_body(mockito::Matcher::PartialJson(json!({"model": "gpt-4.1"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply("Two people are hiring."))
        .create_async()
        .await;

    let output = proxy(&upstream.url()).forward("who is hiring?").await.unwrap();
    assert_eq!(output, "Two people are hiring.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_forward_surfaces_upstream_error_message() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("POST", "/v1/responses")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
        .create_async()
        .await;

    let err = proxy(&upstream.url()).forward("anyone?").await.unwrap_err();
    match err {
        ProxyError::Upstream { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_route_relays_output() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("POST", "/v1/responses")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply("Dan Lee is open to work."))
        .create_async()
        .await;

    let base = serve(proxy(&upstream.url())).await;
    let response = reqwest::Client::new()
        .post(format!("{}/prompt", base))
        .json(&json!({"prompt": "who is open to work in New York?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["output"], "Dan Lee is open to work.");
}

#[tokio::test]
async fn test_route_rejects_malformed_body() {
    let upstream = mockito::Server::new_async().await;
    let base = serve(proxy(&upstream.url())).await;

    let response = reqwest::Client::new()
        .post(format!("{}/prompt", base))
        .header("content-type", "application/json")
        .body(r#"{"question": "missing prompt field"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request");
}

#[tokio::test]
async fn test_route_reports_upstream_failure() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("POST", "/v1/responses")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let base = serve(proxy(&upstream.url())).await;
    let response = reqwest::Client::new()
        .post(format!("{}/prompt", base))
        .json(&json!({"prompt": "hello"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal server error");
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("upstream exploded")
    );
}
