//! Hosted web search tool.

mod results;

pub use results::{SearchHit, SearchResults};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::Tool;

/// Tool name for the web search tool.
pub const TOOL_TAVILY_SEARCH: &str = "tavily_search";

/// Default search API base URL.
pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// A web search backend returning normalized results.
///
/// **Interaction**: The RAG `websearch` node depends on this; [`TavilySearchTool`] is the
/// hosted implementation.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResults, ToolSourceError>;
}

/// Search API settings. Passed into [`TavilySearchTool::new`]; no global state.
#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_key: String,
    /// Base URL; `/search` is appended. Overridden in tests to point at a local server.
    pub base_url: String,
    pub max_results: usize,
}

impl TavilyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_TAVILY_BASE_URL.to_string(),
            max_results: 3,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Web search over the Tavily API.
///
/// Sends `POST {base_url}/search` with `{api_key, query, max_results}` and normalizes the
/// answer into [`SearchResults`].
///
/// # Interaction
///
/// - **reqwest::Client**: performs the HTTP request
/// - **ToolRegistry**: registers this tool by name "tavily_search"
/// - **WebSearchNode**: searches through the [`WebSearch`] impl
/// - **ExecuteToolsNode**: calls it as a [`Tool`] once per search query
pub struct TavilySearchTool {
    client: reqwest::Client,
    config: TavilyConfig,
}

impl TavilySearchTool {
    pub fn new(config: TavilyConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Uses a custom HTTP client (timeouts, proxies).
    pub fn with_client(client: reqwest::Client, config: TavilyConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &TavilyConfig {
        &self.config
    }

    /// Runs one query and returns normalized results.
    pub async fn search(&self, query: &str) -> Result<SearchResults, ToolSourceError> {
        if query.trim().is_empty() {
            return Err(ToolSourceError::InvalidInput("empty query".to_string()));
        }
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        tracing::debug!(query = %query, max_results = self.config.max_results, "web search");

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "api_key": self.config.api_key,
                "query": query,
                "max_results": self.config.max_results,
            }))
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ToolSourceError::Transport(format!(
                "request failed with status: {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("failed to read response: {}", e)))?;
        SearchResults::from_payload(payload)
    }
}

#[async_trait]
impl WebSearch for TavilySearchTool {
    async fn search(&self, query: &str) -> Result<SearchResults, ToolSourceError> {
        TavilySearchTool::search(self, query).await
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        TOOL_TAVILY_SEARCH
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_TAVILY_SEARCH.to_string(),
            description: Some(
                "A search engine optimized for comprehensive, accurate, and trusted results. \
                 Useful for answering questions about current events. Input should be a search query."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query to look up" }
                },
                "required": ["query"]
            }),
        }
    }

    /// Accepts `{"query": "..."}` or a bare JSON string.
    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let query = match &args {
            Value::String(s) => s.as_str(),
            _ => args
                .get("query")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolSourceError::InvalidInput("missing query".to_string()))?,
        };
        let results = self.search(query).await?;
        Ok(ToolCallContent::new(results.to_observation()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one HTTP response with `status` and `body`, returns the base URL.
    async fn serve_once(status: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            let reply = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn search_normalizes_envelope() {
        let body = json!({"results": [{"title": "t", "url": "u", "content": "Rust 1.0 shipped in 2015"}]});
        let base = serve_once("200 OK", body.to_string()).await;
        let tool = TavilySearchTool::new(TavilyConfig::new("k").with_base_url(base));
        let results = tool.search("rust release").await.unwrap();
        assert_eq!(results.joined_content(), "Rust 1.0 shipped in 2015");
    }

    #[tokio::test]
    async fn call_returns_json_observation() {
        let body = json!([{"content": "a"}]);
        let base = serve_once("200 OK", body.to_string()).await;
        let tool = TavilySearchTool::new(TavilyConfig::new("k").with_base_url(base));
        let out = tool.call(json!({"query": "q"})).await.unwrap();
        assert!(out.text.contains("\"content\":\"a\""));
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let base = serve_once("401 Unauthorized", "{}".to_string()).await;
        let tool = TavilySearchTool::new(TavilyConfig::new("bad").with_base_url(base));
        let err = tool.search("q").await.unwrap_err();
        assert!(matches!(err, ToolSourceError::Transport(ref m) if m.contains("401")));
    }

    #[tokio::test]
    async fn missing_query_is_invalid_input() {
        let tool = TavilySearchTool::new(TavilyConfig::new("k"));
        let err = tool.call(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolSourceError::InvalidInput(_)));
        assert_eq!(tool.name(), TOOL_TAVILY_SEARCH);
    }
}
