//! Mock ToolSource for tests.
//!
//! Returns a fixed tool list and a fixed call result; unknown names still fail with
//! `NotFound` so dispatch tests exercise the lookup path.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Mock tool source: fixed tool list and fixed call result.
///
/// `call_tool(name, args)` returns `call_result` when `name` is listed and records the call;
/// otherwise `ToolSourceError::NotFound`.
pub struct MockToolSource {
    tools: Vec<ToolSpec>,
    call_result: String,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    /// Mock that lists `get_string_length` and answers every call with "3".
    pub fn string_length_example() -> Self {
        Self::new(
            vec![ToolSpec {
                name: "get_string_length".to_string(),
                description: Some("Returns the length of a string in characters.".to_string()),
                input_schema: json!({ "type": "object", "properties": { "text": { "type": "string" } } }),
            }],
            "3".to_string(),
        )
    }

    /// Creates a mock with custom tool list and fixed call result.
    pub fn new(tools: Vec<ToolSpec>, call_result: String) -> Self {
        Self {
            tools,
            call_result,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the text returned by call_tool (builder style).
    pub fn with_call_result(mut self, text: String) -> Self {
        self.call_result = text;
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockToolSource {
    fn default() -> Self {
        Self::string_length_example()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError> {
        if !self.tools.iter().any(|t| t.name == name) {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments));
        }
        Ok(ToolCallContent::new(self.call_result.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let src = MockToolSource::string_length_example();
        let err = src.call_tool("get_weather", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolSourceError::NotFound(ref n) if n == "get_weather"));
        assert!(src.calls().is_empty());
    }

    #[tokio::test]
    async fn known_tool_returns_fixed_result_and_records_call() {
        let src = MockToolSource::string_length_example();
        let out = src.call_tool("get_string_length", json!({"text": "dog"})).await.unwrap();
        assert_eq!(out.text, "3");
        assert_eq!(src.calls().len(), 1);
    }
}
