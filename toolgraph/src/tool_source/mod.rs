//! Tool source: list tool specs and execute calls by name.
//!
//! `ToolSource` is the seam ActNode, `ToolCallingLoop` and `AgentExecutor` dispatch through.
//! [`ToolRegistry`](crate::tools::ToolRegistry) is the production implementation;
//! [`MockToolSource`] returns fixed results for tests.

mod mock;

pub use mock::MockToolSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Tool specification: name, description (for the LLM) and JSON schema of the arguments.
///
/// Passed to `ChatOpenAI::with_tools` as function definitions and rendered into the text
/// ReAct prompt by `render_text_description`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Text result of one tool call (the observation fed back to the model).
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallContent {
    pub text: String,
}

impl ToolCallContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Error from listing or calling tools.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    /// No tool is registered under the requested name.
    #[error("tool not found: {0}")]
    NotFound(String),
    /// A tool with this name is already registered.
    #[error("duplicate tool name: {0}")]
    Duplicate(String),
    /// Arguments missing or of the wrong shape.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Network or remote API failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Tool body failed.
    #[error("execution error: {0}")]
    Execution(String),
}

/// Source of tools: lists specs and executes calls by exact name.
///
/// **Interaction**: Implemented by `ToolRegistry` and `MockToolSource`; consumed by ActNode,
/// `ToolCallingLoop` and `AgentExecutor`.
#[async_trait]
pub trait ToolSource: Send + Sync {
    /// Specs of all available tools.
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    /// Executes the tool registered as `name`. Returns `ToolSourceError::NotFound` when absent.
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError>;
}
