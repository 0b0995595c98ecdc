//! LLM client abstraction.
//!
//! Every component that talks to a model (ThinkNode, `ToolCallingLoop`, `AgentExecutor`,
//! graders, reflection nodes) depends on [`LlmClient`]: given messages, return assistant text
//! and optional tool calls. Implementations: [`MockLlm`] (scripted), [`ChatOpenAI`]
//! (feature `openai`) and the [`CallbackLlm`] wrapper.

mod callbacks;
mod mock;
#[cfg(feature = "openai")]
mod openai;

pub use callbacks::{CallbackLlm, LlmCallback, TracingCallback};
pub use mock::MockLlm;
#[cfg(feature = "openai")]
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;
use crate::state::ToolCall;

/// Tool choice for chat completions: when tools are present, controls whether the model may
/// choose (auto), must not use (none), must use some tool (required), or must call one named
/// function (structured output via a forced tool call).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    /// Model can pick between message or tool calls. Default when tools are present.
    #[default]
    Auto,
    /// Model will not call any tool.
    None,
    /// Model must call one or more tools.
    Required,
    /// Model must call this function.
    Function(String),
}

impl std::str::FromStr for ToolChoiceMode {
    type Err = String;

    /// Parses `auto`, `none`, `required` or `function:<name>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("function:") {
            let name = name.trim();
            if name.is_empty() {
                return Err("tool_choice function name is empty".to_string());
            }
            return Ok(Self::Function(name.to_string()));
        }
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "required" => Ok(Self::Required),
            _ => Err(format!(
                "unknown tool_choice: {} (use auto, none, required or function:<name>)",
                s
            )),
        }
    }
}

/// Response from an LLM completion: assistant message text and optional tool calls.
///
/// **Interaction**: Returned by `LlmClient::invoke()`; ThinkNode and the dispatch loop write
/// `content` into a new assistant message and dispatch `tool_calls`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Tool calls from this turn; empty means a final answer.
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    /// Plain text reply with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Reply requesting a single tool call with JSON `arguments`.
    pub fn tool_call(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self::tool_calls(vec![(name.into(), arguments)])
    }

    /// Reply requesting several tool calls; ids are `call_0`, `call_1`, ...
    pub fn tool_calls(calls: Vec<(String, serde_json::Value)>) -> Self {
        Self {
            content: String::new(),
            tool_calls: calls
                .into_iter()
                .enumerate()
                .map(|(i, (name, args))| ToolCall {
                    id: Some(format!("call_{}", i)),
                    name,
                    arguments: args.to_string(),
                })
                .collect(),
        }
    }

    /// The assistant message this response becomes in the conversation.
    pub fn to_message(&self) -> Message {
        Message::assistant_with_tool_calls(self.content.clone(), self.tool_calls.clone())
    }
}

/// Truncates `text` at the earliest occurrence of any stop sequence.
pub fn apply_stop(text: &str, stop: &[String]) -> String {
    let cut = stop
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min();
    match cut {
        Some(i) => text[..i].to_string(),
        None => text.to_string(),
    }
}

/// LLM client: given messages, returns assistant text and optional tool calls.
///
/// **Interaction**: Used by ThinkNode, `ToolCallingLoop`, `AgentExecutor`, graders and the
/// reflection nodes.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn: read messages, return assistant content and optional tool_calls.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;

    /// Invoke one turn and stop generating at any of `stop`.
    ///
    /// The default truncates the reply client-side; API-backed clients pass the sequences to
    /// the server instead.
    async fn invoke_with_stop(
        &self,
        messages: &[Message],
        stop: &[String],
    ) -> Result<LlmResponse, AgentError> {
        let mut response = self.invoke(messages).await?;
        response.content = apply_stop(&response.content, stop);
        Ok(response)
    }
}
