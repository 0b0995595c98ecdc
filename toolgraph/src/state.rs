//! ReAct state and tool types for the agent graph.
//!
//! ReActState holds messages plus per-round tool_calls and tool_results; Think/Act/Observe
//! nodes read and write these fields.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// A single tool invocation requested by the model.
///
/// **Interaction**: Written by ThinkNode and `ToolCallingLoop` from LLM output; read by
/// ActNode and the loop to look the tool up by exact name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Id assigned by the model; echoed back on the tool message.
    pub id: Option<String>,
    /// Tool name as registered in the registry.
    pub name: String,
    /// Arguments as a JSON object string; empty means `{}`.
    pub arguments: String,
}

impl ToolCall {
    /// Parses `arguments` into a JSON value. Empty or whitespace arguments yield `{}`.
    pub fn parse_arguments(&self) -> Result<serde_json::Value, serde_json::Error> {
        if self.arguments.trim().is_empty() {
            Ok(serde_json::json!({}))
        } else {
            serde_json::from_str(&self.arguments)
        }
    }
}

/// Result of executing one tool call (Act node output, Observe node input).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the tool call this result belongs to (if ToolCall had `id`).
    pub call_id: Option<String>,
    /// Tool name.
    pub name: String,
    /// Observation text.
    pub content: String,
}

/// State for the ReAct graph: Think → Act → Observe → Think ...
///
/// **Interaction**: Consumed and produced by ThinkNode, ActNode, ObserveNode; passed
/// through `CompiledStateGraph::invoke`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReActState {
    /// Conversation history. Appended to, never rewound.
    pub messages: Vec<Message>,
    /// Current round tool calls from the LLM (Think writes, Act reads).
    pub tool_calls: Vec<ToolCall>,
    /// Current round tool execution results (Act writes, Observe reads and merges).
    pub tool_results: Vec<ToolResult>,
    /// Completed think → act → observe rounds.
    pub turn_count: u32,
}

impl ReActState {
    /// Fresh state with a system prompt and one user message.
    pub fn new(system_prompt: &str, user_message: &str) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(user_message)],
            ..Default::default()
        }
    }

    /// Content of the last assistant message, if any.
    pub fn last_assistant_reply(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Assistant { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_arguments_empty_is_object() {
        let tc = ToolCall {
            id: None,
            name: "get_string_length".into(),
            arguments: "  ".into(),
        };
        assert_eq!(tc.parse_arguments().unwrap(), serde_json::json!({}));
    }

    #[test]
    fn parse_arguments_invalid_json_errors() {
        let tc = ToolCall {
            id: None,
            name: "triple".into(),
            arguments: "{num: 3".into(),
        };
        assert!(tc.parse_arguments().is_err());
    }

    #[test]
    fn last_assistant_reply_skips_tool_messages() {
        let mut s = ReActState::new("sys", "q");
        s.messages.push(Message::assistant("first"));
        s.messages.push(Message::tool(None, "t", "obs"));
        assert_eq!(s.last_assistant_reply(), Some("first"));
    }
}
