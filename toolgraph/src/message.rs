//! Conversation turns.
//!
//! One enum covers every turn kind the loops and graphs append: system prompt, human input,
//! model output (optionally requesting tools) and tool observations.

use serde::{Deserialize, Serialize};

use crate::state::ToolCall;

/// A single turn in a conversation.
///
/// `Assistant` carries the tool calls the model requested in that turn so the full exchange
/// can be replayed to a chat API; `Tool` answers one of those calls by `call_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", content = "data", rename_all = "lowercase")]
pub enum Message {
    System(String),
    User(String),
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        call_id: Option<String>,
        name: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User(content.into())
    }

    /// Assistant turn without tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool(call_id: Option<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool {
            call_id,
            name: name.into(),
            content: content.into(),
        }
    }

    /// Text content of the turn regardless of kind.
    pub fn content(&self) -> &str {
        match self {
            Message::System(s) | Message::User(s) => s,
            Message::Assistant { content, .. } | Message::Tool { content, .. } => content,
        }
    }

    /// Tool calls requested by this turn; empty for anything but an assistant turn.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn is_tool(&self) -> bool {
        matches!(self, Message::Tool { .. })
    }

    /// Short role label used when printing transcripts.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant { .. } => "assistant",
            Message::Tool { .. } => "tool",
        }
    }
}
