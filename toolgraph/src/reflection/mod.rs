//! Generation/critique loops on a message-list state.
//!
//! - [`reflect`]: `generate ⇄ reflect`; the critique comes back as a user message and the
//!   loop ends once the conversation is longer than `max_messages`.
//! - [`reflexion`]: `draft → execute_tools → revise → execute_tools ...`; draft and revise
//!   force structured tool calls ([`AnswerQuestion`], [`ReviseAnswer`]) whose search
//!   queries are run through a search tool between revisions.

pub mod reflect;
pub mod reflexion;
mod schema;

pub use reflect::{ReflectionAgent, ReflectionConfig, GENERATE, REFLECT};
pub use reflexion::{ReflexionAgent, ReflexionConfig, DRAFT, EXECUTE_TOOLS, REVISE};
pub use schema::{AnswerQuestion, Reflection, ReviseAnswer, ANSWER_QUESTION, REVISE_ANSWER};

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Graph state holding only the conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesState {
    pub messages: Vec<Message>,
}

impl MessagesState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// State with one user message.
    pub fn from_user(content: impl Into<String>) -> Self {
        Self::new(vec![Message::user(content)])
    }

    /// Number of tool messages in the conversation.
    pub fn tool_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_tool()).count()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
