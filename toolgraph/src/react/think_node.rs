//! Think node: read messages, call LLM, write assistant message and tool_calls.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::state::ReActState;

/// Think node: one ReAct step that produces an assistant message and optional tool_calls.
///
/// Reads `state.messages`, calls the LLM, appends one assistant message (carrying any tool
/// calls) and sets `state.tool_calls` from the response.
///
/// **Interaction**: Implements `Node<ReActState>`; consumes `LlmClient`; the
/// `tools_condition` router reads the appended message.
pub struct ThinkNode {
    llm: Arc<dyn LlmClient>,
}

impl ThinkNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<ReActState> for ThinkNode {
    fn id(&self) -> &str {
        super::THINK
    }

    async fn run(&self, state: ReActState) -> Result<(ReActState, Next), AgentError> {
        let response = self.llm.invoke(&state.messages).await?;
        tracing::debug!(
            content_len = response.content.len(),
            tool_calls = response.tool_calls.len(),
            "think"
        );
        let mut messages = state.messages;
        messages.push(response.to_message());
        let new_state = ReActState {
            messages,
            tool_calls: response.tool_calls,
            tool_results: state.tool_results,
            turn_count: state.turn_count,
        };
        Ok((new_state, Next::Continue))
    }
}
