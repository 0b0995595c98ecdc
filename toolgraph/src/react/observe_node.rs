//! Observe node: merge tool results into the conversation.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::message::Message;
use crate::state::ReActState;

/// Observe node: appends one `Message::Tool` per tool result, clears the per-round
/// `tool_calls` / `tool_results` and increments `turn_count`.
///
/// **Interaction**: Runs after ActNode; its outgoing edge leads back to ThinkNode.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObserveNode;

impl ObserveNode {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Node<ReActState> for ObserveNode {
    fn id(&self) -> &str {
        super::OBSERVE
    }

    async fn run(&self, state: ReActState) -> Result<(ReActState, Next), AgentError> {
        let mut messages = state.messages;
        for r in state.tool_results {
            messages.push(Message::tool(r.call_id, r.name, r.content));
        }
        let new_state = ReActState {
            messages,
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            turn_count: state.turn_count + 1,
        };
        Ok((new_state, Next::Continue))
    }
}
