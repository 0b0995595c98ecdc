//! ReAct agent graph: Think, Act, Observe.
//!
//! Three nodes implementing `Node<ReActState>` wired as
//! `START → think →(tools_condition) {act, END}`, `act → observe → think`.
//! [`ReactRunner`] builds and runs that graph.

mod act_node;
mod observe_node;
mod runner;
mod think_node;

pub use act_node::{ActNode, ErrorHandlerFn, HandleToolErrors, DEFAULT_EXECUTION_ERROR_TEMPLATE};
pub(crate) use act_node::truncate_for_log;
pub use observe_node::ObserveNode;
pub use runner::{build_react_graph, ReactRunner, ReactRunnerConfig, RunError};
pub use think_node::ThinkNode;

use crate::graph::END;
use crate::message::Message;
use crate::state::ReActState;

/// Node id of the LLM step.
pub const THINK: &str = "think";
/// Node id of the tool execution step.
pub const ACT: &str = "act";
/// Node id of the step that feeds tool results back into the conversation.
pub const OBSERVE: &str = "observe";

/// Default system prompt for the ReAct agent graph.
pub const REACT_SYSTEM_PROMPT: &str =
    "You're a helpful assistant that can access to tools to answer questions.";

/// Router after `think`: `"act"` when the last assistant turn requested tools, else END.
pub fn tools_condition(state: &ReActState) -> String {
    let wants_tools = matches!(
        state.messages.last(),
        Some(Message::Assistant { tool_calls, .. }) if !tool_calls.is_empty()
    );
    if wants_tools {
        ACT.to_string()
    } else {
        END.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ToolCall;

    #[test]
    fn tools_condition_routes_on_last_assistant_turn() {
        let mut state = ReActState::new("sys", "q");
        assert_eq!(tools_condition(&state), END);

        state.messages.push(Message::assistant_with_tool_calls(
            "",
            vec![ToolCall {
                id: Some("c".into()),
                name: "triple".into(),
                arguments: "{}".into(),
            }],
        ));
        assert_eq!(tools_condition(&state), ACT);

        state.messages.push(Message::assistant("done"));
        assert_eq!(tools_condition(&state), END);
    }
}
