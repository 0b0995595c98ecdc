//! Agent execution error types.
//!
//! Used by dispatch loops, graph nodes, routers and graders. Tool-level failures keep their
//! [`ToolSourceError`] so callers can tell a missing tool apart from a failing one.

use thiserror::Error;

use crate::tool_source::ToolSourceError;

/// Agent execution error.
///
/// Returned by `Node::run`, `ToolCallingLoop::step`, `AgentExecutor::invoke` and
/// `CompiledStateGraph::invoke` when a step fails.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, malformed response).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The model asked for a tool that is not registered. Fatal to the turn.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// A registered tool failed while executing.
    #[error("tool '{name}' failed: {source}")]
    Tool {
        name: String,
        #[source]
        source: ToolSourceError,
    },

    /// A loop or graph ran out of its step budget before reaching a terminal answer.
    #[error("iteration limit exceeded: no terminal answer after {limit} steps")]
    IterationLimitExceeded { limit: usize },

    /// A router returned a label that has no declared edge from the current node.
    #[error("router from '{from}' returned undeclared label '{label}'")]
    UnknownRoute { from: String, label: String },

    /// A node asked to jump somewhere its declared edges do not lead.
    #[error("node '{from}' jumped to '{to}' without a declared edge")]
    UndeclaredTransition { from: String, to: String },

    /// A grader produced a value outside `yes` / `no`.
    #[error("invalid binary grade: {0:?}")]
    InvalidGrade(String),

    /// A prompt template was formatted without a value for one of its variables.
    #[error("missing prompt variable: {0}")]
    MissingPromptVariable(String),

    /// Model output could not be parsed into an action or a final answer.
    #[error("output parse error: {0}")]
    Parse(String),
}

impl AgentError {
    /// Maps a tool error to the agent error the dispatch loops surface.
    ///
    /// `NotFound` becomes [`AgentError::ToolNotFound`]; everything else is wrapped in
    /// [`AgentError::Tool`] with the tool name.
    pub fn from_tool_error(name: &str, err: ToolSourceError) -> Self {
        match err {
            ToolSourceError::NotFound(n) => AgentError::ToolNotFound(n),
            other => AgentError::Tool {
                name: name.to_string(),
                source: other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display format of ExecutionFailed contains "execution failed" and the message.
    #[test]
    fn agent_error_display_execution_failed() {
        let err = AgentError::ExecutionFailed("msg".to_string());
        let s = err.to_string();
        assert!(
            s.contains("execution failed"),
            "Display should contain 'execution failed': {}",
            s
        );
        assert!(s.contains("msg"), "Display should contain message: {}", s);
    }

    /// **Scenario**: NotFound from a tool source maps to ToolNotFound, other errors keep the tool name.
    #[test]
    fn from_tool_error_distinguishes_not_found() {
        let err = AgentError::from_tool_error("x", ToolSourceError::NotFound("x".into()));
        assert!(matches!(err, AgentError::ToolNotFound(ref n) if n == "x"));

        let err = AgentError::from_tool_error(
            "triple",
            ToolSourceError::InvalidInput("missing num".into()),
        );
        match err {
            AgentError::Tool { name, source } => {
                assert_eq!(name, "triple");
                assert!(source.to_string().contains("missing num"));
            }
            other => panic!("expected Tool variant, got {:?}", other),
        }
    }

    /// **Scenario**: IterationLimitExceeded reports the limit.
    #[test]
    fn iteration_limit_display_includes_limit() {
        let err = AgentError::IterationLimitExceeded { limit: 7 };
        assert!(err.to_string().contains('7'));
    }
}
