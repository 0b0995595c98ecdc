//! Act node: read tool_calls, call ToolSource for each, write tool_results.
//!
//! # Error Handling
//!
//! A call to a tool that does not exist always fails the run with
//! `AgentError::ToolNotFound`. Other tool errors propagate by default; use
//! `with_handle_tool_errors` to turn them into observations instead:
//!
//! - `HandleToolErrors::Never` - Errors propagate (default)
//! - `HandleToolErrors::Always` - Errors are returned to the model as text
//! - `HandleToolErrors::Custom(handler)` - Custom error handler function

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::state::{ReActState, ToolResult};
use crate::tool_source::{ToolSource, ToolSourceError};

/// Truncates a string for logging, appending "..." if longer than max_len chars.
pub(crate) fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Default execution error message template with tool name and kwargs.
pub const DEFAULT_EXECUTION_ERROR_TEMPLATE: &str =
    "Error executing tool '{tool_name}' with kwargs {tool_kwargs} with error:\n {error}\n Please fix the error and try again.";

/// Error handler function type: (error, tool name, tool arguments) → observation text.
pub type ErrorHandlerFn =
    Arc<dyn Fn(&ToolSourceError, &str, &Value) -> String + Send + Sync + 'static>;

/// How ActNode handles tool errors other than not-found.
#[derive(Clone, Default)]
pub enum HandleToolErrors {
    /// Errors propagate and short-circuit the graph.
    #[default]
    Never,
    /// Errors are returned as ToolResult text; default template if None.
    Always(Option<String>),
    /// Custom error handler function.
    Custom(ErrorHandlerFn),
}

impl std::fmt::Debug for HandleToolErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "HandleToolErrors::Never"),
            Self::Always(msg) => write!(f, "HandleToolErrors::Always({:?})", msg),
            Self::Custom(_) => write!(f, "HandleToolErrors::Custom(<fn>)"),
        }
    }
}

/// Act node: executes `state.tool_calls` and produces `state.tool_results`.
///
/// Each call is looked up by exact name and executed exactly once, in order; one
/// `ToolResult` is appended per call.
///
/// **Interaction**: Implements `Node<ReActState>`; consumes `ToolSource` (usually
/// `ToolRegistry`); ObserveNode reads the results.
pub struct ActNode {
    tools: Arc<dyn ToolSource>,
    handle_tool_errors: HandleToolErrors,
}

impl ActNode {
    /// By default, tool errors propagate (HandleToolErrors::Never).
    pub fn new(tools: Arc<dyn ToolSource>) -> Self {
        Self {
            tools,
            handle_tool_errors: HandleToolErrors::Never,
        }
    }

    pub fn with_handle_tool_errors(mut self, handle_tool_errors: HandleToolErrors) -> Self {
        self.handle_tool_errors = handle_tool_errors;
        self
    }

    /// Some(observation) if the error is handled, None if it should propagate.
    fn handle_error(
        &self,
        error: &ToolSourceError,
        tool_name: &str,
        tool_args: &Value,
    ) -> Option<String> {
        if matches!(error, ToolSourceError::NotFound(_)) {
            return None;
        }
        match &self.handle_tool_errors {
            HandleToolErrors::Never => None,
            HandleToolErrors::Always(custom_msg) => Some(custom_msg.clone().unwrap_or_else(|| {
                DEFAULT_EXECUTION_ERROR_TEMPLATE
                    .replace("{tool_name}", tool_name)
                    .replace("{tool_kwargs}", &tool_args.to_string())
                    .replace("{error}", &error.to_string())
            })),
            HandleToolErrors::Custom(handler) => Some(handler(error, tool_name, tool_args)),
        }
    }
}

#[async_trait]
impl Node<ReActState> for ActNode {
    fn id(&self) -> &str {
        super::ACT
    }

    async fn run(&self, state: ReActState) -> Result<(ReActState, Next), AgentError> {
        let mut tool_results = Vec::with_capacity(state.tool_calls.len());

        for tc in &state.tool_calls {
            let parsed = tc
                .parse_arguments()
                .map_err(|e| ToolSourceError::InvalidInput(format!("arguments are not JSON: {}", e)));
            let (args, result) = match parsed {
                Ok(args) => {
                    debug!(tool = %tc.name, args = ?args, "Calling tool");
                    let result = self.tools.call_tool(&tc.name, args.clone()).await;
                    (args, result)
                }
                Err(e) => (Value::String(tc.arguments.clone()), Err(e)),
            };

            match result {
                Ok(content) => {
                    trace!(
                        tool = %tc.name,
                        result_len = content.text.len(),
                        result_preview = %truncate_for_log(&content.text, 200),
                        "Tool returned"
                    );
                    tool_results.push(ToolResult {
                        call_id: tc.id.clone(),
                        name: tc.name.clone(),
                        content: content.text,
                    });
                }
                Err(e) => {
                    warn!(tool = %tc.name, error = %e, "Tool call failed");
                    match self.handle_error(&e, &tc.name, &args) {
                        Some(error_msg) => tool_results.push(ToolResult {
                            call_id: tc.id.clone(),
                            name: tc.name.clone(),
                            content: error_msg,
                        }),
                        None => return Err(AgentError::from_tool_error(&tc.name, e)),
                    }
                }
            }
        }

        let new_state = ReActState {
            messages: state.messages,
            tool_calls: state.tool_calls,
            tool_results,
            turn_count: state.turn_count,
        };
        Ok((new_state, Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ToolCall;
    use crate::tool_source::MockToolSource;
    use crate::tools::{ToolRegistry, TripleTool};

    fn call(name: &str, args: &str) -> ToolCall {
        ToolCall {
            id: Some(format!("id-{}", name)),
            name: name.into(),
            arguments: args.into(),
        }
    }

    fn state_with(calls: Vec<ToolCall>) -> ReActState {
        ReActState {
            tool_calls: calls,
            ..ReActState::new("sys", "q")
        }
    }

    #[tokio::test]
    async fn executes_each_call_once_in_order() {
        let src = Arc::new(MockToolSource::string_length_example());
        let act = ActNode::new(src.clone());
        let (out, _) = act
            .run(state_with(vec![call("get_string_length", ""), call("get_string_length", "{}")]))
            .await
            .unwrap();
        assert_eq!(out.tool_results.len(), 2);
        assert_eq!(out.tool_results[0].call_id.as_deref(), Some("id-get_string_length"));
        assert_eq!(src.calls().len(), 2);
    }

    /// **Scenario**: an unknown tool is fatal even when errors are handled.
    #[tokio::test]
    async fn unknown_tool_is_fatal_even_with_always() {
        let act = ActNode::new(Arc::new(MockToolSource::string_length_example()))
            .with_handle_tool_errors(HandleToolErrors::Always(None));
        let err = act
            .run(state_with(vec![call("get_weather", "{}")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(ref n) if n == "get_weather"));
    }

    #[tokio::test]
    async fn tool_error_propagates_by_default() {
        let registry = ToolRegistry::new().with(TripleTool).unwrap();
        let act = ActNode::new(Arc::new(registry));
        let err = act
            .run(state_with(vec![call("triple", r#"{"num":"x"}"#)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Tool { ref name, .. } if name == "triple"));
    }

    /// **Scenario**: with Always(None), failures become observations using the default template.
    #[tokio::test]
    async fn always_turns_errors_into_observations() {
        let registry = ToolRegistry::new().with(TripleTool).unwrap();
        let act = ActNode::new(Arc::new(registry))
            .with_handle_tool_errors(HandleToolErrors::Always(None));
        let (out, _) = act
            .run(state_with(vec![call("triple", "{num: 3"), call("triple", r#"{"num":2}"#)]))
            .await
            .unwrap();
        assert!(out.tool_results[0].content.contains("Error executing tool 'triple'"));
        assert_eq!(out.tool_results[1].content, "6.0");
    }

    #[tokio::test]
    async fn custom_handler_formats_observation() {
        let registry = ToolRegistry::new().with(TripleTool).unwrap();
        let act = ActNode::new(Arc::new(registry)).with_handle_tool_errors(
            HandleToolErrors::Custom(Arc::new(|e, name, _| format!("{} failed: {}", name, e))),
        );
        let (out, _) = act
            .run(state_with(vec![call("triple", "{}")]))
            .await
            .unwrap();
        assert!(out.tool_results[0].content.starts_with("triple failed:"));
    }

    #[test]
    fn truncate_for_log_appends_ellipsis() {
        assert_eq!(truncate_for_log("abcdef", 3), "abc...");
        assert_eq!(truncate_for_log("abc", 3), "abc");
    }
}
