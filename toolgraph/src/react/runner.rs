//! ReAct graph runner: encapsulates graph build, initial state, invoke and stream.
//!
//! Interacts with [`StateGraph`](crate::graph::StateGraph), [`ThinkNode`](super::ThinkNode),
//! [`ActNode`](super::ActNode) and [`ObserveNode`](super::ObserveNode).

use std::collections::HashSet;
use std::sync::Arc;

use tokio_stream::StreamExt;

use crate::error::AgentError;
use crate::graph::{
    CompilationError, CompiledStateGraph, LoggingNodeMiddleware, StateGraph,
    DEFAULT_RECURSION_LIMIT, END, START,
};
use crate::llm::LlmClient;
use crate::retriever::StoreError;
use crate::state::ReActState;
use crate::stream::{StreamEvent, StreamMode};
use crate::tool_source::ToolSource;

use super::{
    tools_condition, ActNode, HandleToolErrors, ObserveNode, ThinkNode, ACT, OBSERVE,
    REACT_SYSTEM_PROMPT, THINK,
};

/// Error type for runner invoke/stream operations.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
    #[error("execution failed: {0}")]
    Execution(#[from] AgentError),
    #[error("vector store error: {0}")]
    Store(#[from] StoreError),
    #[error("stream ended without final state")]
    StreamEndedWithoutState,
}

/// Settings for [`ReactRunner`].
#[derive(Debug, Clone)]
pub struct ReactRunnerConfig {
    /// First message of every run.
    pub system_prompt: String,
    /// Maximum node steps per run (think, act and observe each count one).
    pub recursion_limit: usize,
    /// Attach [`LoggingNodeMiddleware`] (node enter/exit).
    pub verbose: bool,
    pub handle_tool_errors: HandleToolErrors,
}

impl Default for ReactRunnerConfig {
    fn default() -> Self {
        Self {
            system_prompt: REACT_SYSTEM_PROMPT.to_string(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            verbose: false,
            handle_tool_errors: HandleToolErrors::Never,
        }
    }
}

/// Builds the uncompiled ReAct graph:
/// `START → think →(tools_condition) {act, END}`, `act → observe → think`.
pub fn build_react_graph(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    handle_tool_errors: HandleToolErrors,
) -> StateGraph<ReActState> {
    let mut graph = StateGraph::<ReActState>::new();
    graph
        .add_node(THINK, Arc::new(ThinkNode::new(llm)))
        .add_node(
            ACT,
            Arc::new(ActNode::new(tools).with_handle_tool_errors(handle_tool_errors)),
        )
        .add_node(OBSERVE, Arc::new(ObserveNode::new()))
        .add_edge(START, THINK)
        .add_conditional_edges(THINK, tools_condition, [(ACT, ACT), (END, END)])
        .add_edge(ACT, OBSERVE)
        .add_edge(OBSERVE, THINK);
    graph
}

/// ReAct graph runner.
///
/// # Example
///
/// ```ignore
/// let runner = ReactRunner::new(llm, tools, ReactRunnerConfig::default())?;
/// let state = runner.invoke("What is 3 tripled?").await?;
/// ```
pub struct ReactRunner {
    compiled: CompiledStateGraph<ReActState>,
    system_prompt: String,
}

impl ReactRunner {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolSource>,
        config: ReactRunnerConfig,
    ) -> Result<Self, CompilationError> {
        let graph = build_react_graph(llm, tools, config.handle_tool_errors);
        let graph = if config.verbose {
            graph.with_middleware(Arc::new(LoggingNodeMiddleware::<ReActState>::new()))
        } else {
            graph
        };
        let compiled = graph.compile()?.with_recursion_limit(config.recursion_limit);
        Ok(Self {
            compiled,
            system_prompt: config.system_prompt,
        })
    }

    /// Fresh state: system prompt plus the user message.
    pub fn initial_state(&self, user_message: &str) -> ReActState {
        ReActState::new(&self.system_prompt, user_message)
    }

    /// Runs the graph to completion for one user message.
    pub async fn invoke(&self, user_message: &str) -> Result<ReActState, RunError> {
        let state = self.initial_state(user_message);
        Ok(self.compiled.invoke(state).await?)
    }

    /// Streams the run; returns the final state from the last `StreamEvent::Values`.
    ///
    /// When `on_event` is provided it sees every event (e.g. to print tool calls as they
    /// happen). A failed step is returned as `RunError::Execution`, never as a partial state.
    pub async fn stream_with_callback<F>(
        &self,
        user_message: &str,
        mut on_event: Option<F>,
    ) -> Result<ReActState, RunError>
    where
        F: FnMut(&StreamEvent<ReActState>),
    {
        let state = self.initial_state(user_message);
        let modes = HashSet::from([StreamMode::Updates, StreamMode::Values]);
        let mut stream = self.compiled.stream(state, modes);

        let mut final_state: Option<ReActState> = None;
        while let Some(item) = stream.next().await {
            let event = item?;
            if let Some(ref mut f) = on_event {
                f(&event);
            }
            if let StreamEvent::Values(s) = event {
                final_state = Some(s);
            }
        }

        final_state.ok_or(RunError::StreamEndedWithoutState)
    }
}
