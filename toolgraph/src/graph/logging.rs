//! Logging for graph execution.
//!
//! Structured `tracing` events for graph start/end, node steps and routing decisions, plus
//! [`LoggingNodeMiddleware`] which logs node enter/exit with elapsed time.

use std::marker::PhantomData;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, NodeMiddleware, NodeRunFn};

/// Log node execution start.
pub fn log_node_start(node_id: &str) {
    tracing::debug!(node_id = node_id, "Starting node execution");
}

/// Log node execution completion.
pub fn log_node_complete(node_id: &str, next: &Next) {
    tracing::debug!(node_id = node_id, ?next, "Node execution complete");
}

/// Log the label a router returned and where it leads.
pub fn log_route(from: &str, label: &str, target: &str) {
    tracing::debug!(from = from, label = label, target = target, "Routed");
}

/// Log graph execution start.
pub fn log_graph_start() {
    tracing::info!("Starting graph execution");
}

/// Log graph execution completion.
pub fn log_graph_complete() {
    tracing::info!("Graph execution complete");
}

/// Log graph execution error.
pub fn log_graph_error(error: &AgentError) {
    tracing::error!(%error, "Graph execution error");
}

/// Middleware that logs node enter/exit around each node run.
///
/// Generic over the state type so any graph can attach it with
/// `StateGraph::with_middleware(Arc::new(LoggingNodeMiddleware::new()))`.
pub struct LoggingNodeMiddleware<S> {
    _state: PhantomData<fn(S)>,
}

impl<S> LoggingNodeMiddleware<S> {
    pub fn new() -> Self {
        Self {
            _state: PhantomData,
        }
    }
}

impl<S> Default for LoggingNodeMiddleware<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> NodeMiddleware<S> for LoggingNodeMiddleware<S>
where
    S: Send + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeRunFn<S>,
    ) -> Result<(S, Next), AgentError> {
        tracing::info!(node = node_id, "enter");
        let started = Instant::now();
        let result = inner(state).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok((_, next)) => tracing::info!(node = node_id, ?next, elapsed_ms, "exit"),
            Err(e) => tracing::warn!(node = node_id, error = %e, elapsed_ms, "exit with error"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::graph::{Node, StateGraph, END, START};

    struct Double;

    #[async_trait]
    impl Node<i32> for Double {
        fn id(&self) -> &str {
            "double"
        }

        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            Ok((state * 2, Next::Continue))
        }
    }

    #[test]
    fn test_logging_functions() {
        // These should not panic
        log_node_start("test_node");
        log_node_complete("test_node", &Next::End);
        log_route("a", "label", "b");
        log_graph_start();
        log_graph_complete();
        log_graph_error(&AgentError::ExecutionFailed("test".to_string()));
    }

    /// **Scenario**: the logging middleware passes state and result through unchanged.
    #[tokio::test]
    async fn logging_middleware_is_transparent() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("double", Arc::new(Double));
        graph.add_edge(START, "double");
        graph.add_edge("double", END);
        let compiled = graph
            .with_middleware(Arc::new(LoggingNodeMiddleware::new()))
            .compile()
            .unwrap();
        assert_eq!(compiled.invoke(21).await.unwrap(), 42);
    }
}
