//! Compiled state graph: immutable, supports invoke and stream.
//!
//! Built by `StateGraph::compile`. Runs from the entry node; after each node the returned
//! `Next` decides whether to follow the node's outgoing edge, jump, or stop. Conditional
//! edges call the router on the updated state. Jumps and stops must target something the
//! node's declared edges already reach.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AgentError;
use crate::stream::{StreamEvent, StreamMode};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_route,
};
use super::node_middleware::{NodeFuture, NodeMiddleware};
use super::state_graph::{Router, END};
use super::{Next, Node};

/// Node steps allowed per run unless overridden with `with_recursion_limit`.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

pub(crate) struct ConditionalEdge<S> {
    pub(crate) router: Router<S>,
    pub(crate) path_map: HashMap<String, String>,
}

impl<S> Clone for ConditionalEdge<S> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            path_map: self.path_map.clone(),
        }
    }
}

pub(crate) enum Outgoing<S> {
    Edge(String),
    Conditional(ConditionalEdge<S>),
}

impl<S> Clone for Outgoing<S> {
    fn clone(&self) -> Self {
        match self {
            Outgoing::Edge(to) => Outgoing::Edge(to.clone()),
            Outgoing::Conditional(edge) => Outgoing::Conditional(edge.clone()),
        }
    }
}

/// Compiled graph: immutable structure, supports invoke and stream.
///
/// **Interaction**: Created by `StateGraph::compile()`; driven by `ReactRunner`, the
/// reflection runners and the RAG workflow.
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) entry: String,
    pub(super) outgoing: HashMap<String, Outgoing<S>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    pub(super) recursion_limit: usize,
}

impl<S> Clone for CompiledStateGraph<S> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            entry: self.entry.clone(),
            outgoing: self.outgoing.clone(),
            middleware: self.middleware.clone(),
            recursion_limit: self.recursion_limit,
        }
    }
}

struct StreamSink<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    tx: mpsc::Sender<Result<StreamEvent<S>, AgentError>>,
    modes: HashSet<StreamMode>,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Sets the maximum number of node steps per run.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Id of the node that runs first.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    async fn run_node(&self, node_id: &str, state: S) -> Result<(S, Next), AgentError> {
        let node = self
            .nodes
            .get(node_id)
            .cloned()
            .ok_or_else(|| AgentError::ExecutionFailed(format!("unknown node: {}", node_id)))?;
        match &self.middleware {
            Some(middleware) => {
                middleware
                    .around_run(
                        node_id,
                        state,
                        Box::new(move |s: S| -> NodeFuture<S> {
                            Box::pin(async move { node.run(s).await })
                        }),
                    )
                    .await
            }
            None => node.run(state).await,
        }
    }

    /// Resolves where the run goes after `from` when the node returned `Next::Continue`.
    fn follow_edge(&self, from: &str, state: &S) -> Result<String, AgentError> {
        match self.outgoing.get(from) {
            Some(Outgoing::Edge(to)) => Ok(to.clone()),
            Some(Outgoing::Conditional(edge)) => {
                let label = (edge.router)(state);
                let target = edge.path_map.get(&label).cloned().ok_or_else(|| {
                    AgentError::UnknownRoute {
                        from: from.to_string(),
                        label: label.clone(),
                    }
                })?;
                log_route(from, &label, &target);
                Ok(target)
            }
            None => Ok(END.to_string()),
        }
    }

    /// Targets reachable from `from` through its declared edges.
    fn declared_targets(&self, from: &str) -> Vec<&str> {
        match self.outgoing.get(from) {
            Some(Outgoing::Edge(to)) => vec![to.as_str()],
            Some(Outgoing::Conditional(edge)) => {
                edge.path_map.values().map(String::as_str).collect()
            }
            None => vec![END],
        }
    }

    /// Accepts an explicit jump from `from` only when a declared edge already leads to `to`.
    fn check_declared(&self, from: &str, to: &str) -> Result<String, AgentError> {
        if self.declared_targets(from).contains(&to) {
            Ok(to.to_string())
        } else {
            Err(AgentError::UndeclaredTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// Shared run loop used by invoke() and stream(): steps through nodes until END.
    async fn run_loop(&self, state: &mut S, sink: Option<&StreamSink<S>>) -> Result<(), AgentError> {
        let mut current = self.entry.clone();
        let mut steps = 0usize;
        loop {
            if steps >= self.recursion_limit {
                return Err(AgentError::IterationLimitExceeded {
                    limit: self.recursion_limit,
                });
            }
            steps += 1;

            log_node_start(&current);
            let (new_state, next) = self.run_node(&current, state.clone()).await?;
            *state = new_state;
            log_node_complete(&current, &next);

            if let Some(sink) = sink {
                if sink.modes.contains(&StreamMode::Values) {
                    let _ = sink.tx.send(Ok(StreamEvent::Values(state.clone()))).await;
                }
                if sink.modes.contains(&StreamMode::Updates) {
                    let _ = sink
                        .tx
                        .send(Ok(StreamEvent::Updates {
                            node_id: current.clone(),
                            state: state.clone(),
                        }))
                        .await;
                }
            }

            let target = match next {
                Next::Continue => self.follow_edge(&current, state)?,
                Next::End => self.check_declared(&current, END)?,
                Next::Node(id) => self.check_declared(&current, &id)?,
            };
            if target == END {
                return Ok(());
            }
            current = target;
        }
    }

    /// Runs the graph to completion and returns the final state.
    ///
    /// - `Next::Continue`: follow the node's plain edge, or call its router and look the label
    ///   up in the path map (`AgentError::UnknownRoute` if absent).
    /// - `Next::Node(id)`: run that node next; `id` must be a declared target of the node
    ///   (`AgentError::UndeclaredTransition` otherwise).
    /// - `Next::End` or an edge to `END`: stop and return the state. `Next::End` also needs a
    ///   declared edge to `END`.
    ///
    /// Fails with `AgentError::IterationLimitExceeded` once the recursion limit is reached.
    pub async fn invoke(&self, state: S) -> Result<S, AgentError> {
        let mut state = state;
        log_graph_start();
        match self.run_loop(&mut state, None).await {
            Ok(()) => {
                log_graph_complete();
                Ok(state)
            }
            Err(e) => {
                log_graph_error(&e);
                Err(e)
            }
        }
    }

    /// Streams graph execution, emitting events via a channel-backed stream.
    ///
    /// The stream ends when the run ends. A failed run yields its error as the last item.
    pub fn stream(
        &self,
        state: S,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<Result<StreamEvent<S>, AgentError>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let sink = StreamSink {
            tx,
            modes: stream_mode.into(),
        };

        tokio::spawn(async move {
            let mut state = state;
            log_graph_start();
            match graph.run_loop(&mut state, Some(&sink)).await {
                Ok(()) => log_graph_complete(),
                Err(e) => {
                    log_graph_error(&e);
                    let _ = sink.tx.send(Err(e)).await;
                }
            }
        });

        ReceiverStream::new(rx)
    }
}
