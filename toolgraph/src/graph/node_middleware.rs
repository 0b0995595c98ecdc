//! Middleware wrapping every node run.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::AgentError;

use super::Next;

/// Future returned by a wrapped node run.
pub type NodeFuture<S> = Pin<Box<dyn Future<Output = Result<(S, Next), AgentError>> + Send>>;

/// The wrapped node run handed to [`NodeMiddleware::around_run`]. Call it at most once.
pub type NodeRunFn<S> = Box<dyn FnOnce(S) -> NodeFuture<S> + Send>;

/// Runs around each node: may inspect or modify the state before, the result after, or
/// short-circuit by not calling `inner`.
///
/// **Interaction**: Attached with `StateGraph::with_middleware`; called by
/// `CompiledStateGraph` once per node step.
#[async_trait]
pub trait NodeMiddleware<S>: Send + Sync {
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeRunFn<S>,
    ) -> Result<(S, Next), AgentError>;
}
