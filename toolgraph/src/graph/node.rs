//! Graph node trait.

use async_trait::async_trait;

use crate::error::AgentError;

use super::Next;

/// One step in a state graph: receives the current state, returns the updated state.
///
/// The returned state replaces the graph's state, so a node applies its partial update by
/// modifying the fields it owns and passing the rest through unchanged.
///
/// **Interaction**: Registered with `StateGraph::add_node`; run by `CompiledStateGraph`,
/// optionally wrapped by a `NodeMiddleware`.
#[async_trait]
pub trait Node<S>: Send + Sync {
    /// Node id, used in logs and stream events.
    fn id(&self) -> &str;

    async fn run(&self, state: S) -> Result<(S, Next), AgentError>;
}
