//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when the declared edges cannot drive a run from START.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// A node id in an edge or path map was not registered via `add_node`.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No plain edge leaves START, or more than one does.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// A node has two plain edges, two conditional edge sets, or one of each.
    #[error("node '{0}' has conflicting outgoing edges")]
    ConflictingEdges(String),

    /// A node has no outgoing edge.
    #[error("node '{0}' has no outgoing edge")]
    MissingOutgoingEdge(String),

    /// A conditional edge was declared with no labels.
    #[error("conditional edges from '{0}' have an empty path map")]
    EmptyPathMap(String),

    /// A node cannot be reached from START.
    #[error("node '{0}' is unreachable from START")]
    Unreachable(String),
}
