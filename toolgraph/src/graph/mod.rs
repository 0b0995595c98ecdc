//! State graph: nodes, plain and conditional edges, compile and invoke.
//!
//! Add nodes and edges to a [`StateGraph`], optionally route with
//! [`StateGraph::add_conditional_edges`], then `compile()` into a [`CompiledStateGraph`] and
//! `invoke` it with an initial state. Cycles are allowed; every run is bounded by the
//! recursion limit.

mod compile_error;
mod compiled;
pub mod logging;
mod next;
mod node;
mod node_middleware;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::{CompiledStateGraph, DEFAULT_RECURSION_LIMIT};
pub use logging::LoggingNodeMiddleware;
pub use next::Next;
pub use node::Node;
pub use node_middleware::{NodeFuture, NodeMiddleware, NodeRunFn};
pub use state_graph::{Router, StateGraph, END, START};
