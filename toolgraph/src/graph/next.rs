//! Control flow returned by a node.

/// What the graph does after a node returns.
///
/// Most nodes return `Continue` and let the graph's edges decide. A node may also pick one
/// of its declared targets directly, or end the run when it has a declared edge to `END`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// Follow the node's outgoing edge (plain or conditional).
    Continue,
    /// Run the node with this id next; it must be a declared target of the current node.
    Node(String),
    /// Stop and return the current state.
    End,
}
