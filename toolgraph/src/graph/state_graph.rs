//! State graph builder: nodes, plain edges and conditional edges.
//!
//! Plain edges (`add_edge(from, to)`) are unconditional; conditional edges
//! (`add_conditional_edges(from, router, path_map)`) pick the next node by calling a router
//! on the current state and looking its label up in the path map. `START` and `END` are the
//! entry and exit sentinels. `compile()` validates the structure and yields a
//! `CompiledStateGraph`.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::{CompiledStateGraph, ConditionalEdge, Outgoing, DEFAULT_RECURSION_LIMIT};
use crate::graph::node::Node;
use crate::graph::node_middleware::NodeMiddleware;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as a target in `add_edge` or a path map.
pub const END: &str = "__end__";

/// Routing function: reads the state, returns a label declared in the path map.
///
/// Must be pure; the same state always yields the same label.
pub type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// State graph: nodes plus plain and conditional edges.
///
/// Generic over state type `S`. Build with `add_node`, `add_edge` and
/// `add_conditional_edges`, then `compile()`.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: Vec<(String, String)>,
    conditional: Vec<(String, ConditionalEdge<S>)>,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            conditional: Vec::new(),
            middleware: None,
        }
    }

    /// Adds a node; replaces an existing node with the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an unconditional edge from `from_id` to `to_id`.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds conditional edges from `from_id`.
    ///
    /// After `from_id` runs, `router(&state)` returns a label; the run continues at
    /// `path_map[label]` (a node id or `END`). A label missing from the map fails the run with
    /// `AgentError::UnknownRoute`.
    pub fn add_conditional_edges<F, I, K, V>(
        &mut self,
        from_id: impl Into<String>,
        router: F,
        path_map: I,
    ) -> &mut Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let path_map = path_map
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.conditional.push((
            from_id.into(),
            ConditionalEdge {
                router: Arc::new(router),
                path_map,
            },
        ));
        self
    }

    /// Attaches middleware that wraps every node run of the compiled graph.
    pub fn with_middleware(mut self, middleware: Arc<dyn NodeMiddleware<S>>) -> Self {
        self.middleware = Some(middleware);
        self
    }

    fn check_node(&self, id: &str) -> Result<(), CompilationError> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(CompilationError::NodeNotFound(id.to_string()))
        }
    }

    /// Validates the graph and builds the executable form.
    ///
    /// Checks, in order: referenced node ids exist, exactly one plain edge leaves START, no
    /// node has conflicting outgoing edges, path maps are non-empty, every node has an
    /// outgoing edge, and every node is reachable from START.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START {
                self.check_node(from)?;
            }
            if to != END {
                self.check_node(to)?;
            }
        }
        for (from, edge) in &self.conditional {
            if from == START {
                return Err(CompilationError::MissingStart);
            }
            self.check_node(from)?;
            for target in edge.path_map.values() {
                if target != END {
                    self.check_node(target)?;
                }
            }
        }

        let start_edges: Vec<&String> = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t)
            .collect();
        let entry = match start_edges.as_slice() {
            [only] if only.as_str() != END => (*only).clone(),
            _ => return Err(CompilationError::MissingStart),
        };

        let mut outgoing: HashMap<String, Outgoing<S>> = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(f, _)| f != START) {
            if outgoing.insert(from.clone(), Outgoing::Edge(to.clone())).is_some() {
                return Err(CompilationError::ConflictingEdges(from.clone()));
            }
        }
        for (from, edge) in self.conditional {
            if edge.path_map.is_empty() {
                return Err(CompilationError::EmptyPathMap(from));
            }
            if outgoing.contains_key(&from) {
                return Err(CompilationError::ConflictingEdges(from));
            }
            outgoing.insert(from, Outgoing::Conditional(edge));
        }

        // Sorted so the reported node is deterministic.
        let ids: BTreeSet<&String> = self.nodes.keys().collect();
        if let Some(id) = ids.iter().find(|id| !outgoing.contains_key(id.as_str())) {
            return Err(CompilationError::MissingOutgoingEdge((*id).clone()));
        }

        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut queue = VecDeque::from([entry.clone()]);
        while let Some(id) = queue.pop_front() {
            if id == END || !seen.insert(id.clone()) {
                continue;
            }
            match outgoing.get(&id) {
                Some(Outgoing::Edge(to)) => queue.push_back(to.clone()),
                Some(Outgoing::Conditional(edge)) => {
                    queue.extend(edge.path_map.values().cloned());
                }
                None => {}
            }
        }
        if let Some(id) = ids.iter().find(|id| !seen.contains(id.as_str())) {
            return Err(CompilationError::Unreachable((*id).clone()));
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            entry,
            outgoing,
            middleware: self.middleware,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::graph::Next;
    use async_trait::async_trait;

    struct Noop(&'static str);

    #[async_trait]
    impl Node<i32> for Noop {
        fn id(&self) -> &str {
            self.0
        }

        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            Ok((state, Next::Continue))
        }
    }

    fn graph_with(ids: &[&'static str]) -> StateGraph<i32> {
        let mut g = StateGraph::new();
        for id in ids {
            g.add_node(*id, Arc::new(Noop(id)));
        }
        g
    }

    fn err(g: StateGraph<i32>) -> CompilationError {
        match g.compile() {
            Err(e) => e,
            Ok(_) => panic!("expected compile error"),
        }
    }

    #[test]
    fn linear_graph_compiles() {
        let mut g = graph_with(&["a", "b"]);
        g.add_edge(START, "a").add_edge("a", "b").add_edge("b", END);
        assert!(g.compile().is_ok());
    }

    #[test]
    fn cycle_with_conditional_exit_compiles() {
        let mut g = graph_with(&["a", "b"]);
        g.add_edge(START, "a");
        g.add_conditional_edges(
            "a",
            |s: &i32| (if *s > 3 { "done" } else { "again" }).to_string(),
            [("again", "b"), ("done", END)],
        );
        g.add_edge("b", "a");
        assert!(g.compile().is_ok());
    }

    #[test]
    fn unknown_node_in_edge_or_path_map() {
        let mut g = graph_with(&["a"]);
        g.add_edge(START, "a").add_edge("a", "ghost");
        assert_eq!(err(g), CompilationError::NodeNotFound("ghost".into()));

        let mut g = graph_with(&["a"]);
        g.add_edge(START, "a");
        g.add_conditional_edges("a", |_: &i32| "x".to_string(), [("x", "ghost")]);
        assert_eq!(err(g), CompilationError::NodeNotFound("ghost".into()));
    }

    #[test]
    fn start_must_have_exactly_one_edge() {
        let mut g = graph_with(&["a"]);
        g.add_edge("a", END);
        assert_eq!(err(g), CompilationError::MissingStart);

        let mut g = graph_with(&["a", "b"]);
        g.add_edge(START, "a").add_edge(START, "b");
        g.add_edge("a", END).add_edge("b", END);
        assert_eq!(err(g), CompilationError::MissingStart);
    }

    /// **Scenario**: a node with a plain edge and conditional edges is rejected.
    #[test]
    fn plain_plus_conditional_conflicts() {
        let mut g = graph_with(&["a", "b"]);
        g.add_edge(START, "a").add_edge("a", "b").add_edge("b", END);
        g.add_conditional_edges("a", |_: &i32| "x".to_string(), [("x", END)]);
        assert_eq!(err(g), CompilationError::ConflictingEdges("a".into()));
    }

    #[test]
    fn two_plain_edges_conflict() {
        let mut g = graph_with(&["a", "b"]);
        g.add_edge(START, "a").add_edge("a", "b").add_edge("a", END).add_edge("b", END);
        assert_eq!(err(g), CompilationError::ConflictingEdges("a".into()));
    }

    #[test]
    fn empty_path_map_rejected() {
        let mut g = graph_with(&["a"]);
        g.add_edge(START, "a");
        g.add_conditional_edges("a", |_: &i32| "x".to_string(), Vec::<(String, String)>::new());
        assert_eq!(err(g), CompilationError::EmptyPathMap("a".into()));
    }

    #[test]
    fn node_without_outgoing_edge_rejected() {
        let mut g = graph_with(&["a", "b"]);
        g.add_edge(START, "a").add_edge("a", "b");
        assert_eq!(err(g), CompilationError::MissingOutgoingEdge("b".into()));
    }

    #[test]
    fn unreachable_node_rejected() {
        let mut g = graph_with(&["a", "island"]);
        g.add_edge(START, "a").add_edge("a", END).add_edge("island", END);
        assert_eq!(err(g), CompilationError::Unreachable("island".into()));
    }
}
