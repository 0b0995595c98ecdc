//! StateGraph compile failure cases.

use std::sync::Arc;

use toolgraph::{CompilationError, StateGraph, END, START};

use crate::common::{StepNode, Trail};

fn route_b(_: &Trail) -> String {
    "b".to_string()
}

#[test]
fn compile_fails_when_edge_refers_to_unknown_node() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", Arc::new(StepNode::new("a")))
        .add_edge(START, "a")
        .add_edge("a", "missing");
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::NodeNotFound("missing".into()))
    );
}

#[test]
fn compile_fails_without_start_edge() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", Arc::new(StepNode::new("a")))
        .add_edge("a", END);
    assert_eq!(graph.compile().err(), Some(CompilationError::MissingStart));
}

/// **Scenario**: a plain edge plus conditional edges from the same node is rejected.
#[test]
fn compile_fails_on_conflicting_edges() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", Arc::new(StepNode::new("a")))
        .add_node("b", Arc::new(StepNode::new("b")))
        .add_edge(START, "a")
        .add_conditional_edges("a", route_b, [("b", "b")])
        .add_edge("a", END)
        .add_edge("b", END);
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::ConflictingEdges("a".into()))
    );
}

#[test]
fn compile_fails_on_node_without_outgoing_edge() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", Arc::new(StepNode::new("a")))
        .add_edge(START, "a");
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::MissingOutgoingEdge("a".into()))
    );
}

#[test]
fn compile_fails_on_path_map_target_not_registered() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", Arc::new(StepNode::new("a")))
        .add_edge(START, "a")
        .add_conditional_edges("a", route_b, [("b", "ghost"), ("done", END)]);
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::NodeNotFound("ghost".into()))
    );
}
