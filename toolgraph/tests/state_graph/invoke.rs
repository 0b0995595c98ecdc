//! StateGraph invoke: chains, conditional routing, recursion limit, middleware.

use std::sync::Arc;

use toolgraph::{AgentError, LoggingNodeMiddleware, StateGraph, END, START};

use crate::common::{StepNode, Trail};

#[tokio::test]
async fn linear_chain_runs_each_node_once() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", Arc::new(StepNode::new("a")))
        .add_node("b", Arc::new(StepNode::new("b")))
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("b", END);
    let out = graph.compile().unwrap().invoke(Trail::default()).await.unwrap();
    assert_eq!(out.visited, vec!["a", "b"]);
}

/// **Scenario**: a router loops back to `work` until the counter reaches 3.
#[tokio::test]
async fn conditional_edges_loop_until_router_ends() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("work", Arc::new(StepNode::new("work")))
        .add_edge(START, "work")
        .add_conditional_edges(
            "work",
            |s: &Trail| if s.count < 3 { "again".into() } else { "done".into() },
            [("again", "work"), ("done", END)],
        );
    let out = graph.compile().unwrap().invoke(Trail::default()).await.unwrap();
    assert_eq!(out.count, 3);
}

/// **Scenario**: a label missing from the path map fails the run with UnknownRoute.
#[tokio::test]
async fn undeclared_label_fails_with_unknown_route() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", Arc::new(StepNode::new("a")))
        .add_edge(START, "a")
        .add_conditional_edges("a", |_: &Trail| "sideways".to_string(), [("done", END)]);
    match graph.compile().unwrap().invoke(Trail::default()).await {
        Err(AgentError::UnknownRoute { from, label }) => {
            assert_eq!(from, "a");
            assert_eq!(label, "sideways");
        }
        other => panic!("expected UnknownRoute, got {:?}", other),
    }
}

#[tokio::test]
async fn endless_loop_hits_recursion_limit() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", Arc::new(StepNode::new("a")))
        .add_node("b", Arc::new(StepNode::new("b")))
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("b", "a");
    let compiled = graph.compile().unwrap().with_recursion_limit(5);
    match compiled.invoke(Trail::default()).await {
        Err(AgentError::IterationLimitExceeded { limit }) => assert_eq!(limit, 5),
        other => panic!("expected limit error, got {:?}", other),
    }
}

#[tokio::test]
async fn logging_middleware_does_not_change_the_result() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node("a", Arc::new(StepNode::new("a")))
        .add_edge(START, "a")
        .add_edge("a", END);
    let out = graph
        .with_middleware(Arc::new(LoggingNodeMiddleware::new()))
        .compile()
        .unwrap()
        .invoke(Trail::default())
        .await
        .unwrap();
    assert_eq!(out.visited, vec!["a"]);
}
