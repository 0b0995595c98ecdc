//! Integration tests for StateGraph: compile validation, invoke, conditional routing.
//!
//! Tests are split into modules under `state_graph/`:
//! - `common`: shared state and nodes (Trail, StepNode)
//! - `compile_fail`: compile error cases
//! - `invoke`: plain chains, routers, recursion limit, middleware

#[path = "state_graph/common.rs"]
mod common;

#[path = "state_graph/compile_fail.rs"]
mod compile_fail;

#[path = "state_graph/invoke.rs"]
mod invoke;
