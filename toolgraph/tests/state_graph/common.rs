//! Shared state and nodes for the state graph tests.

use async_trait::async_trait;
use toolgraph::{AgentError, Next, Node};

/// Records which nodes ran, plus a counter the routers read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail {
    pub visited: Vec<String>,
    pub count: usize,
}

/// Appends its id to `visited` and bumps `count`.
pub struct StepNode {
    id: String,
}

impl StepNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl Node<Trail> for StepNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, mut state: Trail) -> Result<(Trail, Next), AgentError> {
        state.visited.push(self.id.clone());
        state.count += 1;
        Ok((state, Next::Continue))
    }
}
