//! Tool registry: name-keyed, registration order preserved.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::Tool;
use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Registry of tools keyed by exact name.
///
/// Built once at startup (`register` or the `with` builder) and then shared read-only,
/// usually as `Arc<ToolRegistry>`. Lookup never falls back: `get` either returns the tool
/// registered under that name or `ToolSourceError::NotFound`.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool. Fails with `Duplicate` if the name is taken.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolSourceError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolSourceError::Duplicate(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Builder-style `register`.
    pub fn with(mut self, tool: impl Tool + 'static) -> Result<Self, ToolSourceError> {
        self.register(Box::new(tool))?;
        Ok(self)
    }

    /// Returns the tool registered as `name`.
    pub fn get(&self, name: &str) -> Result<&dyn Tool, ToolSourceError> {
        self.index
            .get(name)
            .map(|&i| self.tools[i].as_ref())
            .ok_or_else(|| ToolSourceError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Specs in registration order.
    pub fn list(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Looks up `name` and runs it once with `args`.
    pub async fn call(&self, name: &str, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        self.get(name)?.call(args).await
    }
}

#[async_trait]
impl ToolSource for ToolRegistry {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.list())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError> {
        self.call(name, arguments).await
    }
}
