use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};

/// A named callable the model can request.
///
/// `name()` must equal `spec().name`; the registry keys tools by it.
///
/// **Interaction**: Registered in [`ToolRegistry`](super::ToolRegistry); `spec()` feeds
/// `ToolRegistry::list()`, `call()` runs once per requested tool call.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn spec(&self) -> ToolSpec;

    /// Executes the tool with parsed JSON arguments.
    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError>;
}
