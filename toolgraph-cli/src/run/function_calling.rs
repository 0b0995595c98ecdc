//! `function-calling`: native tool-calling loop.

use std::sync::Arc;

use toolgraph::{
    LlmClient, Message, StringLengthTool, ToolCallingLoop, ToolRegistry, ToolSourceError,
    TripleTool,
};

use super::Error;

pub const DEFAULT_INPUT: &str = "What is the length of the string: DOG";

/// Triple and string-length, in that order.
pub fn tools() -> Result<ToolRegistry, ToolSourceError> {
    ToolRegistry::new().with(TripleTool)?.with(StringLengthTool)
}

/// Runs the dispatch loop for `input`. `llm` should already have `tools` bound.
pub async fn run_function_calling(
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    max_steps: usize,
    input: &str,
) -> Result<String, Error> {
    let out = ToolCallingLoop::new(llm, tools)
        .with_max_steps(max_steps)
        .run(vec![Message::user(input)])
        .await?;
    tracing::debug!(steps = out.steps, messages = out.messages.len(), "loop finished");
    Ok(out.answer)
}
