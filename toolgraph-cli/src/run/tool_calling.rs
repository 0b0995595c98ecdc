//! `tool-calling`: text ReAct agent over a string-length tool.

use std::sync::Arc;

use toolgraph::{AgentExecutor, LlmClient, StringLengthTool, ToolRegistry};

use super::Error;

pub const DEFAULT_INPUT: &str = "What is the length of the string 'independiente'?";

/// Runs the text ReAct executor for `input`; returns the final answer.
pub async fn run_tool_calling(
    llm: Arc<dyn LlmClient>,
    max_iterations: usize,
    input: &str,
) -> Result<String, Error> {
    let tools = Arc::new(ToolRegistry::new().with(StringLengthTool)?);
    let executor = AgentExecutor::new(llm, tools).with_max_iterations(max_iterations);
    let finish = executor.invoke(input).await?;
    Ok(finish.output)
}
