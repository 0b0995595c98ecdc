//! `react`: think, act, observe graph.

use std::sync::Arc;

use toolgraph::{
    LlmClient, ReactRunner, ReactRunnerConfig, TavilyConfig, TavilySearchTool, ToolRegistry,
    ToolSource, ToolSourceError, TripleTool,
};

use super::Error;

pub const DEFAULT_INPUT: &str = "What is the temperature in Tokyo in Celsius? List it and triple it. \
Show me both results, the list and the triple.";

/// Triple, plus web search when `tavily` is set.
pub fn tools(tavily: Option<TavilyConfig>) -> Result<ToolRegistry, ToolSourceError> {
    let registry = ToolRegistry::new().with(TripleTool)?;
    match tavily {
        Some(config) => registry.with(TavilySearchTool::new(config)),
        None => {
            tracing::warn!("TAVILY_API_KEY not set; react runs without web search");
            Ok(registry)
        }
    }
}

/// Runs the ReAct graph for `input`; returns the last assistant reply.
pub async fn run_react(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    config: ReactRunnerConfig,
    input: &str,
) -> Result<String, Error> {
    let runner = ReactRunner::new(llm, tools, config)?;
    let state = runner.invoke(input).await?;
    state
        .last_assistant_reply()
        .map(ToString::to_string)
        .ok_or_else(|| "react run ended without an assistant reply".into())
}
