//! `reflection`: generate, critique, regenerate.

use std::sync::Arc;

use toolgraph::{LlmClient, ReflectionAgent, ReflectionConfig};

use super::Error;

pub const DEFAULT_INPUT: &str = "Improve the following tweet: 'I'm so excited to be here! \
presenting the latest toolgraph features!', also add a question to the end of the tweet.";

/// Runs the reflection loop; returns the last generated draft.
///
/// One client plays both the generator and the critic.
pub async fn run_reflection(
    llm: Arc<dyn LlmClient>,
    config: ReflectionConfig,
    input: &str,
) -> Result<String, Error> {
    let agent = ReflectionAgent::new(llm.clone(), llm, config)?;
    let state = agent.invoke(input).await?;
    for message in &state.messages {
        tracing::debug!(role = message.role(), content = %message.content(), "reflection turn");
    }
    state
        .messages
        .iter()
        .rev()
        .find(|m| m.role() == "assistant")
        .map(|m| m.content().to_string())
        .ok_or_else(|| "reflection run produced no draft".into())
}
