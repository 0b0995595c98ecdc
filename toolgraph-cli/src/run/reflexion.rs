//! `reflexion`: draft with self-critique, search, revise with references.

use std::sync::Arc;

use toolgraph::reflection::reflexion::final_answer;
use toolgraph::{LlmClient, ReflexionAgent, ReflexionConfig, Tool};

use super::Error;

pub const DEFAULT_INPUT: &str = "Write about AI-Powered Logistic Solutions";

/// Runs the reflexion loop. `drafter` and `revisor` should be forced to call
/// `AnswerQuestion` and `ReviseAnswer`; `search` is called once per search query.
pub async fn run_reflexion(
    drafter: Arc<dyn LlmClient>,
    revisor: Arc<dyn LlmClient>,
    search: Arc<dyn Tool>,
    config: ReflexionConfig,
    input: &str,
) -> Result<String, Error> {
    let agent = ReflexionAgent::new(drafter, revisor, search, config)?;
    let state = agent.invoke(input).await?;
    tracing::debug!(
        messages = state.messages.len(),
        searches = state.tool_message_count(),
        "reflexion finished"
    );
    final_answer(&state).ok_or_else(|| "reflexion run produced no answer".into())
}
