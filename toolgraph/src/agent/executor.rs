//! Text ReAct executor: plan, dispatch one action, repeat within a budget.

use std::sync::Arc;

use serde_json::Value;

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::prompt::PromptTemplate;
use crate::tool_source::ToolSource;

use super::prompt::{format_log_to_str, render_text_description, render_tool_names};
use super::{AgentAction, AgentFinish, AgentStep, ReActOutputParser, REACT_TEXT_TEMPLATE};

/// Generation stops before the model writes its own observation.
pub const STOP_SEQUENCES: [&str; 2] = ["\nObservation:", "Observation:"];

/// Iteration budget used by [`AgentExecutor::new`].
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Result of one [`AgentExecutor::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// An action ran; its `(action, observation)` pair was appended to the steps.
    Action {
        action: AgentAction,
        observation: String,
    },
    Finish(AgentFinish),
}

/// Runs the text ReAct loop over a tool source.
///
/// **Interaction**: Uses `LlmClient::invoke_with_stop`, `ReActOutputParser` and
/// `ToolSource::call_tool`.
pub struct AgentExecutor {
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    max_iterations: usize,
    parser: ReActOutputParser,
}

impl AgentExecutor {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<dyn ToolSource>) -> Self {
        Self {
            llm,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            parser: ReActOutputParser,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Renders the full prompt for `input` and the steps taken so far.
    pub async fn render_prompt(
        &self,
        input: &str,
        steps: &[(AgentAction, String)],
    ) -> Result<String, AgentError> {
        let specs = self
            .tools
            .list_tools()
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("listing tools failed: {}", e)))?;
        let scratchpad = format_log_to_str(steps);
        PromptTemplate::from_template(REACT_TEXT_TEMPLATE)?
            .partial("tools", render_text_description(&specs))
            .partial("tool_names", render_tool_names(&specs))
            .format(&[("input", input), ("agent_scratchpad", scratchpad.as_str())])
    }

    /// Asks the model for the next action or the final answer.
    pub async fn plan(
        &self,
        input: &str,
        steps: &[(AgentAction, String)],
    ) -> Result<AgentStep, AgentError> {
        let prompt = self.render_prompt(input, steps).await?;
        let stop: Vec<String> = STOP_SEQUENCES.iter().map(|s| s.to_string()).collect();
        let response = self
            .llm
            .invoke_with_stop(&[Message::user(prompt)], &stop)
            .await?;
        self.parser
            .parse(&response.content)
            .map_err(|e| AgentError::Parse(e.to_string()))
    }

    /// Tool input as the tool receives it: a JSON object when the model wrote one, else the
    /// raw string.
    fn tool_args(tool_input: &str) -> Value {
        match serde_json::from_str::<Value>(tool_input) {
            Ok(v @ Value::Object(_)) => v,
            _ => Value::String(tool_input.to_string()),
        }
    }

    /// Plans once; on an action, executes it and appends exactly one `(action, observation)`
    /// pair to `steps`. A finish leaves `steps` unchanged.
    pub async fn step(
        &self,
        input: &str,
        steps: &mut Vec<(AgentAction, String)>,
    ) -> Result<StepOutcome, AgentError> {
        match self.plan(input, steps).await? {
            AgentStep::Finish(finish) => {
                tracing::debug!(output = %finish.output, "Agent finished");
                Ok(StepOutcome::Finish(finish))
            }
            AgentStep::Action(action) => {
                tracing::debug!(tool = %action.tool, input = %action.tool_input, "Agent action");
                let observation = self
                    .tools
                    .call_tool(&action.tool, Self::tool_args(&action.tool_input))
                    .await
                    .map_err(|e| AgentError::from_tool_error(&action.tool, e))?
                    .text;
                tracing::debug!(tool = %action.tool, observation = %observation, "Observation");
                steps.push((action.clone(), observation.clone()));
                Ok(StepOutcome::Action {
                    action,
                    observation,
                })
            }
        }
    }

    /// Steps until a final answer, failing with `IterationLimitExceeded` after
    /// `max_iterations` steps without one.
    pub async fn invoke(&self, input: &str) -> Result<AgentFinish, AgentError> {
        let mut steps = Vec::new();
        let mut iterations = 0;
        loop {
            if iterations >= self.max_iterations {
                tracing::warn!(limit = self.max_iterations, "Agent iteration budget exhausted");
                return Err(AgentError::IterationLimitExceeded {
                    limit: self.max_iterations,
                });
            }
            iterations += 1;
            if let StepOutcome::Finish(finish) = self.step(input, &mut steps).await? {
                return Ok(finish);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, MockLlm};
    use crate::tools::{StringLengthTool, ToolRegistry};

    fn tools() -> Arc<dyn ToolSource> {
        Arc::new(ToolRegistry::new().with(StringLengthTool).unwrap())
    }

    /// **Scenario**: action, observation, final answer; the second prompt carries the scratchpad.
    #[tokio::test]
    async fn invoke_runs_action_then_finishes() {
        let llm = Arc::new(MockLlm::scripted(vec![
            LlmResponse::text(
                " I should measure it.\nAction: get_string_length\nAction Input: 'independiente'\nObservation: 99",
            ),
            LlmResponse::text(" I now know the final answer\nFinal Answer: 13"),
        ]));
        let exec = AgentExecutor::new(llm.clone(), tools());
        let finish = exec
            .invoke("What is the length of the string 'independiente'")
            .await
            .unwrap();
        assert_eq!(finish.output, "13");

        let prompts = llm.prompts();
        let second = prompts[1][0].content();
        assert!(second.contains("Action Input: 'independiente'\nObservation: 13\nThought: "));
        // The hallucinated observation was cut by the stop sequence.
        assert!(!second.contains("99"));
        assert!(second.contains("get_string_length: This tool returns the length of a string"));
    }

    #[tokio::test]
    async fn step_appends_exactly_one_pair_on_action_and_none_on_finish() {
        let llm = Arc::new(MockLlm::scripted(vec![
            LlmResponse::text("Action: get_string_length\nAction Input: dog"),
            LlmResponse::text("Final Answer: 3"),
        ]));
        let exec = AgentExecutor::new(llm, tools());
        let mut steps = Vec::new();
        let first = exec.step("q", &mut steps).await.unwrap();
        assert!(matches!(first, StepOutcome::Action { ref observation, .. } if observation == "3"));
        assert_eq!(steps.len(), 1);
        let second = exec.step("q", &mut steps).await.unwrap();
        assert!(matches!(second, StepOutcome::Finish(_)));
        assert_eq!(steps.len(), 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let llm = Arc::new(MockLlm::scripted(vec![LlmResponse::text(
            "Action: get_weather\nAction Input: Paris",
        )]));
        let err = AgentExecutor::new(llm, tools()).invoke("q").await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(ref n) if n == "get_weather"));
    }

    #[tokio::test]
    async fn unparseable_output_is_parse_error() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("I refuse to follow the format"));
        let err = AgentExecutor::new(llm, tools()).invoke("q").await.unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[tokio::test]
    async fn endless_actions_hit_the_budget() {
        let llm = Arc::new(MockLlm::fixed(LlmResponse::text(
            "Action: get_string_length\nAction Input: dog",
        )));
        let err = AgentExecutor::new(llm.clone(), tools())
            .with_max_iterations(2)
            .invoke("q")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::IterationLimitExceeded { limit: 2 }));
        assert_eq!(llm.call_count(), 2);
    }

    #[test]
    fn json_object_input_is_passed_as_object() {
        assert_eq!(
            AgentExecutor::tool_args(r#"{"text": "dog"}"#),
            serde_json::json!({"text": "dog"})
        );
        assert_eq!(AgentExecutor::tool_args("dog"), Value::String("dog".into()));
        assert_eq!(AgentExecutor::tool_args("3"), Value::String("3".into()));
    }
}
