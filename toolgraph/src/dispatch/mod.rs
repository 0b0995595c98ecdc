//! Native function-calling dispatch loop.
//!
//! The model receives the conversation and (via the client's tool bindings) the registry's
//! tool specs. Each step invokes the model once; requested tool calls are looked up by exact
//! name in the [`ToolRegistry`], executed in order and answered with one tool message each.
//! A reply without tool calls is the final answer.
//!
//! **Interaction**: Drives `LlmClient` and `ToolRegistry` directly, without a graph. The
//! graph-based equivalent is [`ReactRunner`](crate::react::ReactRunner).

use std::sync::Arc;

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::react::truncate_for_log;
use crate::state::ToolResult;
use crate::tool_source::ToolSourceError;
use crate::tools::ToolRegistry;

/// Step budget used by [`ToolCallingLoop::new`].
pub const DEFAULT_MAX_STEPS: usize = 10;

/// What one [`ToolCallingLoop::step`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Tools ran; one observation per requested call, in call order.
    Continue { observations: Vec<ToolResult> },
    /// The model answered without requesting tools.
    Final(String),
}

/// Result of a finished [`ToolCallingLoop::run`].
#[derive(Debug, Clone)]
pub struct LoopOutput {
    pub answer: String,
    /// Full transcript, including the input messages.
    pub messages: Vec<Message>,
    /// Model invocations used.
    pub steps: usize,
}

/// Manual tool-calling loop over an LLM and a tool registry.
///
/// # Example
///
/// ```ignore
/// let tools = Arc::new(ToolRegistry::new().with(StringLengthTool)?);
/// let llm = ChatOpenAI::new("gpt-4.1-nano").with_tools(tools.list());
/// let out = ToolCallingLoop::new(Arc::new(llm), tools)
///     .run(vec![Message::user("How long is 'dog'?")])
///     .await?;
/// ```
pub struct ToolCallingLoop {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    max_steps: usize,
}

impl ToolCallingLoop {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            llm,
            tools,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// One model turn. Appends the assistant message, then one tool message per requested
    /// call. Nothing is appended after a final answer.
    ///
    /// Fails with `ToolNotFound` when the model names an unregistered tool and with
    /// `AgentError::Tool` when arguments are not JSON or the tool fails; the transcript then
    /// ends with the assistant message that caused the error.
    pub async fn step(&self, messages: &mut Vec<Message>) -> Result<StepOutcome, AgentError> {
        let response = self.llm.invoke(messages).await?;
        messages.push(response.to_message());

        if response.tool_calls.is_empty() {
            tracing::debug!(answer_len = response.content.len(), "Final answer");
            return Ok(StepOutcome::Final(response.content));
        }

        let mut observations = Vec::with_capacity(response.tool_calls.len());
        for call in &response.tool_calls {
            let args = call.parse_arguments().map_err(|e| {
                AgentError::from_tool_error(
                    &call.name,
                    ToolSourceError::InvalidInput(format!("arguments are not JSON: {}", e)),
                )
            })?;
            tracing::debug!(tool = %call.name, args = %args, "Dispatching tool call");
            let content = self
                .tools
                .call(&call.name, args)
                .await
                .map_err(|e| AgentError::from_tool_error(&call.name, e))?;
            tracing::debug!(
                tool = %call.name,
                observation = %truncate_for_log(&content.text, 200),
                "Observation"
            );
            let result = ToolResult {
                call_id: call.id.clone(),
                name: call.name.clone(),
                content: content.text,
            };
            messages.push(Message::tool(
                result.call_id.clone(),
                result.name.clone(),
                result.content.clone(),
            ));
            observations.push(result);
        }
        Ok(StepOutcome::Continue { observations })
    }

    /// Steps until a final answer. The budget is checked before each step; after
    /// `max_steps` steps without an answer the run fails with `IterationLimitExceeded`.
    pub async fn run(&self, mut messages: Vec<Message>) -> Result<LoopOutput, AgentError> {
        let mut steps = 0;
        loop {
            if steps >= self.max_steps {
                tracing::warn!(limit = self.max_steps, "Step budget exhausted");
                return Err(AgentError::IterationLimitExceeded {
                    limit: self.max_steps,
                });
            }
            steps += 1;
            if let StepOutcome::Final(answer) = self.step(&mut messages).await? {
                return Ok(LoopOutput {
                    answer,
                    messages,
                    steps,
                });
            }
        }
    }
}
