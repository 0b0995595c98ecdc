//! Scripted LLM for tests and offline demos.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

/// Mock LLM: returns scripted responses in order and records every prompt.
///
/// When the script runs out, the last response repeats if `repeat_last` is set (the
/// single-response constructors); otherwise `invoke` fails with `ExecutionFailed`.
///
/// **Interaction**: Stands in for `ChatOpenAI` anywhere an `LlmClient` is expected.
pub struct MockLlm {
    script: Mutex<VecDeque<LlmResponse>>,
    last: Mutex<Option<LlmResponse>>,
    repeat_last: bool,
    prompts: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Returns `responses` in order, then errors.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            last: Mutex::new(None),
            repeat_last: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always returns `response`.
    pub fn fixed(response: LlmResponse) -> Self {
        Self {
            repeat_last: true,
            ..Self::scripted(vec![response])
        }
    }

    /// Always answers with plain text and no tool calls.
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::fixed(LlmResponse::text(content))
    }

    /// Every message list passed to `invoke`, in call order.
    pub fn prompts(&self) -> Vec<Vec<Message>> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(messages.to_vec());
        }
        let next = self
            .script
            .lock()
            .map_err(|_| AgentError::ExecutionFailed("MockLlm script poisoned".to_string()))?
            .pop_front();
        let mut last = self
            .last
            .lock()
            .map_err(|_| AgentError::ExecutionFailed("MockLlm script poisoned".to_string()))?;
        match next {
            Some(response) => {
                *last = Some(response.clone());
                Ok(response)
            }
            None if self.repeat_last => last
                .clone()
                .ok_or_else(|| AgentError::ExecutionFailed("MockLlm has no response".to_string())),
            None => Err(AgentError::ExecutionFailed(
                "MockLlm: no scripted response left".to_string(),
            )),
        }
    }
}
