//! LLM lifecycle callbacks.
//!
//! [`CallbackLlm`] wraps any [`LlmClient`] and notifies each [`LlmCallback`] before and after
//! every call. [`TracingCallback`] logs prompts and replies through `tracing`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

/// Hook into LLM calls. Both methods default to no-ops.
pub trait LlmCallback: Send + Sync {
    fn on_llm_start(&self, _messages: &[Message]) {}

    fn on_llm_end(&self, _response: &LlmResponse) {}

    fn on_llm_error(&self, _error: &AgentError) {}
}

/// Logs the last prompt message at start and the reply at end.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCallback;

impl LlmCallback for TracingCallback {
    fn on_llm_start(&self, messages: &[Message]) {
        let prompt = messages.last().map(|m| m.content()).unwrap_or_default();
        tracing::info!(messages = messages.len(), prompt = %prompt, "llm start");
    }

    fn on_llm_end(&self, response: &LlmResponse) {
        tracing::info!(
            response = %response.content,
            tool_calls = response.tool_calls.len(),
            "llm end"
        );
    }

    fn on_llm_error(&self, error: &AgentError) {
        tracing::warn!(error = %error, "llm error");
    }
}

/// `LlmClient` wrapper that fires callbacks around the inner client.
pub struct CallbackLlm {
    inner: Arc<dyn LlmClient>,
    callbacks: Vec<Arc<dyn LlmCallback>>,
}

impl CallbackLlm {
    pub fn new(inner: Arc<dyn LlmClient>) -> Self {
        Self {
            inner,
            callbacks: Vec::new(),
        }
    }

    pub fn with_callback(mut self, callback: Arc<dyn LlmCallback>) -> Self {
        self.callbacks.push(callback);
        self
    }

    fn finish(&self, result: &Result<LlmResponse, AgentError>) {
        for cb in &self.callbacks {
            match result {
                Ok(response) => cb.on_llm_end(response),
                Err(e) => cb.on_llm_error(e),
            }
        }
    }
}

#[async_trait]
impl LlmClient for CallbackLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        for cb in &self.callbacks {
            cb.on_llm_start(messages);
        }
        let result = self.inner.invoke(messages).await;
        self.finish(&result);
        result
    }

    async fn invoke_with_stop(
        &self,
        messages: &[Message],
        stop: &[String],
    ) -> Result<LlmResponse, AgentError> {
        for cb in &self.callbacks {
            cb.on_llm_start(messages);
        }
        let result = self.inner.invoke_with_stop(messages, stop).await;
        self.finish(&result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl LlmCallback for Recorder {
        fn on_llm_start(&self, messages: &[Message]) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start:{}", messages.len()));
        }

        fn on_llm_end(&self, response: &LlmResponse) {
            self.events
                .lock()
                .unwrap()
                .push(format!("end:{}", response.content));
        }

        fn on_llm_error(&self, _error: &AgentError) {
            self.events.lock().unwrap().push("error".to_string());
        }
    }

    /// **Scenario**: start fires before the call, end after it, error on failure.
    #[tokio::test]
    async fn callbacks_fire_around_invoke() {
        let recorder = Arc::new(Recorder::default());
        let llm = CallbackLlm::new(Arc::new(MockLlm::scripted(vec![LlmResponse::text("hi")])))
            .with_callback(recorder.clone())
            .with_callback(Arc::new(TracingCallback));
        llm.invoke(&[Message::user("q")]).await.unwrap();
        assert!(llm.invoke(&[]).await.is_err());
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["start:1", "end:hi", "start:0", "error"]
        );
    }
}
