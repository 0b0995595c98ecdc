//! Reflection loop: a generator drafts, a critic responds, the generator revises.
//!
//! `START → generate →(should_continue) {reflect, END}`, `reflect → generate`. The critique
//! is appended as a user message so the generator reads it as feedback on its last draft.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{
    CompilationError, CompiledStateGraph, LoggingNodeMiddleware, Next, Node, StateGraph,
    DEFAULT_RECURSION_LIMIT, END, START,
};
use crate::llm::LlmClient;
use crate::message::Message;

use super::MessagesState;

/// Node id of the drafting step.
pub const GENERATE: &str = "generate";
/// Node id of the critique step.
pub const REFLECT: &str = "reflect";

pub const GENERATION_SYSTEM_PROMPT: &str = "You are a twitter techie influencer assistant tasked with writing excellent twitter posts. \
Generate the best twitter post possible for the user's request. \
If the user provides critique, respond with a revised version of your previous attempts.";

pub const REFLECTION_SYSTEM_PROMPT: &str = "You are a viral twitter influencer grading a tweet. Generate critique and recommendations for the user's tweet. \
Always provide detailed recommendations, including requests for length, virality, style, etc.";

/// Settings for [`ReflectionAgent`].
#[derive(Debug, Clone)]
pub struct ReflectionConfig {
    /// The loop ends after a generation once the conversation holds more messages than this.
    pub max_messages: usize,
    pub generation_prompt: String,
    pub reflection_prompt: String,
    pub verbose: bool,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            max_messages: 6,
            generation_prompt: GENERATION_SYSTEM_PROMPT.to_string(),
            reflection_prompt: REFLECTION_SYSTEM_PROMPT.to_string(),
            verbose: false,
        }
    }
}

fn with_system(system: &str, messages: &[Message]) -> Vec<Message> {
    let mut prompt = Vec::with_capacity(messages.len() + 1);
    prompt.push(Message::system(system));
    prompt.extend_from_slice(messages);
    prompt
}

/// Appends the generator's reply as an assistant message.
pub struct GenerateNode {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl GenerateNode {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }
}

#[async_trait]
impl Node<MessagesState> for GenerateNode {
    fn id(&self) -> &str {
        GENERATE
    }

    async fn run(&self, state: MessagesState) -> Result<(MessagesState, Next), AgentError> {
        let response = self
            .llm
            .invoke(&with_system(&self.system_prompt, &state.messages))
            .await?;
        let mut messages = state.messages;
        messages.push(Message::assistant(response.content));
        Ok((MessagesState { messages }, Next::Continue))
    }
}

/// Appends the critic's reply as a user message.
pub struct ReflectNode {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl ReflectNode {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }
}

#[async_trait]
impl Node<MessagesState> for ReflectNode {
    fn id(&self) -> &str {
        REFLECT
    }

    async fn run(&self, state: MessagesState) -> Result<(MessagesState, Next), AgentError> {
        let response = self
            .llm
            .invoke(&with_system(&self.system_prompt, &state.messages))
            .await?;
        tracing::debug!(critique_len = response.content.len(), "reflect");
        let mut messages = state.messages;
        messages.push(Message::user(response.content));
        Ok((MessagesState { messages }, Next::Continue))
    }
}

/// Router after `generate`: END once the conversation is longer than `max_messages`.
pub fn should_continue(max_messages: usize) -> impl Fn(&MessagesState) -> String + Send + Sync {
    move |state: &MessagesState| {
        if state.messages.len() > max_messages {
            END.to_string()
        } else {
            REFLECT.to_string()
        }
    }
}

/// Builds the uncompiled reflection graph.
pub fn build_reflection_graph(
    generator: Arc<dyn LlmClient>,
    critic: Arc<dyn LlmClient>,
    config: &ReflectionConfig,
) -> StateGraph<MessagesState> {
    let mut graph = StateGraph::<MessagesState>::new();
    graph
        .add_node(
            GENERATE,
            Arc::new(GenerateNode::new(generator, config.generation_prompt.clone())),
        )
        .add_node(
            REFLECT,
            Arc::new(ReflectNode::new(critic, config.reflection_prompt.clone())),
        )
        .add_edge(START, GENERATE)
        .add_conditional_edges(
            GENERATE,
            should_continue(config.max_messages),
            [(REFLECT, REFLECT), (END, END)],
        )
        .add_edge(REFLECT, GENERATE);
    graph
}

/// Compiled reflection loop.
pub struct ReflectionAgent {
    compiled: CompiledStateGraph<MessagesState>,
}

impl ReflectionAgent {
    /// `generator` and `critic` may be the same client.
    pub fn new(
        generator: Arc<dyn LlmClient>,
        critic: Arc<dyn LlmClient>,
        config: ReflectionConfig,
    ) -> Result<Self, CompilationError> {
        let graph = build_reflection_graph(generator, critic, &config);
        let graph = if config.verbose {
            graph.with_middleware(Arc::new(LoggingNodeMiddleware::<MessagesState>::new()))
        } else {
            graph
        };
        // Each message beyond the request costs one node step.
        let limit = DEFAULT_RECURSION_LIMIT.max(config.max_messages + 2);
        Ok(Self {
            compiled: graph.compile()?.with_recursion_limit(limit),
        })
    }

    /// Runs the loop on one user request; returns the whole conversation.
    pub async fn invoke(&self, request: &str) -> Result<MessagesState, AgentError> {
        self.compiled.invoke(MessagesState::from_user(request)).await
    }
}
