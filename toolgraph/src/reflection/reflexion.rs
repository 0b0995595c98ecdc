//! Reflexion loop: draft with self-critique, research, revise with citations.
//!
//! `START → draft →(has tool call?) {execute_tools, END}`, `execute_tools → revise`,
//! `revise →(tool visits < max_iterations?) {execute_tools, END}`.
//!
//! `draft` and `revise` expect clients bound to the [`AnswerQuestion`] / [`ReviseAnswer`]
//! tool with a forced tool choice, e.g.
//! `ChatOpenAI::new(model).with_tools(vec![AnswerQuestion::tool_spec()])
//! .with_tool_choice(ToolChoiceMode::Function(ANSWER_QUESTION.into()))`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::AgentError;
use crate::graph::{
    CompilationError, CompiledStateGraph, LoggingNodeMiddleware, Next, Node, StateGraph,
    DEFAULT_RECURSION_LIMIT, END, START,
};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::prompt::PromptTemplate;
use crate::tools::Tool;

use super::{AnswerQuestion, MessagesState};

pub const DRAFT: &str = "draft";
pub const EXECUTE_TOOLS: &str = "execute_tools";
pub const REVISE: &str = "revise";

/// Actor system prompt. Variables: `time`, `first_instruction`.
pub const ACTOR_PROMPT_TEMPLATE: &str = "You are expert researcher.
Current time: {time}

1. {first_instruction}
2. Reflect and critique your answer. Be severe to maximize improvement.
3. Recommend search queries to research information and improve your answer.";

pub const FIRST_INSTRUCTION: &str = "Provide a detailed ~250 word answer.";

pub const REVISE_INSTRUCTIONS: &str = "Revise your previous answer using the new information.
    - You should use the previous critique to add important information to your answer.
        - You MUST include numerical citations in your revised answer to ensure it can be verified.
        - Add a \"References\" section to the bottom of your answer (which does not count towards the word limit). In form of:
            - [1] https://example.com
            - [2] https://example.com
    - You should use the previous critique to remove superfluous information from your answer and make SURE it is not more than 250 words.";

const FORMAT_REMINDER: &str = "Answer the user's question above using the required format.";

/// Settings for [`ReflexionAgent`].
#[derive(Debug, Clone)]
pub struct ReflexionConfig {
    /// Tool messages after which revising stops.
    pub max_iterations: usize,
    pub verbose: bool,
}

impl Default for ReflexionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            verbose: false,
        }
    }
}

/// Draft or revise step: actor prompt + conversation + format reminder → one assistant turn.
pub struct ActorNode {
    id: &'static str,
    llm: Arc<dyn LlmClient>,
    instruction: String,
}

impl ActorNode {
    pub fn draft(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            id: DRAFT,
            llm,
            instruction: FIRST_INSTRUCTION.to_string(),
        }
    }

    pub fn revise(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            id: REVISE,
            llm,
            instruction: REVISE_INSTRUCTIONS.to_string(),
        }
    }

    fn system_prompt(&self) -> Result<String, AgentError> {
        let time = chrono::Utc::now().to_rfc3339();
        PromptTemplate::from_template(ACTOR_PROMPT_TEMPLATE)?
            .format(&[("time", time.as_str()), ("first_instruction", self.instruction.as_str())])
    }
}

#[async_trait]
impl Node<MessagesState> for ActorNode {
    fn id(&self) -> &str {
        self.id
    }

    async fn run(&self, state: MessagesState) -> Result<(MessagesState, Next), AgentError> {
        let mut prompt = Vec::with_capacity(state.messages.len() + 2);
        prompt.push(Message::system(self.system_prompt()?));
        prompt.extend_from_slice(&state.messages);
        prompt.push(Message::system(FORMAT_REMINDER));

        let response = self.llm.invoke(&prompt).await?;
        tracing::debug!(node = self.id, tool_calls = response.tool_calls.len(), "actor");
        let mut messages = state.messages;
        messages.push(response.to_message());
        Ok((MessagesState { messages }, Next::Continue))
    }
}

/// Runs every search query of the last assistant turn's tool calls; one tool message per
/// call, holding the results of all its queries.
pub struct ExecuteToolsNode {
    search: Arc<dyn Tool>,
}

impl ExecuteToolsNode {
    pub fn new(search: Arc<dyn Tool>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Node<MessagesState> for ExecuteToolsNode {
    fn id(&self) -> &str {
        EXECUTE_TOOLS
    }

    async fn run(&self, state: MessagesState) -> Result<(MessagesState, Next), AgentError> {
        let calls = state
            .last_message()
            .map(|m| m.tool_calls().to_vec())
            .unwrap_or_default();
        let mut messages = state.messages;
        for call in calls {
            let answer = AnswerQuestion::from_tool_call(&call)?;
            let mut results = Vec::with_capacity(answer.search_queries.len());
            for query in &answer.search_queries {
                tracing::debug!(tool = %self.search.name(), query = %query, "search");
                let out = self
                    .search
                    .call(json!({ "query": query }))
                    .await
                    .map_err(|e| AgentError::from_tool_error(self.search.name(), e))?;
                let parsed = serde_json::from_str::<Value>(&out.text)
                    .unwrap_or(Value::String(out.text));
                results.push(json!({ "query": query, "results": parsed }));
            }
            messages.push(Message::tool(
                call.id.clone(),
                call.name.clone(),
                Value::Array(results).to_string(),
            ));
        }
        Ok((MessagesState { messages }, Next::Continue))
    }
}

fn last_has_tool_calls(state: &MessagesState) -> bool {
    state
        .last_message()
        .map(|m| !m.tool_calls().is_empty())
        .unwrap_or(false)
}

/// Router after `draft`.
pub fn should_continue(state: &MessagesState) -> String {
    if last_has_tool_calls(state) {
        EXECUTE_TOOLS.to_string()
    } else {
        END.to_string()
    }
}

/// Router after `revise`: END once `max_iterations` tool messages exist, or when the
/// revision requested no research.
pub fn event_loop(max_iterations: usize) -> impl Fn(&MessagesState) -> String + Send + Sync {
    move |state: &MessagesState| {
        if state.tool_message_count() >= max_iterations || !last_has_tool_calls(state) {
            END.to_string()
        } else {
            EXECUTE_TOOLS.to_string()
        }
    }
}

/// Builds the uncompiled reflexion graph.
pub fn build_reflexion_graph(
    drafter: Arc<dyn LlmClient>,
    revisor: Arc<dyn LlmClient>,
    search: Arc<dyn Tool>,
    config: &ReflexionConfig,
) -> StateGraph<MessagesState> {
    let mut graph = StateGraph::<MessagesState>::new();
    graph
        .add_node(DRAFT, Arc::new(ActorNode::draft(drafter)))
        .add_node(EXECUTE_TOOLS, Arc::new(ExecuteToolsNode::new(search)))
        .add_node(REVISE, Arc::new(ActorNode::revise(revisor)))
        .add_edge(START, DRAFT)
        .add_conditional_edges(
            DRAFT,
            should_continue,
            [(EXECUTE_TOOLS, EXECUTE_TOOLS), (END, END)],
        )
        .add_edge(EXECUTE_TOOLS, REVISE)
        .add_conditional_edges(
            REVISE,
            event_loop(config.max_iterations),
            [(EXECUTE_TOOLS, EXECUTE_TOOLS), (END, END)],
        );
    graph
}

/// Answer text of the last assistant turn: the structured `answer` field when the turn is
/// a tool call, else its plain content.
pub fn final_answer(state: &MessagesState) -> Option<String> {
    let last = state.messages.iter().rev().find(|m| m.role() == "assistant")?;
    match last.tool_calls().first() {
        Some(call) => AnswerQuestion::from_tool_call(call).ok().map(|a| a.answer),
        None => Some(last.content().to_string()),
    }
}

/// Compiled reflexion loop.
pub struct ReflexionAgent {
    compiled: CompiledStateGraph<MessagesState>,
}

impl ReflexionAgent {
    pub fn new(
        drafter: Arc<dyn LlmClient>,
        revisor: Arc<dyn LlmClient>,
        search: Arc<dyn Tool>,
        config: ReflexionConfig,
    ) -> Result<Self, CompilationError> {
        let graph = build_reflexion_graph(drafter, revisor, search, &config);
        let graph = if config.verbose {
            graph.with_middleware(Arc::new(LoggingNodeMiddleware::<MessagesState>::new()))
        } else {
            graph
        };
        // draft, then one execute_tools + revise pair per iteration.
        let limit = DEFAULT_RECURSION_LIMIT.max(2 * config.max_iterations + 3);
        Ok(Self {
            compiled: graph.compile()?.with_recursion_limit(limit),
        })
    }

    pub async fn invoke(&self, question: &str) -> Result<MessagesState, AgentError> {
        self.compiled.invoke(MessagesState::from_user(question)).await
    }
}
