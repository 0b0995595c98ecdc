//! Run entry points: one workflow per subcommand.
//!
//! [`run`] and [`run_with_options`] load `.env`, build a [`RunConfig`] and dispatch to
//! [`run_with_config`], which builds the hosted clients and calls the workflow's runner.
//! Each runner takes its model clients as `Arc<dyn LlmClient>` so tests drive it with
//! `MockLlm`.

pub use crate::config::Error;

mod function_calling;
mod rag;
mod react;
mod reflection;
mod reflexion;
mod retrieval;
mod tool_calling;

use std::sync::Arc;

use clap::Subcommand;
use toolgraph::rag::{
    BinaryGrader, RagComponents, RagConfig, ANSWER_GRADER_TOOL, HALLUCINATION_GRADER_TOOL,
    RETRIEVAL_GRADER_TOOL,
};
use toolgraph::{
    AnswerQuestion, ReactRunnerConfig, ReflectionConfig, ReflexionConfig, ReviseAnswer,
    TavilySearchTool, ToolSource,
};

use crate::config::{RunConfig, RunOptions};

pub use function_calling::{run_function_calling, tools as function_calling_tools};
pub use rag::{build_retriever, run_rag, seed_documents as rag_seed_documents};
pub use react::{run_react, tools as react_tools};
pub use reflection::run_reflection;
pub use reflexion::run_reflexion;
pub use retrieval::{run_retrieval, seed_documents as retrieval_seed_documents};
pub use tool_calling::run_tool_calling;

/// The demonstrations the CLI can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Subcommand)]
pub enum Workflow {
    /// Text ReAct agent with a string-length tool.
    ToolCalling,
    /// Native function-calling loop with triple and string-length tools.
    FunctionCalling,
    /// ReAct graph (think, act, observe) with triple and optional web search.
    React,
    /// Generate and critique a tweet until the conversation is long enough.
    Reflection,
    /// Draft, search, revise with cited references.
    Reflexion,
    /// Agentic RAG with document grading and web-search fallback.
    Rag,
    /// Embed documents, persist the index, reload it and answer from it.
    Retrieval,
}

impl Workflow {
    pub fn name(self) -> &'static str {
        match self {
            Workflow::ToolCalling => "tool-calling",
            Workflow::FunctionCalling => "function-calling",
            Workflow::React => "react",
            Workflow::Reflection => "reflection",
            Workflow::Reflexion => "reflexion",
            Workflow::Rag => "rag",
            Workflow::Retrieval => "retrieval",
        }
    }

    /// Input used when `--input` is not given.
    pub fn default_input(self) -> &'static str {
        match self {
            Workflow::ToolCalling => tool_calling::DEFAULT_INPUT,
            Workflow::FunctionCalling => function_calling::DEFAULT_INPUT,
            Workflow::React => react::DEFAULT_INPUT,
            Workflow::Reflection => reflection::DEFAULT_INPUT,
            Workflow::Reflexion => reflexion::DEFAULT_INPUT,
            Workflow::Rag => rag::DEFAULT_INPUT,
            Workflow::Retrieval => retrieval::DEFAULT_INPUT,
        }
    }
}

/// Graph steps for `max_steps` tool rounds: think, act and observe per round, plus the
/// final think.
pub fn react_recursion_limit(max_steps: usize) -> usize {
    max_steps.saturating_mul(3).saturating_add(1)
}

/// Run a workflow with config from env (and .env); returns the answer text.
pub async fn run(workflow: Workflow, input: Option<&str>) -> Result<String, Error> {
    run_with_options(workflow, input, &RunOptions::default()).await
}

/// Run a workflow with config from env and `options` applied on top.
pub async fn run_with_options(
    workflow: Workflow,
    input: Option<&str>,
    options: &RunOptions,
) -> Result<String, Error> {
    dotenv::dotenv().ok();
    let mut config = RunConfig::from_env()?;
    config.apply_options(options);
    run_with_config(&config, workflow, input).await
}

/// Builds the hosted clients for `workflow` from `config` and runs it.
pub async fn run_with_config(
    config: &RunConfig,
    workflow: Workflow,
    input: Option<&str>,
) -> Result<String, Error> {
    let input = input.unwrap_or_else(|| workflow.default_input());
    tracing::info!(workflow = workflow.name(), model = %config.model, "running workflow");

    match workflow {
        Workflow::ToolCalling => {
            let llm = config.instrument(config.chat_model());
            run_tool_calling(llm, config.max_steps, input).await
        }
        Workflow::FunctionCalling => {
            let tools = Arc::new(function_calling::tools()?);
            let llm = config.instrument(config.chat_model_with_tools(tools.list()));
            run_function_calling(llm, tools, config.max_steps, input).await
        }
        Workflow::React => {
            let tools = react::tools(config.tavily_config())?;
            let llm = config.instrument(config.chat_model_with_tools(tools.list()));
            let runner_config = ReactRunnerConfig {
                recursion_limit: react_recursion_limit(config.max_steps),
                verbose: config.verbose,
                ..Default::default()
            };
            let tools: Arc<dyn ToolSource> = Arc::new(tools);
            run_react(llm, tools, runner_config, input).await
        }
        Workflow::Reflection => {
            let llm = config.instrument(config.chat_model());
            let reflection_config = ReflectionConfig {
                verbose: config.verbose,
                ..Default::default()
            };
            run_reflection(llm, reflection_config, input).await
        }
        Workflow::Reflexion => {
            let search = Arc::new(TavilySearchTool::new(config.require_tavily("reflexion")?));
            let drafter = config.instrument(config.structured_model(AnswerQuestion::tool_spec()));
            let revisor = config.instrument(config.structured_model(ReviseAnswer::tool_spec()));
            let reflexion_config = ReflexionConfig {
                verbose: config.verbose,
                ..Default::default()
            };
            run_reflexion(drafter, revisor, search, reflexion_config, input).await
        }
        Workflow::Rag => {
            let web_search = Arc::new(TavilySearchTool::new(config.require_tavily("rag")?));
            let retriever = build_retriever(Arc::new(config.create_embedder())).await?;
            let grader = |tool: &str| {
                config.instrument(config.structured_model(BinaryGrader::tool_spec_for(tool)))
            };
            let components = RagComponents {
                retriever,
                web_search,
                llm: config.instrument(config.chat_model()),
                retrieval_grader: BinaryGrader::retrieval(grader(RETRIEVAL_GRADER_TOOL))?,
                hallucination_grader: BinaryGrader::hallucination(grader(
                    HALLUCINATION_GRADER_TOOL,
                ))?,
                answer_grader: BinaryGrader::answer(grader(ANSWER_GRADER_TOOL))?,
            };
            let rag_config = RagConfig {
                verbose: config.verbose,
                ..Default::default()
            };
            run_rag(components, rag_config, input).await
        }
        Workflow::Retrieval => {
            let embedder = Arc::new(config.create_embedder());
            let llm = config.instrument(config.chat_model());
            run_retrieval(embedder, llm, &config.index_dir, input).await
        }
    }
}
