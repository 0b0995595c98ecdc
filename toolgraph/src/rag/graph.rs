//! Wiring of the agentic RAG graph and its routers.

use std::sync::Arc;

use crate::error::AgentError;
use crate::graph::{
    CompiledStateGraph, LoggingNodeMiddleware, StateGraph, DEFAULT_RECURSION_LIMIT, END, START,
};
use crate::llm::LlmClient;
use crate::react::RunError;
use crate::retriever::Retriever;
use crate::tools::WebSearch;

use super::graders::BinaryGrader;
use super::nodes::{GenerateNode, GradeDocumentsNode, RetrieveNode, WebSearchNode};
use super::state::{GenerationGrade, GraphState};

pub const RETRIEVE: &str = "retrieve";
pub const GRADE_DOCUMENTS: &str = "grade_documents";
pub const WEBSEARCH: &str = "websearch";
pub const GENERATE: &str = "generate";

const NOT_SUPPORTED: &str = "not supported";
const NOT_USEFUL: &str = "not useful";
const USEFUL: &str = "useful";
const EXHAUSTED: &str = "exhausted";

/// Settings for [`RagWorkflow`].
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Generations allowed before a not-yet-useful answer is returned as is.
    pub max_generations: usize,
    pub verbose: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            max_generations: 3,
            verbose: false,
        }
    }
}

/// Router after `grade_documents`.
pub fn decide_to_generate(state: &GraphState) -> String {
    if state.web_search {
        WEBSEARCH.to_string()
    } else {
        GENERATE.to_string()
    }
}

/// Router after `generate`: maps the recorded grade to a label; once `max_generations`
/// answers were produced without a useful one, returns `"exhausted"`.
pub fn grade_generation(max_generations: usize) -> impl Fn(&GraphState) -> String + Send + Sync {
    move |state: &GraphState| {
        let label = match state.generation_grade {
            Some(GenerationGrade::Useful) => USEFUL,
            _ if state.generations >= max_generations => EXHAUSTED,
            Some(GenerationGrade::NotUseful) => NOT_USEFUL,
            Some(GenerationGrade::NotSupported) | None => NOT_SUPPORTED,
        };
        label.to_string()
    }
}

/// The model clients and backends the RAG graph runs on.
pub struct RagComponents {
    pub retriever: Arc<dyn Retriever>,
    pub web_search: Arc<dyn WebSearch>,
    /// Writes answers.
    pub llm: Arc<dyn LlmClient>,
    pub retrieval_grader: BinaryGrader,
    pub hallucination_grader: BinaryGrader,
    pub answer_grader: BinaryGrader,
}

/// Builds the uncompiled RAG graph.
pub fn build_rag_graph(
    components: RagComponents,
    config: &RagConfig,
) -> Result<StateGraph<GraphState>, AgentError> {
    let generate = GenerateNode::new(
        components.llm,
        Arc::new(components.hallucination_grader),
        Arc::new(components.answer_grader),
    )?;
    let mut graph = StateGraph::<GraphState>::new();
    graph
        .add_node(RETRIEVE, Arc::new(RetrieveNode::new(components.retriever)))
        .add_node(
            GRADE_DOCUMENTS,
            Arc::new(GradeDocumentsNode::new(Arc::new(components.retrieval_grader))),
        )
        .add_node(WEBSEARCH, Arc::new(WebSearchNode::new(components.web_search)))
        .add_node(GENERATE, Arc::new(generate))
        .add_edge(START, RETRIEVE)
        .add_edge(RETRIEVE, GRADE_DOCUMENTS)
        .add_conditional_edges(
            GRADE_DOCUMENTS,
            decide_to_generate,
            [(WEBSEARCH, WEBSEARCH), (GENERATE, GENERATE)],
        )
        .add_edge(WEBSEARCH, GENERATE)
        .add_conditional_edges(
            GENERATE,
            grade_generation(config.max_generations),
            [
                (NOT_SUPPORTED, GENERATE),
                (NOT_USEFUL, WEBSEARCH),
                (USEFUL, END),
                (EXHAUSTED, END),
            ],
        );
    Ok(graph)
}

/// Compiled agentic RAG workflow.
pub struct RagWorkflow {
    compiled: CompiledStateGraph<GraphState>,
}

impl RagWorkflow {
    pub fn new(components: RagComponents, config: RagConfig) -> Result<Self, RunError> {
        let graph = build_rag_graph(components, &config)?;
        let graph = if config.verbose {
            graph.with_middleware(Arc::new(LoggingNodeMiddleware::<GraphState>::new()))
        } else {
            graph
        };
        // retrieve, grade, websearch, then at most a websearch + generate pair per generation.
        let limit = DEFAULT_RECURSION_LIMIT.max(3 + 2 * config.max_generations);
        Ok(Self {
            compiled: graph.compile()?.with_recursion_limit(limit),
        })
    }

    pub async fn invoke(&self, question: &str) -> Result<GraphState, AgentError> {
        self.compiled.invoke(GraphState::new(question)).await
    }
}
