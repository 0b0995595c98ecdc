//! `rag`: agentic RAG over a small in-memory corpus with web-search fallback.

use std::sync::Arc;

use toolgraph::rag::{RagComponents, RagConfig, RagWorkflow};
use toolgraph::{Document, Embedder, InMemoryVectorStore, Retriever};

use super::Error;

pub const DEFAULT_INPUT: &str = "What is agent memory?";

/// Documents retrieved per question.
const TOP_K: usize = 4;

const AGENTS_SOURCE: &str = "https://lilianweng.github.io/posts/2023-06-23-agent/";
const PROMPTING_SOURCE: &str = "https://lilianweng.github.io/posts/2023-03-15-prompt-engineering/";
const ATTACKS_SOURCE: &str = "https://lilianweng.github.io/posts/2023-10-25-adv-attack-llm/";

/// Seed corpus: short passages on agents, prompting and adversarial attacks.
pub fn seed_documents() -> Vec<Document> {
    [
        (
            AGENTS_SOURCE,
            "In an LLM-powered autonomous agent system, the LLM functions as the agent's brain, \
             complemented by planning, memory and tool use.",
        ),
        (
            AGENTS_SOURCE,
            "Short-term memory is in-context learning: everything in the prompt. Long-term memory \
             lets the agent retain and recall information over extended periods, often by \
             leveraging an external vector store and fast retrieval.",
        ),
        (
            AGENTS_SOURCE,
            "Tool use: the agent learns to call external APIs for extra information that is \
             missing from the model weights, such as current information, code execution or \
             access to proprietary sources.",
        ),
        (
            PROMPTING_SOURCE,
            "Chain-of-thought prompting generates a sequence of short sentences describing \
             reasoning logic step by step before the final answer.",
        ),
        (
            PROMPTING_SOURCE,
            "Few-shot learning presents a set of high-quality demonstrations, each with input and \
             desired output, on the target task.",
        ),
        (
            ATTACKS_SOURCE,
            "Adversarial attacks or jailbreak prompts could potentially trigger the model to \
             output something undesired despite safety alignment.",
        ),
    ]
    .into_iter()
    .map(|(source, text)| Document::new(text).with_metadata("source", source))
    .collect()
}

/// Embeds the seed corpus into an in-memory store and returns its top-k retriever.
pub async fn build_retriever(embedder: Arc<dyn Embedder>) -> Result<Arc<dyn Retriever>, Error> {
    let store = InMemoryVectorStore::from_documents(seed_documents(), embedder).await?;
    tracing::debug!(documents = store.len(), "rag corpus indexed");
    Ok(Arc::new(Arc::new(store).as_retriever(TOP_K)))
}

/// Runs the RAG workflow for `input`; returns the generation.
pub async fn run_rag(
    components: RagComponents,
    config: RagConfig,
    input: &str,
) -> Result<String, Error> {
    let workflow = RagWorkflow::new(components, config)?;
    let state = workflow.invoke(input).await?;
    tracing::debug!(
        documents = state.documents.len(),
        generations = state.generations,
        web_search = state.web_search,
        "rag finished"
    );
    Ok(state.generation)
}
