//! `retrieval`: embed, save the index, reload it, answer with a retrieval chain.

use std::path::Path;
use std::sync::Arc;

use toolgraph::rag::RetrievalChain;
use toolgraph::{Document, Embedder, InMemoryVectorStore, LlmClient};

use super::Error;

pub const DEFAULT_INPUT: &str = "Give me the gist of ReAct in 3 sentences";

const TOP_K: usize = 4;

/// Passages summarizing the ReAct paper.
pub fn seed_documents() -> Vec<Document> {
    [
        "ReAct: Synergizing Reasoning and Acting in Language Models explores the use of LLMs to \
         generate both reasoning traces and task-specific actions in an interleaved manner.",
        "Reasoning traces help the model induce, track and update action plans as well as \
         handle exceptions, while actions let it interface with external sources such as \
         knowledge bases or environments to gather additional information.",
        "On question answering and fact verification, ReAct overcomes hallucination and error \
         propagation in chain-of-thought reasoning by interacting with a simple Wikipedia API.",
        "On interactive decision making benchmarks, ReAct outperforms imitation and \
         reinforcement learning methods with only one or two in-context examples.",
    ]
    .into_iter()
    .enumerate()
    .map(|(i, text)| {
        Document::new(text)
            .with_metadata("source", "react.pdf")
            .with_metadata("page", i)
    })
    .collect()
}

/// Builds the index, saves it to `index_dir`, reloads it and answers `input` from it.
pub async fn run_retrieval(
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LlmClient>,
    index_dir: &Path,
    input: &str,
) -> Result<String, Error> {
    let store = InMemoryVectorStore::from_documents(seed_documents(), embedder.clone()).await?;
    store.save_local(index_dir)?;
    tracing::info!(dir = %index_dir.display(), documents = store.len(), "vector index saved");

    let store = Arc::new(InMemoryVectorStore::load_local(index_dir, embedder)?);
    let chain = RetrievalChain::new(Arc::new(store.as_retriever(TOP_K)), llm)?;
    let output = chain.invoke(input).await?;
    tracing::debug!(context = output.context.len(), "retrieval answered");
    Ok(output.answer)
}
