//! Documents, embedders and retrievers.
//!
//! [`Retriever`] is what the RAG workflow and [`RetrievalChain`](crate::rag::RetrievalChain)
//! depend on. [`InMemoryVectorStore`] (feature `in-memory-vector`) embeds documents with an
//! [`Embedder`] and serves cosine-similarity search; it can be saved to and loaded from a
//! directory as one JSON file.

mod embedder;
#[cfg(feature = "in-memory-vector")]
mod in_memory_vector_store;

pub use embedder::{Embedder, MockEmbedder};
#[cfg(feature = "openai")]
pub use embedder::OpenAIEmbedder;
#[cfg(feature = "in-memory-vector")]
pub use in_memory_vector_store::{InMemoryVectorStore, VectorStoreRetriever, INDEX_FILE_NAME};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from embedding, searching or persisting documents.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("embedding error: {0}")]
    EmbeddingError(String),

    #[error("vector dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A piece of text plus free-form metadata (source, url, page, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Joins page contents with a blank line between documents ("stuffing").
pub fn format_docs(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Returns the documents relevant to a query, most relevant first.
///
/// **Interaction**: Used by the RAG `retrieve` node and `RetrievalChain`.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, StoreError>;
}

/// Retriever over a fixed document list; returns all of them for any query.
pub struct StaticRetriever {
    documents: Vec<Document>,
}

impl StaticRetriever {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve(&self, _query: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents.clone())
    }
}
