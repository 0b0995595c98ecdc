//! In-memory vector store with cosine search and JSON save/load.
//!
//! Entries live in a [`DashMap`] keyed by id (`doc{n}`); each holds the document and its
//! embedding. Search embeds the query and ranks every entry by cosine similarity, ties
//! broken by insertion order. `save_local` writes one JSON file into a directory and
//! `load_local` reads it back without re-embedding.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::{Document, Embedder, Retriever, StoreError};

/// File written by [`InMemoryVectorStore::save_local`] inside the index directory.
pub const INDEX_FILE_NAME: &str = "index.json";

#[derive(Clone, Serialize, Deserialize)]
struct VectorEntry {
    seq: usize,
    document: Document,
    vector: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct SavedIndex {
    dimension: usize,
    entries: Vec<(String, VectorEntry)>,
}

/// Vector store kept in memory; cosine similarity over embedder vectors.
///
/// **Interaction**: Uses an [`Embedder`]; exposed to workflows through
/// [`as_retriever`](Self::as_retriever).
pub struct InMemoryVectorStore {
    embedder: Arc<dyn Embedder>,
    data: DashMap<String, VectorEntry>,
    next_seq: AtomicUsize,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            data: DashMap::new(),
            next_seq: AtomicUsize::new(0),
        }
    }

    /// Builds a store and embeds `documents` into it.
    pub async fn from_documents(
        documents: Vec<Document>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, StoreError> {
        let store = Self::new(embedder);
        store.add_documents(documents).await?;
        Ok(store)
    }

    pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), StoreError> {
        let expected = self.embedder.dimension();
        if vector.len() != expected {
            return Err(StoreError::DimensionMismatch {
                expected,
                got: vector.len(),
            });
        }
        Ok(())
    }

    /// Embeds and stores `documents` in one embedder call; returns their ids.
    ///
    /// Nothing is stored unless every vector was embedded with the expected dimension.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>, StoreError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let texts: Vec<&str> = documents.iter().map(|d| d.page_content.as_str()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(StoreError::EmbeddingError(format!(
                "expected {} vectors, got {}",
                documents.len(),
                vectors.len()
            )));
        }

        for vector in &vectors {
            self.check_dimension(vector)?;
        }

        let mut ids = Vec::with_capacity(documents.len());
        for (document, vector) in documents.into_iter().zip(vectors) {
            let seq = self.next_seq.fetch_add(1, AtomicOrdering::SeqCst);
            let id = format!("doc{}", seq);
            self.data.insert(
                id.clone(),
                VectorEntry {
                    seq,
                    document,
                    vector,
                },
            );
            ids.push(id);
        }
        tracing::debug!(added = ids.len(), total = self.data.len(), "Documents indexed");
        Ok(ids)
    }

    /// Top `k` documents with their cosine score, best first.
    pub async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>, StoreError> {
        if k == 0 || self.data.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self
            .embedder
            .embed(&[query])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::EmbeddingError("No vector returned".into()))?;

        let mut scored: Vec<(usize, f32, Document)> = self
            .data
            .iter()
            .map(|entry| {
                (
                    entry.seq,
                    Self::cosine_similarity(&query_vec, &entry.vector),
                    entry.document.clone(),
                )
            })
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, score, doc)| (doc, score))
            .collect())
    }

    /// Top `k` documents, best first.
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .similarity_search_with_score(query, k)
            .await?
            .into_iter()
            .map(|(doc, _)| doc)
            .collect())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes the index (documents and vectors) to `dir/index.json`, creating `dir`.
    pub fn save_local(&self, dir: impl AsRef<Path>) -> Result<(), StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let mut entries: Vec<(String, VectorEntry)> = self
            .data
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by_key(|(_, e)| e.seq);
        let saved = SavedIndex {
            dimension: self.embedder.dimension(),
            entries,
        };
        let path = dir.join(INDEX_FILE_NAME);
        std::fs::write(&path, serde_json::to_vec(&saved)?)?;
        tracing::debug!(path = %path.display(), entries = saved.entries.len(), "Vector index saved");
        Ok(())
    }

    /// Reads an index written by [`save_local`](Self::save_local). `embedder` embeds future
    /// queries and must produce vectors of the saved dimension.
    pub fn load_local(dir: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Result<Self, StoreError> {
        let path = dir.as_ref().join(INDEX_FILE_NAME);
        let saved: SavedIndex = serde_json::from_slice(&std::fs::read(&path)?)?;
        if saved.dimension != embedder.dimension() {
            return Err(StoreError::DimensionMismatch {
                expected: embedder.dimension(),
                got: saved.dimension,
            });
        }
        let store = Self::new(embedder);
        let mut next_seq = 0;
        for (id, entry) in saved.entries {
            store.check_dimension(&entry.vector)?;
            next_seq = next_seq.max(entry.seq + 1);
            store.data.insert(id, entry);
        }
        store.next_seq.store(next_seq, AtomicOrdering::SeqCst);
        tracing::debug!(path = %path.display(), entries = store.len(), "Vector index loaded");
        Ok(store)
    }

    /// Retriever returning the top `k` documents per query.
    pub fn as_retriever(self: Arc<Self>, k: usize) -> VectorStoreRetriever {
        VectorStoreRetriever { store: self, k }
    }
}

/// [`Retriever`] over an [`InMemoryVectorStore`].
pub struct VectorStoreRetriever {
    store: Arc<InMemoryVectorStore>,
    k: usize,
}

#[async_trait]
impl Retriever for VectorStoreRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, StoreError> {
        self.store.similarity_search(query, self.k).await
    }
}
