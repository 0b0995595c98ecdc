//! Text embedders: [`OpenAIEmbedder`] (feature `openai`) and the offline [`MockEmbedder`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use super::StoreError;

/// Turns texts into fixed-size vectors.
///
/// **Interaction**: Used by `InMemoryVectorStore` for documents on insert and for queries on
/// search. Implementations must return one vector per input text, in order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StoreError>;

    /// Length of every returned vector.
    fn dimension(&self) -> usize;
}

/// Deterministic bag-of-words embedder: each lowercase word is hashed into one of
/// `dimension` buckets. Texts sharing words get similar vectors.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            v[bucket] += 1.0;
        }
        v
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StoreError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(feature = "openai")]
pub use openai_embedder::OpenAIEmbedder;

#[cfg(feature = "openai")]
mod openai_embedder {
    use async_openai::{
        config::OpenAIConfig, types::embeddings::CreateEmbeddingRequestArgs, Client,
    };
    use async_trait::async_trait;

    use super::{Embedder, StoreError};

    /// Dimension of `text-embedding-3-small` and `text-embedding-ada-002`.
    const DEFAULT_DIMENSION: usize = 1536;

    /// OpenAI embeddings endpoint client.
    pub struct OpenAIEmbedder {
        client: Client<OpenAIConfig>,
        model: String,
        dimension: usize,
    }

    impl OpenAIEmbedder {
        /// Client with `OPENAI_API_KEY` from the environment.
        pub fn new(model: impl Into<String>) -> Self {
            Self::with_config(OpenAIConfig::default(), model)
        }

        pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
            Self {
                client: Client::with_config(config),
                model: model.into(),
                dimension: DEFAULT_DIMENSION,
            }
        }

        /// Override the reported dimension (e.g. `text-embedding-3-large` is 3072).
        pub fn with_dimension(mut self, dimension: usize) -> Self {
            self.dimension = dimension;
            self
        }

        pub fn model(&self) -> &str {
            &self.model
        }
    }

    #[async_trait]
    impl Embedder for OpenAIEmbedder {
        async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StoreError> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let input: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
            let request = CreateEmbeddingRequestArgs::default()
                .model(self.model.clone())
                .input(input)
                .build()
                .map_err(|e| StoreError::EmbeddingError(e.to_string()))?;
            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| StoreError::EmbeddingError(e.to_string()))?;

            let mut data = response.data;
            data.sort_by_key(|e| e.index);
            if data.len() != texts.len() {
                return Err(StoreError::EmbeddingError(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    data.len()
                )));
            }
            Ok(data.into_iter().map(|e| e.embedding).collect())
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }
}
