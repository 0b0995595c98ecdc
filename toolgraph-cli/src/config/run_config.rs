//! Run configuration: OpenAI, embeddings, web search and loop settings read from env.
//!
//! Interacts with [`RunOptions`](super::RunOptions) for overrides, and builds the
//! [`ChatOpenAI`], [`OpenAIEmbedder`] and [`TavilyConfig`] the workflows run on.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use toolgraph::{
    CallbackLlm, ChatOpenAI, LlmClient, OpenAIEmbedder, TavilyConfig, ToolChoiceMode, ToolSpec,
    TracingCallback,
};

use super::RunOptions;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_MAX_STEPS: usize = 10;
pub const DEFAULT_INDEX_DIR: &str = "vector_index";

/// Vector size of the hosted embedding models; unknown models fall back to 1536.
pub fn embedding_dimension_for(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => 1536,
    }
}

/// Reads an optional numeric env var; a value that does not parse is an error naming it.
fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, Error> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::from(format!("{} has an invalid value: {:?}", name, raw))),
        _ => Ok(None),
    }
}

/// Configuration for one workflow run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub embedding_model: String,
    /// Must match what `embedding_model` returns, or the vector store rejects the vectors.
    pub embedding_dimension: usize,
    /// Web search is unavailable without a key.
    pub tavily_api_key: Option<String>,
    pub tavily_max_results: Option<usize>,
    /// Step budget for the dispatch loops.
    pub max_steps: usize,
    pub index_dir: PathBuf,
    pub verbose: bool,
}

impl RunConfig {
    /// Fill config from env vars (and .env, when loaded by the caller).
    ///
    /// `OPENAI_API_KEY` required; `OPENAI_API_BASE`, `OPENAI_MODEL`, `EMBEDDING_MODEL`,
    /// `EMBEDDING_DIMENSION` and `MAX_STEPS` have defaults. `OPENAI_TEMPERATURE`,
    /// `TAVILY_API_KEY` and `TAVILY_MAX_RESULTS` are optional. Numeric values that do not
    /// parse are errors.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "OPENAI_API_KEY is not set; please configure it in .env",
            )
        })?;
        let api_base =
            std::env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let temperature = parse_var("OPENAI_TEMPERATURE")?;
        let embedding_model = std::env::var("EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());
        let embedding_dimension = parse_var("EMBEDDING_DIMENSION")?
            .unwrap_or_else(|| embedding_dimension_for(&embedding_model));
        let tavily_api_key = std::env::var("TAVILY_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let tavily_max_results = parse_var("TAVILY_MAX_RESULTS")?;
        let max_steps = parse_var("MAX_STEPS")?.unwrap_or(DEFAULT_MAX_STEPS);
        Ok(Self {
            api_base,
            api_key,
            model,
            temperature,
            embedding_model,
            embedding_dimension,
            tavily_api_key,
            tavily_max_results,
            max_steps,
            index_dir: PathBuf::from(DEFAULT_INDEX_DIR),
            verbose: false,
        })
    }

    /// Applies optional overrides; only fields set in `options` change.
    pub fn apply_options(&mut self, options: &RunOptions) {
        if let Some(ref model) = options.model {
            self.model = model.clone();
        }
        if let Some(t) = options.temperature {
            self.temperature = Some(t);
        }
        if let Some(n) = options.max_steps {
            self.max_steps = n;
        }
        if let Some(ref dir) = options.index_dir {
            self.index_dir = dir.clone();
        }
        if options.verbose {
            self.verbose = true;
        }
    }

    fn openai_config(&self) -> OpenAIConfig {
        OpenAIConfig::new()
            .with_api_key(&self.api_key)
            .with_api_base(&self.api_base)
    }

    /// Chat client with the configured model and temperature, no tools bound.
    pub fn chat_model(&self) -> ChatOpenAI {
        let client = ChatOpenAI::with_config(self.openai_config(), &self.model);
        match self.temperature {
            Some(t) => client.with_temperature(t),
            None => client,
        }
    }

    /// Chat client with `tools` bound; the model chooses whether to call them.
    pub fn chat_model_with_tools(&self, tools: Vec<ToolSpec>) -> ChatOpenAI {
        self.chat_model().with_tools(tools)
    }

    /// Chat client forced to call `tool` (structured output).
    pub fn structured_model(&self, tool: ToolSpec) -> ChatOpenAI {
        let name = tool.name.clone();
        self.chat_model()
            .with_tools(vec![tool])
            .with_tool_choice(ToolChoiceMode::Function(name))
    }

    /// Wraps a client so LLM start/end are logged when verbose.
    pub fn instrument(&self, llm: ChatOpenAI) -> Arc<dyn LlmClient> {
        if self.verbose {
            Arc::new(CallbackLlm::new(Arc::new(llm)).with_callback(Arc::new(TracingCallback)))
        } else {
            Arc::new(llm)
        }
    }

    /// Create an OpenAIEmbedder from this configuration.
    pub fn create_embedder(&self) -> OpenAIEmbedder {
        OpenAIEmbedder::with_config(self.openai_config(), &self.embedding_model)
            .with_dimension(self.embedding_dimension)
    }

    /// Web search settings, or `None` when `TAVILY_API_KEY` is unset.
    pub fn tavily_config(&self) -> Option<TavilyConfig> {
        let key = self.tavily_api_key.as_ref()?;
        let config = TavilyConfig::new(key.clone());
        Some(match self.tavily_max_results {
            Some(n) => config.with_max_results(n),
            None => config,
        })
    }

    /// Like [`tavily_config`](Self::tavily_config) but fails for workflows that need search.
    pub fn require_tavily(&self, workflow: &str) -> Result<TavilyConfig, Error> {
        self.tavily_config().ok_or_else(|| {
            format!("TAVILY_API_KEY is not set; the {} workflow needs web search", workflow).into()
        })
    }
}
