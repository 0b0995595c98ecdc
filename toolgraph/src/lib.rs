//! # toolgraph
//!
//! Tool-calling agents over hosted LLM APIs, built two ways:
//!
//! - **Dispatch loops**: the model names a tool, the loop looks it up by exact name, runs it
//!   and feeds the observation back, until the model answers. [`dispatch`] does this with
//!   native function calling, [`agent`] with the text ReAct format.
//! - **Step graphs**: nodes transform one shared state type; conditional edges pick the next
//!   node from a router's label. The ReAct agent ([`react`]), the reflection loops
//!   ([`reflection`]) and agentic RAG ([`rag`]) are graphs.
//!
//! ## Main Modules
//!
//! - [`graph`]: `StateGraph`, `CompiledStateGraph`, `Node`, `Next`, routers, middleware.
//! - [`llm`]: `LlmClient` trait, `MockLlm`, callbacks, `ChatOpenAI` (feature `openai`).
//! - [`tools`]: `Tool`, `ToolRegistry`, built-in tools, web search.
//! - [`tool_source`]: the `ToolSource` seam nodes dispatch through.
//! - [`retriever`]: documents, embedders, `InMemoryVectorStore` (feature `in-memory-vector`).
//! - [`prompt`]: `{variable}` prompt templates.
//!
//! ## Features
//!
//! - `openai` (default): `ChatOpenAI` and `OpenAIEmbedder` via `async-openai`.
//! - `in-memory-vector` (default): `InMemoryVectorStore` with JSON save/load.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use toolgraph::{LlmResponse, Message, MockLlm, StringLengthTool, ToolCallingLoop, ToolRegistry};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tools = Arc::new(ToolRegistry::new().with(StringLengthTool)?);
//! let llm = Arc::new(MockLlm::scripted(vec![
//!     LlmResponse::tool_call("get_string_length", json!({"text": "dog"})),
//!     LlmResponse::text("It has 3 characters."),
//! ]));
//! let out = ToolCallingLoop::new(llm, tools)
//!     .run(vec![Message::user("How long is 'dog'?")])
//!     .await?;
//! assert!(out.answer.contains('3'));
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod prompt;
pub mod rag;
pub mod react;
pub mod reflection;
pub mod retriever;
pub mod state;
pub mod stream;
pub mod tool_source;
pub mod tools;

pub use agent::{AgentAction, AgentExecutor, AgentFinish, AgentStep, ParseError, ReActOutputParser};
pub use dispatch::{LoopOutput, StepOutcome, ToolCallingLoop};
pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, LoggingNodeMiddleware, Next, Node, NodeMiddleware,
    StateGraph, END, START,
};
pub use llm::{CallbackLlm, LlmCallback, LlmClient, LlmResponse, MockLlm, ToolChoiceMode, TracingCallback};
#[cfg(feature = "openai")]
pub use llm::ChatOpenAI;
pub use message::Message;
pub use prompt::PromptTemplate;
pub use rag::{BinaryGrader, BinaryScore, GraphState, RagComponents, RagConfig, RagWorkflow, RetrievalChain};
pub use react::{ActNode, ObserveNode, ReactRunner, ReactRunnerConfig, RunError, ThinkNode, REACT_SYSTEM_PROMPT};
pub use reflection::{
    AnswerQuestion, MessagesState, ReflectionAgent, ReflectionConfig, ReflexionAgent,
    ReflexionConfig, ReviseAnswer,
};
pub use retriever::{Document, Embedder, MockEmbedder, Retriever, StoreError};
#[cfg(feature = "openai")]
pub use retriever::OpenAIEmbedder;
#[cfg(feature = "in-memory-vector")]
pub use retriever::InMemoryVectorStore;
pub use state::{ReActState, ToolCall, ToolResult};
pub use stream::{StreamEvent, StreamMode};
pub use tool_source::{MockToolSource, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
pub use tools::{
    SearchResults, StringLengthTool, TavilyConfig, TavilySearchTool, Tool, ToolRegistry,
    TripleTool, WebSearch,
};
