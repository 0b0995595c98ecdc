//! toolgraph-cli library: reusable workflow runs for other crates.
//!
//! Reads OpenAI and Tavily config from env (and .env), builds the hosted clients and runs one
//! of the toolgraph workflows, returning its answer text.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), toolgraph_cli::Error> {
//! use toolgraph_cli::{run, Workflow};
//!
//! let answer = run(Workflow::FunctionCalling, Some("How long is 'dog'?")).await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

mod config;
mod run;

pub use config::{embedding_dimension_for, Error, RunConfig, RunOptions};
pub use run::{
    build_retriever, function_calling_tools, rag_seed_documents, react_recursion_limit, react_tools,
    retrieval_seed_documents, run, run_function_calling, run_rag, run_react, run_reflection,
    run_reflexion, run_retrieval, run_tool_calling, run_with_config, run_with_options, Workflow,
};

#[cfg(test)]
mod tests;
