//! Configuration for the CLI workflows.
//!
//! Re-exports [`RunConfig`], [`RunOptions`] and config [`Error`].

mod run_config;
mod run_options;

pub use run_config::{embedding_dimension_for, Error, RunConfig};
pub use run_options::RunOptions;
