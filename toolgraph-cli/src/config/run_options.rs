//! Optional overrides for a workflow run (CLI flags or programmatic).
//!
//! Used by [`RunConfig::apply_options`](super::RunConfig::apply_options) and
//! [`run_with_options`](crate::run_with_options).

use std::path::PathBuf;

/// Optional overrides for a run: model, temperature, step budget, index directory, verbosity.
///
/// All fields are optional; only set fields override the base config (from env).
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Override chat model name.
    pub model: Option<String>,
    /// Override sampling temperature (0–2).
    pub temperature: Option<f32>,
    /// Override the dispatch loops' step budget.
    pub max_steps: Option<usize>,
    /// Directory the `retrieval` workflow saves its vector index to.
    pub index_dir: Option<PathBuf>,
    /// Log LLM calls and graph node enter/exit.
    pub verbose: bool,
}
