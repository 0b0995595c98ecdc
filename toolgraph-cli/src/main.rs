//! `toolgraph` binary: pick a workflow subcommand, run it, print the answer.
//!
//! Logs go to stderr (`RUST_LOG`, default `warn`; `--verbose` raises to `debug`) so stdout
//! carries only the answer.

use std::path::PathBuf;

use clap::Parser;
use toolgraph_cli::{run_with_options, RunOptions, Workflow};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "toolgraph")]
#[command(about = "Tool-calling agents, ReAct and reflection graphs, agentic RAG")]
struct Args {
    #[command(subcommand)]
    workflow: Workflow,

    /// Input for the workflow (each workflow has a default).
    #[arg(short, long, value_name = "TEXT", global = true)]
    input: Option<String>,

    /// Directory the retrieval workflow saves its vector index to.
    #[arg(long, value_name = "DIR", global = true)]
    index_dir: Option<PathBuf>,

    /// Chat model (overrides OPENAI_MODEL).
    #[arg(long, global = true)]
    model: Option<String>,

    /// Sampling temperature (overrides OPENAI_TEMPERATURE).
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Step budget for the dispatch loops (overrides MAX_STEPS).
    #[arg(long, global = true)]
    max_steps: Option<usize>,

    /// Log LLM calls and node enter/exit to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    let options = RunOptions {
        model: args.model,
        temperature: args.temperature,
        max_steps: args.max_steps,
        index_dir: args.index_dir,
        verbose: args.verbose,
    };

    match run_with_options(args.workflow, args.input.as_deref(), &options).await {
        Ok(answer) => println!("{}", answer),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
