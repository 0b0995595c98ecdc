//! Text ReAct executor.
//!
//! The model sees a prompt describing the tools and the `Thought / Action / Action Input /
//! Observation` format, generates until an `Observation:` stop sequence, and its text is
//! parsed into either an action or a final answer. Actions are dispatched by exact tool name
//! and the observation is appended to the scratchpad for the next round.
//!
//! - [`prompt`]: the template and scratchpad formatting.
//! - [`ReActOutputParser`]: text → [`AgentStep`].
//! - [`AgentExecutor`]: plan / step / invoke with an explicit iteration budget.

mod executor;
mod output_parser;
pub mod prompt;

pub use executor::{AgentExecutor, StepOutcome, DEFAULT_MAX_ITERATIONS, STOP_SEQUENCES};
pub use output_parser::{
    AgentAction, AgentFinish, AgentStep, ParseError, ReActOutputParser, FINAL_ANSWER_ACTION,
};
pub use prompt::{format_log_to_str, render_text_description, REACT_TEXT_TEMPLATE};
