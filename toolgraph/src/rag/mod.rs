//! Agentic RAG: retrieve, grade, fall back to web search, generate, self-check.
//!
//! ```text
//! START → retrieve → grade_documents ─(decide_to_generate)→ websearch | generate
//! websearch → generate
//! generate ─(grade_generation)→ "not supported": generate
//!                              "not useful":    websearch
//!                              "useful":        END
//!                              "exhausted":     END
//! ```
//!
//! Every relevance and grounding decision comes from a [`BinaryGrader`]; an answer that
//! is not a recognizable yes/no fails the run with `AgentError::InvalidGrade`.
//! [`RetrievalChain`] is the one-shot variant without grading.

mod chain;
mod graders;
mod graph;
mod nodes;
mod state;

pub use chain::{RetrievalChain, RetrievalOutput, RETRIEVAL_QA_SYSTEM_TEMPLATE};
pub use graders::{
    BinaryGrader, BinaryScore, ANSWER_GRADER_TOOL, HALLUCINATION_GRADER_TOOL,
    RETRIEVAL_GRADER_TOOL,
};
pub use graph::{
    build_rag_graph, decide_to_generate, grade_generation, RagComponents, RagConfig, RagWorkflow,
    GENERATE, GRADE_DOCUMENTS, RETRIEVE, WEBSEARCH,
};
pub use nodes::{GenerateNode, GradeDocumentsNode, RetrieveNode, WebSearchNode, RAG_PROMPT};
pub use state::{GenerationGrade, GraphState};
