//! State of the agentic RAG graph.

use serde::{Deserialize, Serialize};

use crate::retriever::Document;

/// Verdict on the latest generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationGrade {
    /// Not grounded in the documents.
    NotSupported,
    /// Grounded, but does not answer the question.
    NotUseful,
    /// Grounded and answers the question.
    Useful,
}

/// RAG graph state.
///
/// **Interaction**: Produced and consumed by the RAG nodes; `decide_to_generate` reads
/// `web_search`, `grade_generation` reads `generation_grade` and `generations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphState {
    pub question: String,
    /// Latest generated answer.
    pub generation: String,
    /// Set when retrieved documents were missing or irrelevant, or an answer was not useful.
    pub web_search: bool,
    pub documents: Vec<Document>,
    pub generation_grade: Option<GenerationGrade>,
    /// Generations produced so far.
    pub generations: usize,
}

impl GraphState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    /// Documents joined for a prompt, one blank line apart.
    pub fn context(&self) -> String {
        crate::retriever::format_docs(&self.documents)
    }

    pub fn push_document(&mut self, document: Document) {
        self.documents.push(document);
    }
}
