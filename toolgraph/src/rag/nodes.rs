//! RAG graph nodes. Each reads the fields it needs from [`GraphState`] and returns the
//! whole updated state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::prompt::PromptTemplate;
use crate::retriever::{Document, Retriever};
use crate::tools::WebSearch;

use super::graders::BinaryGrader;
use super::graph::{GENERATE, GRADE_DOCUMENTS, RETRIEVE, WEBSEARCH};
use super::state::{GenerationGrade, GraphState};

/// Answer prompt. Variables: `question`, `context`.
pub const RAG_PROMPT: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.
Question: {question}
Context: {context}
Answer:";

/// Loads documents for the question from a [`Retriever`].
pub struct RetrieveNode {
    retriever: Arc<dyn Retriever>,
}

impl RetrieveNode {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Node<GraphState> for RetrieveNode {
    fn id(&self) -> &str {
        RETRIEVE
    }

    async fn run(&self, state: GraphState) -> Result<(GraphState, Next), AgentError> {
        let documents = self
            .retriever
            .retrieve(&state.question)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("retrieval failed: {}", e)))?;
        tracing::debug!(documents = documents.len(), "retrieved");
        Ok((GraphState { documents, ..state }, Next::Continue))
    }
}

/// Keeps relevant documents; any irrelevant one (or none retrieved) sets `web_search`.
pub struct GradeDocumentsNode {
    grader: Arc<BinaryGrader>,
}

impl GradeDocumentsNode {
    pub fn new(grader: Arc<BinaryGrader>) -> Self {
        Self { grader }
    }
}

#[async_trait]
impl Node<GraphState> for GradeDocumentsNode {
    fn id(&self) -> &str {
        GRADE_DOCUMENTS
    }

    async fn run(&self, state: GraphState) -> Result<(GraphState, Next), AgentError> {
        let mut web_search = state.documents.is_empty();
        let mut relevant = Vec::with_capacity(state.documents.len());
        for doc in state.documents {
            let score = self
                .grader
                .grade(&[
                    ("documents", doc.page_content.as_str()),
                    ("question", state.question.as_str()),
                ])
                .await?;
            if score.is_yes() {
                relevant.push(doc);
            } else {
                web_search = true;
            }
        }
        tracing::debug!(relevant = relevant.len(), web_search, "documents graded");
        Ok((
            GraphState {
                documents: relevant,
                web_search,
                ..state
            },
            Next::Continue,
        ))
    }
}

/// When `web_search` is set, searches the question and appends the results as one document.
pub struct WebSearchNode {
    search: Arc<dyn WebSearch>,
}

impl WebSearchNode {
    pub fn new(search: Arc<dyn WebSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Node<GraphState> for WebSearchNode {
    fn id(&self) -> &str {
        WEBSEARCH
    }

    async fn run(&self, mut state: GraphState) -> Result<(GraphState, Next), AgentError> {
        if state.web_search {
            let results = self
                .search
                .search(&state.question)
                .await
                .map_err(|e| AgentError::from_tool_error(WEBSEARCH, e))?;
            let content = results.joined_content();
            tracing::debug!(content_len = content.len(), "web search results");
            state.push_document(Document::new(content).with_metadata("source", "web_search"));
        }
        Ok((state, Next::Continue))
    }
}

/// Answers from the documents, then grades the answer: grounding first, usefulness second.
pub struct GenerateNode {
    llm: Arc<dyn LlmClient>,
    prompt: PromptTemplate,
    hallucination_grader: Arc<BinaryGrader>,
    answer_grader: Arc<BinaryGrader>,
}

impl GenerateNode {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        hallucination_grader: Arc<BinaryGrader>,
        answer_grader: Arc<BinaryGrader>,
    ) -> Result<Self, AgentError> {
        Ok(Self {
            llm,
            prompt: PromptTemplate::from_template(RAG_PROMPT)?,
            hallucination_grader,
            answer_grader,
        })
    }

    async fn grade(&self, state: &GraphState, context: &str) -> Result<GenerationGrade, AgentError> {
        let grounded = self
            .hallucination_grader
            .grade(&[("documents", context), ("generation", state.generation.as_str())])
            .await?;
        if !grounded.is_yes() {
            return Ok(GenerationGrade::NotSupported);
        }
        let useful = self
            .answer_grader
            .grade(&[
                ("question", state.question.as_str()),
                ("generation", state.generation.as_str()),
            ])
            .await?;
        Ok(if useful.is_yes() {
            GenerationGrade::Useful
        } else {
            GenerationGrade::NotUseful
        })
    }
}

#[async_trait]
impl Node<GraphState> for GenerateNode {
    fn id(&self) -> &str {
        GENERATE
    }

    async fn run(&self, mut state: GraphState) -> Result<(GraphState, Next), AgentError> {
        let context = state.context();
        let prompt = self.prompt.format(&[
            ("question", state.question.as_str()),
            ("context", context.as_str()),
        ])?;
        let response = self.llm.invoke(&[Message::user(prompt)]).await?;
        state.generation = response.content;
        state.generations += 1;

        let grade = self.grade(&state, &context).await?;
        tracing::debug!(?grade, generations = state.generations, "generation graded");
        if grade == GenerationGrade::NotUseful {
            state.web_search = true;
        }
        state.generation_grade = Some(grade);
        Ok((state, Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, MockLlm};
    use crate::retriever::StaticRetriever;
    use crate::tool_source::ToolSourceError;
    use crate::tools::SearchResults;

    struct FixedSearch(&'static str);

    #[async_trait]
    impl WebSearch for FixedSearch {
        async fn search(&self, _query: &str) -> Result<SearchResults, ToolSourceError> {
            Ok(SearchResults::Text(self.0.to_string()))
        }
    }

    fn grader(answers: Vec<&str>) -> Arc<BinaryGrader> {
        let llm = MockLlm::scripted(answers.into_iter().map(LlmResponse::text).collect());
        Arc::new(BinaryGrader::retrieval(Arc::new(llm)).unwrap())
    }

    fn hallucination_grader(answers: Vec<&str>) -> Arc<BinaryGrader> {
        let llm = MockLlm::scripted(answers.into_iter().map(LlmResponse::text).collect());
        Arc::new(BinaryGrader::hallucination(Arc::new(llm)).unwrap())
    }

    fn answer_grader(answers: Vec<&str>) -> Arc<BinaryGrader> {
        let llm = MockLlm::scripted(answers.into_iter().map(LlmResponse::text).collect());
        Arc::new(BinaryGrader::answer(Arc::new(llm)).unwrap())
    }

    #[tokio::test]
    async fn retrieve_fills_documents() {
        let node = RetrieveNode::new(Arc::new(StaticRetriever::new(vec![Document::new("d")])));
        let (s, _) = node.run(GraphState::new("q")).await.unwrap();
        assert_eq!(s.documents.len(), 1);
        assert_eq!(s.question, "q");
    }

    #[tokio::test]
    async fn grading_drops_irrelevant_and_flags_search() {
        let node = GradeDocumentsNode::new(grader(vec!["yes", "no"]));
        let state = GraphState {
            documents: vec![Document::new("keep"), Document::new("drop")],
            ..GraphState::new("q")
        };
        let (s, _) = node.run(state).await.unwrap();
        assert_eq!(s.documents, vec![Document::new("keep")]);
        assert!(s.web_search);
    }

    #[tokio::test]
    async fn no_documents_flags_search_without_grading() {
        let node = GradeDocumentsNode::new(grader(vec![]));
        let (s, _) = node.run(GraphState::new("q")).await.unwrap();
        assert!(s.web_search);
    }

    #[tokio::test]
    async fn invalid_grade_fails_the_node() {
        let node = GradeDocumentsNode::new(grader(vec!["perhaps"]));
        let state = GraphState {
            documents: vec![Document::new("d")],
            ..GraphState::new("q")
        };
        let err = node.run(state).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidGrade(_)));
    }

    #[tokio::test]
    async fn websearch_only_runs_when_flagged() {
        let node = WebSearchNode::new(Arc::new(FixedSearch("from the web")));
        let (s, _) = node.run(GraphState::new("q")).await.unwrap();
        assert!(s.documents.is_empty());

        let state = GraphState {
            web_search: true,
            documents: vec![Document::new("kept")],
            ..GraphState::new("q")
        };
        let (s, _) = node.run(state).await.unwrap();
        assert_eq!(s.documents.len(), 2);
        assert_eq!(s.documents[1].page_content, "from the web");
        assert_eq!(s.documents[1].metadata["source"], "web_search");
    }

    /// **Scenario**: grounded but not useful sets the grade and requests a web search.
    #[tokio::test]
    async fn generate_records_grade() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("answer"));
        let node = GenerateNode::new(llm.clone(), hallucination_grader(vec!["yes"]), answer_grader(vec!["no"])).unwrap();
        let state = GraphState {
            documents: vec![Document::new("ctx")],
            ..GraphState::new("q")
        };
        let (s, _) = node.run(state).await.unwrap();
        assert_eq!(s.generation, "answer");
        assert_eq!(s.generations, 1);
        assert_eq!(s.generation_grade, Some(GenerationGrade::NotUseful));
        assert!(s.web_search);
        assert!(llm.prompts()[0][0].content().contains("Context: ctx"));
    }

    #[tokio::test]
    async fn ungrounded_generation_skips_answer_grader() {
        let answer_grader = answer_grader(vec![]);
        let node = GenerateNode::new(
            Arc::new(MockLlm::with_no_tool_calls("made up")),
            hallucination_grader(vec!["no"]),
            answer_grader,
        )
        .unwrap();
        let (s, _) = node.run(GraphState::new("q")).await.unwrap();
        assert_eq!(s.generation_grade, Some(GenerationGrade::NotSupported));
        assert!(!s.web_search);
    }
}
