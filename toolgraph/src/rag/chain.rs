//! One-shot retrieval chain: retrieve, stuff the documents into the prompt, answer.

use std::sync::Arc;

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::prompt::PromptTemplate;
use crate::retriever::{format_docs, Document, Retriever};

/// System prompt of the chain. Variable: `context`.
pub const RETRIEVAL_QA_SYSTEM_TEMPLATE: &str =
    "Answer any use questions based solely on the context below:\n\n<context>\n{context}\n</context>";

/// Answer plus the documents it was generated from.
#[derive(Debug, Clone)]
pub struct RetrievalOutput {
    pub answer: String,
    pub context: Vec<Document>,
}

/// Retriever + model, no grading.
///
/// **Interaction**: Uses any [`Retriever`] (usually `InMemoryVectorStore::as_retriever`).
pub struct RetrievalChain {
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LlmClient>,
    system: PromptTemplate,
}

impl RetrievalChain {
    pub fn new(retriever: Arc<dyn Retriever>, llm: Arc<dyn LlmClient>) -> Result<Self, AgentError> {
        Ok(Self {
            retriever,
            llm,
            system: PromptTemplate::from_template(RETRIEVAL_QA_SYSTEM_TEMPLATE)?,
        })
    }

    /// Replaces the system template; it must use `{context}`.
    pub fn with_system_template(mut self, template: &str) -> Result<Self, AgentError> {
        self.system = PromptTemplate::from_template(template)?;
        Ok(self)
    }

    pub async fn invoke(&self, input: &str) -> Result<RetrievalOutput, AgentError> {
        let context = self
            .retriever
            .retrieve(input)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("retrieval failed: {}", e)))?;
        let system = self
            .system
            .format(&[("context", format_docs(&context).as_str())])?;
        let response = self
            .llm
            .invoke(&[Message::system(system), Message::user(input)])
            .await?;
        Ok(RetrievalOutput {
            answer: response.content,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::retriever::StaticRetriever;

    #[tokio::test]
    async fn stuffs_documents_into_system_prompt() {
        let retriever = Arc::new(StaticRetriever::new(vec![
            Document::new("ReAct interleaves reasoning and acting."),
            Document::new("It uses tools."),
        ]));
        let llm = Arc::new(MockLlm::with_no_tool_calls("ReAct mixes thought and action."));
        let chain = RetrievalChain::new(retriever, llm.clone()).unwrap();
        let out = chain.invoke("Give me the gist of ReAct").await.unwrap();

        assert_eq!(out.answer, "ReAct mixes thought and action.");
        assert_eq!(out.context.len(), 2);
        let prompt = &llm.prompts()[0];
        assert!(prompt[0]
            .content()
            .contains("<context>\nReAct interleaves reasoning and acting.\n\nIt uses tools.\n</context>"));
        assert_eq!(prompt[1], Message::user("Give me the gist of ReAct"));
    }

    #[tokio::test]
    async fn custom_system_template_is_used() {
        let chain = RetrievalChain::new(
            Arc::new(StaticRetriever::new(vec![])),
            Arc::new(MockLlm::with_no_tool_calls("ok")),
        )
        .unwrap()
        .with_system_template("Context: {context}. Always say 'thanks for asking!'")
        .unwrap();
        assert_eq!(chain.invoke("q").await.unwrap().answer, "ok");
    }
}
