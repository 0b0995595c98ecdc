//! Yes/no graders: document relevance, generation grounding, answer usefulness.
//!
//! Each grader renders its prompt, invokes the model and reads `binary_score`. Bind the
//! client to [`BinaryGrader::tool_spec`] with a forced tool choice for structured output;
//! a plain-text `yes` / `no` or a JSON object in the content is accepted too.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::prompt::PromptTemplate;
use crate::tool_source::ToolSpec;

pub const RETRIEVAL_GRADER_TOOL: &str = "GradeDocuments";
pub const HALLUCINATION_GRADER_TOOL: &str = "GradeHallucinations";
pub const ANSWER_GRADER_TOOL: &str = "GradeAnswer";

const RETRIEVAL_SYSTEM: &str = "You are a grader assessing relevance of a retrieved document to a user question. \n \
If the document contains keyword(s) or semantic meaning related to the question, grade it as relevant. \n \
The document must contain information about the question, but it's not necessary to be a direct quote. \n \
Give a binary score 'yes' or 'no' score to indicate whether the document is relevant to the question.";
const RETRIEVAL_HUMAN: &str = "Retrieved documents: {documents}\n\n User question: {question}";

const HALLUCINATION_SYSTEM: &str = "You are a grader assessing whether an LLM generation is grounded in / supported by a set of retrieved facts. \n \
Give a binary score 'yes' or 'no'. 'Yes' means that the answer is grounded in / supported by the set of facts.";
const HALLUCINATION_HUMAN: &str = "Set of facts: \n\n {documents} \n\n LLM generation: {generation}";

const ANSWER_SYSTEM: &str = "You are a grader assessing whether an answer addresses / resolves a question \n \
Give a binary score 'yes' or 'no'. 'Yes' means that the answer resolves the question.";
const ANSWER_HUMAN: &str = "User question: \n\n {question} \n\n LLM generation: {generation}";

/// A grader's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryScore {
    Yes,
    No,
}

impl BinaryScore {
    pub fn is_yes(self) -> bool {
        self == BinaryScore::Yes
    }

    /// Reads a score from a JSON string or boolean.
    pub fn from_value(value: &Value) -> Result<Self, AgentError> {
        match value {
            Value::String(s) => s.parse(),
            Value::Bool(true) => Ok(BinaryScore::Yes),
            Value::Bool(false) => Ok(BinaryScore::No),
            other => Err(AgentError::InvalidGrade(other.to_string())),
        }
    }
}

impl FromStr for BinaryScore {
    type Err = AgentError;

    /// Accepts `yes` / `no` in any case, ignoring surrounding whitespace and a trailing `.`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('.').to_lowercase().as_str() {
            "yes" => Ok(BinaryScore::Yes),
            "no" => Ok(BinaryScore::No),
            _ => Err(AgentError::InvalidGrade(s.to_string())),
        }
    }
}

/// A yes/no grader: system prompt plus a human template, answered via `binary_score`.
pub struct BinaryGrader {
    tool_name: &'static str,
    llm: Arc<dyn LlmClient>,
    system_prompt: &'static str,
    human: PromptTemplate,
}

impl BinaryGrader {
    fn build(
        tool_name: &'static str,
        llm: Arc<dyn LlmClient>,
        system_prompt: &'static str,
        human: &'static str,
    ) -> Result<Self, AgentError> {
        Ok(Self {
            tool_name,
            llm,
            system_prompt,
            human: PromptTemplate::from_template(human)?,
        })
    }

    /// Is a document relevant to the question? Variables: `documents`, `question`.
    pub fn retrieval(llm: Arc<dyn LlmClient>) -> Result<Self, AgentError> {
        Self::build(RETRIEVAL_GRADER_TOOL, llm, RETRIEVAL_SYSTEM, RETRIEVAL_HUMAN)
    }

    /// Is a generation supported by the documents? Variables: `documents`, `generation`.
    pub fn hallucination(llm: Arc<dyn LlmClient>) -> Result<Self, AgentError> {
        Self::build(
            HALLUCINATION_GRADER_TOOL,
            llm,
            HALLUCINATION_SYSTEM,
            HALLUCINATION_HUMAN,
        )
    }

    /// Does a generation answer the question? Variables: `question`, `generation`.
    pub fn answer(llm: Arc<dyn LlmClient>) -> Result<Self, AgentError> {
        Self::build(ANSWER_GRADER_TOOL, llm, ANSWER_SYSTEM, ANSWER_HUMAN)
    }

    /// Structured-output tool to bind the grader's client to.
    pub fn tool_spec_for(tool_name: &str) -> ToolSpec {
        ToolSpec {
            name: tool_name.to_string(),
            description: Some("Binary score for a grading check.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "binary_score": {
                        "type": "string",
                        "enum": ["yes", "no"],
                        "description": "Answer is 'yes' or 'no'"
                    }
                },
                "required": ["binary_score"]
            }),
        }
    }

    pub fn tool_spec(&self) -> ToolSpec {
        Self::tool_spec_for(self.tool_name)
    }

    pub fn tool_name(&self) -> &'static str {
        self.tool_name
    }

    fn score_from_response(response: &LlmResponse) -> Result<BinaryScore, AgentError> {
        if let Some(call) = response.tool_calls.first() {
            let args = call
                .parse_arguments()
                .map_err(|_| AgentError::InvalidGrade(call.arguments.clone()))?;
            return BinaryScore::from_value(&args["binary_score"]);
        }
        match serde_json::from_str::<Value>(response.content.trim()) {
            Ok(Value::Object(map)) => {
                BinaryScore::from_value(map.get("binary_score").unwrap_or(&Value::Null))
            }
            _ => response.content.parse(),
        }
    }

    pub async fn grade(&self, values: &[(&str, &str)]) -> Result<BinaryScore, AgentError> {
        let human = self.human.format(values)?;
        let response = self
            .llm
            .invoke(&[Message::system(self.system_prompt), Message::user(human)])
            .await?;
        let score = Self::score_from_response(&response)?;
        tracing::debug!(grader = self.tool_name, ?score, "graded");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;

    #[test]
    fn parses_yes_no_case_insensitively() {
        assert_eq!("Yes".parse::<BinaryScore>().unwrap(), BinaryScore::Yes);
        assert_eq!(" no.\n".parse::<BinaryScore>().unwrap(), BinaryScore::No);
    }

    /// **Scenario**: anything but yes/no is an explicit error, never a silent "no".
    #[test]
    fn unrecognized_grade_is_error() {
        assert!(matches!(
            "maybe".parse::<BinaryScore>(),
            Err(AgentError::InvalidGrade(ref s)) if s == "maybe"
        ));
        assert!(matches!(
            BinaryScore::from_value(&json!(1)),
            Err(AgentError::InvalidGrade(_))
        ));
        assert!(matches!(
            BinaryScore::from_value(&Value::Null),
            Err(AgentError::InvalidGrade(_))
        ));
        assert_eq!(BinaryScore::from_value(&json!(true)).unwrap(), BinaryScore::Yes);
    }

    #[tokio::test]
    async fn reads_forced_tool_call() {
        let llm = Arc::new(MockLlm::fixed(LlmResponse::tool_call(
            RETRIEVAL_GRADER_TOOL,
            json!({"binary_score": "yes"}),
        )));
        let grader = BinaryGrader::retrieval(llm.clone()).unwrap();
        let score = grader
            .grade(&[("documents", "doc"), ("question", "q")])
            .await
            .unwrap();
        assert!(score.is_yes());
        let prompt = &llm.prompts()[0];
        assert_eq!(prompt[1].content(), "Retrieved documents: doc\n\n User question: q");
    }

    #[tokio::test]
    async fn reads_json_or_plain_content() {
        let grader = BinaryGrader::answer(Arc::new(MockLlm::with_no_tool_calls(
            r#"{"binary_score": "no"}"#,
        )))
        .unwrap();
        let vars = [("question", "q"), ("generation", "g")];
        assert_eq!(grader.grade(&vars).await.unwrap(), BinaryScore::No);

        let grader =
            BinaryGrader::hallucination(Arc::new(MockLlm::with_no_tool_calls("YES"))).unwrap();
        let vars = [("documents", "d"), ("generation", "g")];
        assert_eq!(grader.grade(&vars).await.unwrap(), BinaryScore::Yes);
    }

    #[tokio::test]
    async fn missing_variable_fails_before_calling_model() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("yes"));
        let grader = BinaryGrader::answer(llm.clone()).unwrap();
        let err = grader.grade(&[("question", "q")]).await.unwrap_err();
        assert!(matches!(err, AgentError::MissingPromptVariable(ref v) if v == "generation"));
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn tool_spec_requires_binary_score() {
        let spec = BinaryGrader::tool_spec_for(ANSWER_GRADER_TOOL);
        assert_eq!(spec.input_schema["required"], json!(["binary_score"]));
    }
}
