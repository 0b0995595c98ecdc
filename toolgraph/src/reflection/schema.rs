//! Structured answers the reflexion actor is forced to produce as tool calls.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AgentError;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

/// Tool name of the first draft.
pub const ANSWER_QUESTION: &str = "AnswerQuestion";
/// Tool name of every revision.
pub const REVISE_ANSWER: &str = "ReviseAnswer";

/// Self-critique of an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    /// What information is missing to improve the answer.
    pub missing: String,
    /// What information is superfluous and should be removed.
    pub superfluous: String,
}

/// Initial answer with reflection and search queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerQuestion {
    pub answer: String,
    pub reflection: Reflection,
    #[serde(default)]
    pub search_queries: Vec<String>,
}

/// Revised answer with references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviseAnswer {
    #[serde(flatten)]
    pub answer: AnswerQuestion,
    #[serde(default)]
    pub references: Vec<String>,
}

fn answer_properties() -> serde_json::Value {
    json!({
        "answer": {
            "type": "string",
            "description": "250 word detailed answer to the user's question."
        },
        "reflection": {
            "type": "object",
            "description": "Reflection on the initial answer.",
            "properties": {
                "missing": {
                    "type": "string",
                    "description": "What information is missing to improve the answer?"
                },
                "superfluous": {
                    "type": "string",
                    "description": "What information is superfluous and should be removed?"
                }
            },
            "required": ["missing", "superfluous"]
        },
        "search_queries": {
            "type": "array",
            "items": { "type": "string" },
            "description": "1-3 search queries to research information and improve the answer."
        }
    })
}

impl AnswerQuestion {
    pub fn tool_spec() -> ToolSpec {
        ToolSpec {
            name: ANSWER_QUESTION.to_string(),
            description: Some("Initial answer with reflection and search queries.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": answer_properties(),
                "required": ["answer", "reflection", "search_queries"]
            }),
        }
    }

    /// Parses the arguments of a forced `AnswerQuestion` (or `ReviseAnswer`) call.
    pub fn from_tool_call(call: &ToolCall) -> Result<Self, AgentError> {
        parse_call(call)
    }
}

impl ReviseAnswer {
    pub fn tool_spec() -> ToolSpec {
        let mut properties = answer_properties();
        properties["references"] = json!({
            "type": "array",
            "items": { "type": "string" },
            "description": "Citations motivating your updated answer."
        });
        ToolSpec {
            name: REVISE_ANSWER.to_string(),
            description: Some("Revised answer with references.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": properties,
                "required": ["answer", "reflection", "search_queries", "references"]
            }),
        }
    }

    pub fn from_tool_call(call: &ToolCall) -> Result<Self, AgentError> {
        parse_call(call)
    }
}

fn parse_call<T: for<'de> Deserialize<'de>>(call: &ToolCall) -> Result<T, AgentError> {
    let args = call
        .parse_arguments()
        .map_err(|e| AgentError::Parse(format!("{} arguments are not JSON: {}", call.name, e)))?;
    serde_json::from_value(args)
        .map_err(|e| AgentError::Parse(format!("{} arguments do not match schema: {}", call.name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: serde_json::Value) -> ToolCall {
        ToolCall {
            id: Some("c".into()),
            name: name.into(),
            arguments: args.to_string(),
        }
    }

    #[test]
    fn revise_answer_flattens_answer_fields() {
        let c = call(
            REVISE_ANSWER,
            json!({
                "answer": "a [1]",
                "reflection": {"missing": "m", "superfluous": "s"},
                "search_queries": ["q1"],
                "references": ["[1] https://example.com"]
            }),
        );
        let r = ReviseAnswer::from_tool_call(&c).unwrap();
        assert_eq!(r.answer.answer, "a [1]");
        assert_eq!(r.answer.search_queries, vec!["q1"]);
        assert_eq!(r.references.len(), 1);
    }

    #[test]
    fn schema_mismatch_is_parse_error() {
        let c = call(ANSWER_QUESTION, json!({"answer": 3}));
        assert!(matches!(AnswerQuestion::from_tool_call(&c), Err(AgentError::Parse(_))));
    }

    #[test]
    fn revise_spec_extends_answer_spec() {
        let spec = ReviseAnswer::tool_spec();
        assert_eq!(spec.name, REVISE_ANSWER);
        assert!(spec.input_schema["properties"]["references"].is_object());
        assert!(spec.input_schema["properties"]["reflection"].is_object());
        assert!(AnswerQuestion::tool_spec().input_schema["properties"]["references"].is_null());
    }
}
