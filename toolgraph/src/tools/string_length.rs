use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::Tool;

/// Tool name for the string length tool.
pub const TOOL_GET_STRING_LENGTH: &str = "get_string_length";

/// Returns the length of a string, in characters.
///
/// Models often echo the quoting from the question (`'independiente'`, `"DOG"`), so surrounding
/// single quotes and newlines are trimmed, then surrounding double quotes.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringLengthTool;

impl StringLengthTool {
    /// Character count of `text` after trimming surrounding quotes and newlines.
    pub fn measure(text: &str) -> usize {
        text.trim_matches(|c| c == '\'' || c == '\n')
            .trim_matches('"')
            .chars()
            .count()
    }
}

#[async_trait]
impl Tool for StringLengthTool {
    fn name(&self) -> &str {
        TOOL_GET_STRING_LENGTH
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_GET_STRING_LENGTH.to_string(),
            description: Some("This tool returns the length of a string".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "The text to get the length of"
                    }
                },
                "required": ["text"]
            }),
        }
    }

    /// Accepts `{"text": "..."}` or a bare JSON string (the text ReAct executor passes the
    /// raw action input).
    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let text = match &args {
            Value::String(s) => s.as_str(),
            _ => args
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolSourceError::InvalidInput("missing text".to_string()))?,
        };
        Ok(ToolCallContent::new(Self::measure(text).to_string()))
    }
}
