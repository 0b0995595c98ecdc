use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::Tool;

/// Tool name for the triple tool.
pub const TOOL_TRIPLE: &str = "triple";

/// Multiplies a number by three. The result is always rendered as a float (`9.0`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TripleTool;

fn number_arg(args: &Value) -> Option<f64> {
    let v = match args {
        Value::Object(_) => args.get("num")?,
        other => other,
    };
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl Tool for TripleTool {
    fn name(&self) -> &str {
        TOOL_TRIPLE
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_TRIPLE.to_string(),
            description: Some("This function triples the input number".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "num": { "type": "number", "description": "The number to triple" }
                },
                "required": ["num"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let num = number_arg(&args)
            .ok_or_else(|| ToolSourceError::InvalidInput("num must be a number".to_string()))?;
        let tripled = num * 3.0;
        if !tripled.is_finite() {
            return Err(ToolSourceError::InvalidInput(format!(
                "{} tripled is not a finite number",
                num
            )));
        }
        Ok(ToolCallContent::new(Value::from(tripled).to_string()))
    }
}
