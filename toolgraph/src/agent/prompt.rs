//! Prompt pieces for the text ReAct executor.

use crate::tool_source::ToolSpec;

use super::AgentAction;

/// ReAct prompt. Variables: `tools`, `tool_names`, `input`, `agent_scratchpad`.
pub const REACT_TEXT_TEMPLATE: &str = "Answer the following questions as best you can. You have access to the following tools:

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {input}
Thought:{agent_scratchpad}";

/// One `name: description` line per tool.
pub fn render_text_description(tools: &[ToolSpec]) -> String {
    tools
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description.as_deref().unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comma-separated tool names for the `Action:` line.
pub fn render_tool_names(tools: &[ToolSpec]) -> String {
    tools
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Scratchpad: each step's log, then its observation and a fresh `Thought: ` prompt.
pub fn format_log_to_str(steps: &[(AgentAction, String)]) -> String {
    let mut thoughts = String::new();
    for (action, observation) in steps {
        thoughts.push_str(&action.log);
        thoughts.push_str("\nObservation: ");
        thoughts.push_str(observation);
        thoughts.push_str("\nThought: ");
    }
    thoughts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptTemplate;
    use serde_json::json;

    fn spec(name: &str, description: &str) -> ToolSpec {
        ToolSpec {
            name: name.into(),
            description: Some(description.into()),
            input_schema: json!({}),
        }
    }

    #[test]
    fn renders_tools_one_per_line() {
        let tools = vec![spec("a", "first"), spec("b", "second")];
        assert_eq!(render_text_description(&tools), "a: first\nb: second");
        assert_eq!(render_tool_names(&tools), "a, b");
    }

    #[test]
    fn scratchpad_appends_observation_and_thought() {
        let action = AgentAction {
            tool: "get_string_length".into(),
            tool_input: "dog".into(),
            log: " I should count.\nAction: get_string_length\nAction Input: dog".into(),
        };
        let s = format_log_to_str(&[(action, "3".into())]);
        assert!(s.ends_with("Action Input: dog\nObservation: 3\nThought: "));
        assert_eq!(format_log_to_str(&[]), "");
    }

    #[test]
    fn template_declares_expected_variables() {
        let t = PromptTemplate::from_template(REACT_TEXT_TEMPLATE).unwrap();
        assert_eq!(
            t.input_variables(),
            vec!["tools", "tool_names", "input", "agent_scratchpad"]
        );
    }
}
