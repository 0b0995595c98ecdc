//! Parser for ReAct-formatted model output.

use thiserror::Error;

/// Marker that introduces the final answer.
pub const FINAL_ANSWER_ACTION: &str = "Final Answer:";

const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";

/// A tool invocation parsed from model text.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentAction {
    pub tool: String,
    pub tool_input: String,
    /// Full model text this action came from (fed back in the scratchpad).
    pub log: String,
}

/// Final answer parsed from model text.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentFinish {
    pub output: String,
    pub log: String,
}

/// What the model decided to do.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    Action(AgentAction),
    Finish(AgentFinish),
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("parsing LLM output produced both a final answer and a parse-able action: {0}")]
    FinalAnswerAndAction(String),

    #[error("could not parse LLM output: {0}")]
    Unparseable(String),
}

/// Parses `Thought/Action/Action Input` or `Final Answer:` text.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReActOutputParser;

impl ReActOutputParser {
    /// Finds `Action:` followed later by `Action Input:`; returns (tool, raw input).
    fn find_action(text: &str) -> Option<(String, String)> {
        let mut search_from = 0;
        while let Some(rel) = text[search_from..].find(ACTION) {
            let start = search_from + rel + ACTION.len();
            if let Some(input_rel) = text[start..].find(ACTION_INPUT) {
                let tool = text[start..start + input_rel].trim().to_string();
                let input = text[start + input_rel + ACTION_INPUT.len()..].to_string();
                return Some((tool, input));
            }
            search_from = start;
        }
        None
    }

    pub fn parse(&self, text: &str) -> Result<AgentStep, ParseError> {
        let includes_answer = text.contains(FINAL_ANSWER_ACTION);
        match Self::find_action(text) {
            Some(_) if includes_answer => Err(ParseError::FinalAnswerAndAction(text.to_string())),
            Some((tool, input)) => {
                let tool_input = input.trim().trim_matches('"').to_string();
                Ok(AgentStep::Action(AgentAction {
                    tool,
                    tool_input,
                    log: text.to_string(),
                }))
            }
            None if includes_answer => {
                let output = text
                    .rsplit(FINAL_ANSWER_ACTION)
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                Ok(AgentStep::Finish(AgentFinish {
                    output,
                    log: text.to_string(),
                }))
            }
            None => Err(ParseError::Unparseable(text.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_action_and_trims_input() {
        let text = " I need the length.\nAction: get_string_length\nAction Input: \"DOG\"\n";
        match ReActOutputParser.parse(text).unwrap() {
            AgentStep::Action(a) => {
                assert_eq!(a.tool, "get_string_length");
                assert_eq!(a.tool_input, "DOG");
                assert_eq!(a.log, text);
            }
            other => panic!("expected action, got {:?}", other),
        }
    }

    #[test]
    fn single_quotes_survive_for_the_tool() {
        let text = "Action: get_string_length\nAction Input: 'independiente'";
        match ReActOutputParser.parse(text).unwrap() {
            AgentStep::Action(a) => assert_eq!(a.tool_input, "'independiente'"),
            other => panic!("expected action, got {:?}", other),
        }
    }

    #[test]
    fn parses_final_answer() {
        let text = " I now know the final answer\nFinal Answer: The length is 13.";
        assert_eq!(
            ReActOutputParser.parse(text).unwrap(),
            AgentStep::Finish(AgentFinish {
                output: "The length is 13.".into(),
                log: text.into(),
            })
        );
    }

    #[test]
    fn both_answer_and_action_is_error() {
        let text = "Action: x\nAction Input: y\nFinal Answer: z";
        assert!(matches!(
            ReActOutputParser.parse(text),
            Err(ParseError::FinalAnswerAndAction(_))
        ));
    }

    /// **Scenario**: an `Action:` without `Action Input:` is not an action.
    #[test]
    fn neither_is_unparseable() {
        assert!(matches!(
            ReActOutputParser.parse("I am thinking. Action: x"),
            Err(ParseError::Unparseable(_))
        ));
        assert!(matches!(
            ReActOutputParser.parse(""),
            Err(ParseError::Unparseable(_))
        ));
    }
}
