//! OpenAI Chat Completions client implementing `LlmClient` (ChatOpenAI).
//!
//! Maps the full conversation, including assistant tool calls and tool observations, so
//! native function-calling loops can replay the exchange. Tools, tool choice, temperature and
//! stop sequences are set with builder methods.
//!
//! **Interaction**: Implements `LlmClient`; depends on `async_openai` (feature `openai`).

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionNamedToolChoice, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessage, ChatCompletionTool,
        ChatCompletionToolChoiceOption, ChatCompletionTools, CreateChatCompletionRequestArgs,
        FunctionCall, FunctionName, FunctionObject, ToolChoiceOptions,
    },
    Client,
};

use super::ToolChoiceMode;

/// OpenAI Chat Completions client.
///
/// Uses `OPENAI_API_KEY` from the environment with [`ChatOpenAI::new`], or an explicit
/// [`OpenAIConfig`] with [`ChatOpenAI::with_config`].
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    tools: Option<Vec<ToolSpec>>,
    temperature: Option<f32>,
    tool_choice: Option<ToolChoiceMode>,
    stop: Vec<String>,
}

impl ChatOpenAI {
    /// Build client with default config (API key from `OPENAI_API_KEY` env).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_client(Client::new(), model)
    }

    /// Build client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self::with_client(Client::with_config(config), model)
    }

    fn with_client(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            tools: None,
            temperature: None,
            tool_choice: None,
            stop: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Set tools for this completion (enables tool_calls in response).
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set tool choice mode. `Function(name)` forces a call to that tool.
    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = Some(mode);
        self
    }

    /// Stop sequences sent with every request.
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }

    fn build_error(e: OpenAIError) -> AgentError {
        AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e))
    }

    /// Convert our `Message` list to OpenAI request messages.
    ///
    /// Calls without an id get `call_{i}` by position in their assistant message; the i-th
    /// tool message after that assistant message gets the same id.
    fn messages_to_request(
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        let mut tool_index = 0usize;
        messages
            .iter()
            .map(|m| match m {
                Message::System(s) => Ok(ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(s.as_str()),
                )),
                Message::User(s) => Ok(ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(s.as_str()),
                )),
                Message::Assistant {
                    content,
                    tool_calls,
                } => {
                    tool_index = 0;
                    let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                    if !content.is_empty() || tool_calls.is_empty() {
                        args.content(content.clone());
                    }
                    if !tool_calls.is_empty() {
                        let calls: Vec<ChatCompletionMessageToolCalls> = tool_calls
                            .iter()
                            .enumerate()
                            .map(|(i, tc)| {
                                ChatCompletionMessageToolCalls::Function(
                                    ChatCompletionMessageToolCall {
                                        id: tc.id.clone().unwrap_or_else(|| fallback_call_id(i)),
                                        function: FunctionCall {
                                            name: tc.name.clone(),
                                            arguments: tc.arguments.clone(),
                                        },
                                    },
                                )
                            })
                            .collect();
                        args.tool_calls(calls);
                    }
                    Ok(ChatCompletionRequestMessage::Assistant(
                        args.build().map_err(Self::build_error)?,
                    ))
                }
                Message::Tool {
                    call_id, content, ..
                } => {
                    let i = tool_index;
                    tool_index += 1;
                    let msg = ChatCompletionRequestToolMessageArgs::default()
                        .content(content.clone())
                        .tool_call_id(call_id.clone().unwrap_or_else(|| fallback_call_id(i)))
                        .build()
                        .map_err(Self::build_error)?;
                    Ok(ChatCompletionRequestMessage::Tool(msg))
                }
            })
            .collect()
    }

    fn tool_choice_option(mode: &ToolChoiceMode) -> ChatCompletionToolChoiceOption {
        match mode {
            ToolChoiceMode::Auto => ChatCompletionToolChoiceOption::Mode(ToolChoiceOptions::Auto),
            ToolChoiceMode::None => ChatCompletionToolChoiceOption::Mode(ToolChoiceOptions::None),
            ToolChoiceMode::Required => {
                ChatCompletionToolChoiceOption::Mode(ToolChoiceOptions::Required)
            }
            ToolChoiceMode::Function(name) => {
                ChatCompletionToolChoiceOption::Function(ChatCompletionNamedToolChoice {
                    function: FunctionName { name: name.clone() },
                })
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        stop: &[String],
    ) -> Result<LlmResponse, AgentError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(messages)?);

        if let Some(ref tools) = self.tools {
            let chat_tools: Vec<ChatCompletionTools> = tools
                .iter()
                .map(|t| {
                    ChatCompletionTools::Function(ChatCompletionTool {
                        function: FunctionObject {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: Some(t.input_schema.clone()),
                            ..Default::default()
                        },
                    })
                })
                .collect();
            args.tools(chat_tools);
        }

        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        if let Some(ref mode) = self.tool_choice {
            args.tool_choice(Self::tool_choice_option(mode));
        }

        if !stop.is_empty() {
            args.stop(stop.to_vec());
        }

        let request = args.build().map_err(Self::build_error)?;

        tracing::debug!(model = %self.model, messages = messages.len(), "chat completion request");
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI API error: {}", e)))?;

        let choice =
            response.choices.into_iter().next().ok_or_else(|| {
                AgentError::ExecutionFailed("OpenAI returned no choices".to_string())
            })?;

        let msg = choice.message;
        let content = msg.content.unwrap_or_default();
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| {
                if let ChatCompletionMessageToolCalls::Function(f) = tc {
                    Some(ToolCall {
                        name: f.function.name,
                        arguments: f.function.arguments,
                        id: Some(f.id),
                    })
                } else {
                    None
                }
            })
            .collect();

        Ok(LlmResponse {
            content,
            tool_calls,
        })
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.complete(messages, &self.stop).await
    }

    async fn invoke_with_stop(
        &self,
        messages: &[Message],
        stop: &[String],
    ) -> Result<LlmResponse, AgentError> {
        self.complete(messages, stop).await
    }
}

fn fallback_call_id(index: usize) -> String {
    format!("call_{}", index)
}

#[cfg(all(test, feature = "openai"))]
mod tests {
    use super::*;

    /// **Scenario**: ChatOpenAI::with_config uses custom config and model.
    #[test]
    fn chat_openai_with_config_creates_client() {
        let config = OpenAIConfig::new().with_api_key("test-key");
        let llm = ChatOpenAI::with_config(config, "gpt-4.1-nano");
        assert_eq!(llm.model(), "gpt-4.1-nano");
    }

    /// **Scenario**: a full tool exchange maps to system, user, assistant(tool_calls), tool.
    #[test]
    fn messages_to_request_maps_tool_exchange() {
        let call = ToolCall {
            id: Some("call_1".into()),
            name: "get_string_length".into(),
            arguments: r#"{"text":"DOG"}"#.into(),
        };
        let messages = vec![
            Message::system("sys"),
            Message::user("What is the length of the string: DOG"),
            Message::assistant_with_tool_calls("", vec![call]),
            Message::tool(Some("call_1".into()), "get_string_length", "3"),
        ];
        let mapped = ChatOpenAI::messages_to_request(&messages).unwrap();
        assert_eq!(mapped.len(), 4);
        assert!(matches!(mapped[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(mapped[1], ChatCompletionRequestMessage::User(_)));
        match &mapped[2] {
            ChatCompletionRequestMessage::Assistant(a) => {
                assert_eq!(a.tool_calls.as_ref().map(|c| c.len()), Some(1));
            }
            other => panic!("expected assistant, got {:?}", other),
        }
        match &mapped[3] {
            ChatCompletionRequestMessage::Tool(t) => assert_eq!(t.tool_call_id, "call_1"),
            other => panic!("expected tool, got {:?}", other),
        }
    }

    /// **Scenario**: calls without ids and their tool messages get matching positional ids.
    #[test]
    fn missing_call_ids_pair_assistant_and_tool_messages() {
        let call = |name: &str| ToolCall {
            id: None,
            name: name.into(),
            arguments: "{}".into(),
        };
        let messages = vec![
            Message::user("q"),
            Message::assistant_with_tool_calls("", vec![call("triple"), call("get_string_length")]),
            Message::tool(None, "triple", "9.0"),
            Message::tool(None, "get_string_length", "3"),
            Message::assistant_with_tool_calls("", vec![call("triple")]),
            Message::tool(None, "triple", "3.0"),
        ];
        let mapped = ChatOpenAI::messages_to_request(&messages).unwrap();
        let assistant_ids = |m: &ChatCompletionRequestMessage| match m {
            ChatCompletionRequestMessage::Assistant(a) => a
                .tool_calls
                .iter()
                .flatten()
                .map(|c| match c {
                    ChatCompletionMessageToolCalls::Function(f) => f.id.clone(),
                    other => panic!("unexpected call {:?}", other),
                })
                .collect::<Vec<_>>(),
            other => panic!("expected assistant, got {:?}", other),
        };
        let tool_id = |m: &ChatCompletionRequestMessage| match m {
            ChatCompletionRequestMessage::Tool(t) => t.tool_call_id.clone(),
            other => panic!("expected tool, got {:?}", other),
        };
        assert_eq!(assistant_ids(&mapped[1]), vec!["call_0", "call_1"]);
        assert_eq!(tool_id(&mapped[2]), "call_0");
        assert_eq!(tool_id(&mapped[3]), "call_1");
        assert_eq!(assistant_ids(&mapped[4]), vec!["call_0"]);
        assert_eq!(tool_id(&mapped[5]), "call_0");
    }

    #[test]
    fn named_tool_choice_maps_to_function() {
        let opt = ChatOpenAI::tool_choice_option(&ToolChoiceMode::Function("grade".into()));
        assert!(matches!(opt, ChatCompletionToolChoiceOption::Function(ref f) if f.function.name == "grade"));
    }

    /// **Scenario**: Builder chain with_tools, with_temperature and with_stop builds without panic.
    #[test]
    fn chat_openai_builder_chain() {
        let tools = vec![ToolSpec {
            name: "get_string_length".into(),
            description: None,
            input_schema: serde_json::json!({}),
        }];
        let _ = ChatOpenAI::new("gpt-4")
            .with_tools(tools)
            .with_temperature(0.5f32)
            .with_tool_choice(ToolChoiceMode::Required)
            .with_stop(vec!["Observation:".into()]);
    }
}
