use std::time::Instant;

use anthropic_ai_sdk::client::AnthropicClient;
use anthropic_ai_sdk::types::message::{
    ContentBlock as ApiContentBlock, CreateMessageParams, CreateMessageResponse, Message,
    MessageClient, MessageError, RequiredMessageParams, Role,
};
use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, warn};

use crate::error::{SdkError, TransportError};
use crate::sdk::message::{
    AssistantBody, AssistantMessage, ContentBlock, ResultMessage, SdkMessage, SystemMessage,
};
use crate::sdk::transport::{MessageStream, QueryRequest, Transport};

#[derive(Debug, Clone)]
/// Runtime configuration for [`AnthropicTransport`].
pub struct AnthropicConfig {
    /// Anthropic API key.
    pub api_key: String,
    /// Model id used when the query does not name one.
    pub model: String,
    /// Anthropic API version header value.
    pub api_version: String,
    /// Optional base URL override for proxies or compatible endpoints.
    pub api_base_url: Option<String>,
    /// Maximum output tokens for the single turn.
    pub max_tokens: u32,
}

impl AnthropicConfig {
    pub const DEFAULT_MODEL: &'static str = "claude-sonnet-4-5";

    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            api_version: AnthropicClient::DEFAULT_API_VERSION.to_string(),
            api_base_url: None,
            max_tokens: 4096,
        }
    }
}

/// Sends a query as one Messages API turn. Tools are not executed on this path.
#[derive(Debug, Clone)]
pub struct AnthropicTransport {
    client: AnthropicClient,
    config: AnthropicConfig,
}

impl AnthropicTransport {
    pub fn new(config: AnthropicConfig) -> Result<Self, SdkError> {
        let mut builder =
            AnthropicClient::builder(config.api_key.clone(), config.api_version.clone());
        if let Some(url) = &config.api_base_url {
            builder = builder.with_api_base_url(url.clone());
        }

        let client = builder
            .build::<MessageError>()
            .map_err(|err| TransportError::Request(err.to_string()))?;

        Ok(Self { client, config })
    }

    fn build_params(&self, request: &QueryRequest) -> (String, CreateMessageParams) {
        let model = request
            .options
            .model
            .clone()
            .unwrap_or_else(|| self.config.model.clone());

        let required = RequiredMessageParams {
            model: model.clone(),
            messages: vec![Message::new_text(Role::User, request.prompt.clone())],
            max_tokens: self.config.max_tokens,
        };
        let mut params = CreateMessageParams::new(required).with_stream(false);

        let system = [
            request.options.system_prompt.as_deref(),
            request.options.append_system_prompt.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();
        if !system.is_empty() {
            params = params.with_system(system.join("\n\n"));
        }

        (model, params)
    }
}

#[async_trait]
impl Transport for AnthropicTransport {
    async fn open(&self, request: &QueryRequest) -> Result<MessageStream, SdkError> {
        if !request.options.allowed_tools.is_empty() {
            warn!(
                tools = ?request.options.allowed_tools,
                "direct API backend cannot run tools; continuing text-only"
            );
        }

        let (model, params) = self.build_params(request);
        debug!(%model, "sending single-turn request");

        let started = Instant::now();
        let response = self
            .client
            .create_message(Some(&params))
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let events = vec![
            SdkMessage::System(SystemMessage {
                subtype: "init".to_string(),
                model: Some(model),
                cwd: request
                    .options
                    .cwd
                    .as_ref()
                    .map(|cwd| cwd.display().to_string()),
                ..SystemMessage::default()
            }),
            SdkMessage::Assistant(to_assistant_message(&response)),
            SdkMessage::Result(to_result_message(&response, duration_ms)),
        ];

        Ok(stream::iter(events.into_iter().map(Ok)).boxed())
    }
}

fn to_assistant_message(response: &CreateMessageResponse) -> AssistantMessage {
    let content = response
        .content
        .iter()
        .filter_map(|block| match block {
            ApiContentBlock::Text { text } => Some(ContentBlock::Text { text: text.clone() }),
            ApiContentBlock::Thinking {
                thinking,
                signature,
            } => Some(ContentBlock::Thinking {
                thinking: thinking.clone(),
                signature: Some(signature.clone()),
            }),
            ApiContentBlock::ToolUse { id, name, input } => Some(ContentBlock::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
            _ => None,
        })
        .collect();

    AssistantMessage {
        message: AssistantBody {
            id: Some(response.id.clone()),
            model: Some(response.model.clone()),
            content,
        },
        parent_tool_use_id: None,
        session_id: None,
    }
}

fn to_result_message(response: &CreateMessageResponse, duration_ms: u64) -> ResultMessage {
    let text = response
        .content
        .iter()
        .filter_map(|block| match block {
            ApiContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    ResultMessage {
        subtype: "success".to_string(),
        is_error: false,
        duration_ms,
        num_turns: 1,
        result: Some(text),
        total_cost_usd: None,
        session_id: None,
    }
}
