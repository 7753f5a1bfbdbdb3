//! Thin client for the external agent runtime.
//!
//! `query_stream` hands a prompt and [`QueryOptions`] to a [`Transport`] and
//! forwards the runtime's events until the final [`ResultMessage`].

mod anthropic;
mod message;
mod options;
mod transport;

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use tracing::debug;

use crate::error::SdkError;

pub use anthropic::{AnthropicConfig, AnthropicTransport};
pub use message::{
    AssistantBody, AssistantMessage, ContentBlock, ResultMessage, SdkMessage, SystemMessage,
    UserBody, UserContent, UserMessage,
};
pub use options::{AgentDefinition, PermissionMode, QueryOptions};
pub use transport::{
    CliTransport, DEFAULT_CLI_PROGRAM, FixtureTransport, MessageStream, QueryRequest, Transport,
};

pub fn query_stream<'a>(
    transport: &'a dyn Transport,
    prompt: impl Into<String>,
    options: QueryOptions,
) -> impl Stream<Item = Result<SdkMessage, SdkError>> + Send + 'a {
    let request = QueryRequest {
        prompt: prompt.into(),
        options,
    };

    try_stream! {
        request.options.validate()?;
        if request.prompt.trim().is_empty() {
            Err::<(), SdkError>(SdkError::InvalidOptions(
                "prompt must not be empty".to_string(),
            ))?;
        }

        let mut events = transport.open(&request).await?;
        let mut saw_result = false;

        while let Some(event) = events.next().await {
            let event = event?;
            let is_result = matches!(event, SdkMessage::Result(_));
            yield event;

            if is_result {
                saw_result = true;
                break;
            }
        }

        if !saw_result {
            Err::<(), SdkError>(SdkError::MissingResult)?;
        }
        debug!("query finished");
    }
}

/// Drains a query and returns its final result.
pub async fn query(
    transport: &dyn Transport,
    prompt: impl Into<String>,
    options: QueryOptions,
) -> Result<ResultMessage, SdkError> {
    let stream = query_stream(transport, prompt, options);
    futures_util::pin_mut!(stream);

    let mut result = None;
    while let Some(event) = stream.next().await {
        if let SdkMessage::Result(message) = event? {
            result = Some(message);
        }
    }

    result.ok_or(SdkError::MissingResult)
}
