use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::cli::chat::conversation_state::Message;
use crate::config::Settings;

const CHAT_COMPLETIONS_PATH: [&str; 2] = ["chat", "completions"];

/// Anything that went wrong while obtaining a completion.
///
/// Retryable and fatal failures are deliberately not told apart: every
/// variant ends up as a visible transcript entry.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response contained no choices")]
    NoChoices,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// A hosted model that turns a conversation into a single reply.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String, ProviderError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the OpenAI chat completions endpoint (or any server speaking
/// the same protocol).
pub struct OpenAiClient {
    api_key: String,
    url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(settings: &Settings) -> Self {
        // Append to the path so a query string on the base (api-version=...) stays put.
        let mut url = settings.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(CHAT_COMPLETIONS_PATH);
        }

        Self {
            api_key: settings.api_key.clone(),
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String, ProviderError> {
        let request_body = ChatRequest { model, messages };

        debug!(
            "Sending {} messages to {} (model {})",
            messages.len(),
            self.url,
            model
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        debug!("Completion endpoint answered with {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_reply(&body)
    }
}

/// Pull the first choice's text out of a chat completions response body.
fn parse_reply(body: &str) -> Result<String, ProviderError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let first = response
        .choices
        .into_iter()
        .next()
        .ok_or(ProviderError::NoChoices)?;

    // content is null when the model answers with tool calls only
    Ok(first.message.content.unwrap_or_default())
}
