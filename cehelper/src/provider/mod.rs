//! Completion providers: send one prompt, receive one completion.
//!
//! Two OpenAI-compatible chat-completion backends are supported, a hosted
//! API authenticated with a bearer key and a local inference server reached
//! through a plain URL. The backend is selected once at startup.

mod local;
mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use local::LocalProvider;
pub use openai::OpenAiProvider;

/// Errors returned by a completion provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The HTTP exchange itself failed
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("non-OK HTTP status: {status}, body: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body is not a chat completion
    #[error("malformed response: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The completion carried no choices
    #[error("no choices in response")]
    NoChoices,
}

/// Sends a prompt to a language model and returns its completion
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of this provider for logging purposes
    fn name(&self) -> &'static str;

    /// Sends `prompt` as a single user message and returns the first choice
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Which backend to talk to, resolved from settings
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    Hosted {
        api_key: String,
        base_url: String,
        model: String,
    },
    Local {
        url: String,
        model: String,
    },
}

impl ProviderConfig {
    /// Builds the provider described by this configuration
    pub fn build(self) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
        let http = reqwest::Client::builder().build()?;

        Ok(match self {
            Self::Hosted {
                api_key,
                base_url,
                model,
            } => Arc::new(OpenAiProvider::new(http, base_url, api_key, model)),
            Self::Local { url, model } => Arc::new(LocalProvider::new(http, url, model)),
        })
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize, Debug)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatMessage<'a> {
    pub(crate) const fn system(content: &'a str) -> Self {
        Self {
            role: "system",
            content,
        }
    }

    pub(crate) const fn user(content: &'a str) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Posts a chat request and returns the content of the first choice
pub(crate) async fn send_chat(
    request: reqwest::RequestBuilder,
    body: &ChatRequest<'_>,
) -> Result<String, ProviderError> {
    let response = request.json(body).send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::Status { status, body: text });
    }

    let chat: ChatResponse = serde_json::from_str(&text).map_err(ProviderError::Malformed)?;

    chat.choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(ProviderError::NoChoices)
}
