use async_trait::async_trait;

use super::{ChatMessage, ChatRequest, CompletionProvider, ProviderError, send_chat};

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// OpenAI-compatible inference server reachable at a fixed URL
pub struct LocalProvider {
    http: reqwest::Client,
    url: String,
    model: String,
}

impl LocalProvider {
    pub fn new(http: reqwest::Client, url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for LocalProvider {
    fn name(&self) -> &'static str {
        "local-llm"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
        };

        send_chat(self.http.post(&self.url), &body).await
    }
}
