use async_trait::async_trait;

use super::{ChatMessage, ChatRequest, CompletionProvider, ProviderError, send_chat};

/// Hosted OpenAI chat-completions backend
pub struct OpenAiProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(
        http: reqwest::Client,
        base_url: impl AsRef<str>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let endpoint = format!("{}/chat/completions", base_url.as_ref().trim_end_matches('/'));
        Self {
            http,
            endpoint,
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::user(prompt)],
        };

        let request = self.http.post(&self.endpoint).bearer_auth(&self.api_key);
        send_chat(request, &body).await
    }
}
