//! Chat-completion backend used by the relay endpoint.
//! One user message per request, fixed model, first choice wins.

use crate::config::AstroConfig;
use crate::error::CompletionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Turns a user prompt into a single assistant reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Option<Vec<CompletionChoice>>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client.
pub struct ChatCompletionClient {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionClient {
    pub fn from_config(config: &AstroConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            url: config.completion_url.clone(),
            model: config.completion_model.clone(),
            api_key: config.completion_api_key().map(str::to_string),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Pull the first choice's text out of a completion body.
fn first_choice(body: CompletionResponse) -> Result<String, CompletionError> {
    body.choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or(CompletionError::EmptyChoice)
}

#[async_trait]
impl CompletionBackend for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::MissingApiKey)?;
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(target: "astrovision::completion", model = %self.model, chars = prompt.len(), "completion request");
        let res = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            tracing::warn!(target: "astrovision::completion", status = %status, "completion API error");
            return Err(CompletionError::Status(status.as_u16(), text));
        }

        let parsed: CompletionResponse = res
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.to_string()))?;
        first_choice(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: serde_json::Value) -> CompletionResponse {
        serde_json::from_value(v).expect("response shape")
    }

    #[test]
    fn request_body_has_model_and_single_user_message() {
        let body = CompletionRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage { role: "user", content: "Explain Kp-index" }],
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "Explain Kp-index"}]
            })
        );
    }

    #[test]
    fn first_choice_wins() {
        let body = parse(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        }));
        assert_eq!(first_choice(body).expect("content"), "first");
    }

    #[test]
    fn missing_choices_are_an_error() {
        assert!(matches!(first_choice(parse(json!({}))), Err(CompletionError::EmptyChoice)));
        assert!(matches!(
            first_choice(parse(json!({"choices": [{"message": {}}]}))),
            Err(CompletionError::EmptyChoice)
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let config = AstroConfig {
            openai_api_key: None,
            ..Default::default()
        };
        let client = ChatCompletionClient::from_config(&config);
        assert!(!client.has_api_key());
        assert!(matches!(
            client.complete("hi").await,
            Err(CompletionError::MissingApiKey)
        ));
    }
}
