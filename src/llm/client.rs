//! HTTP client for the Anthropic Messages API

use super::traits::CompletionClient;
use super::types::{ErrorResponse, Message, MessagesRequest, MessagesResponse};
use crate::config::{seconds, AnthropicSettings};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("ANTHROPIC_API_KEY is not set")]
    ApiKeyNotSet,

    #[error("API rate limit exceeded")]
    RateLimited,

    #[error("API error ({status}): {kind}: {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("model returned no text content")]
    EmptyReply,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Anthropic Messages API client
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
    api_version: String,
}

impl AnthropicClient {
    /// Create a client from settings
    pub fn with_settings(settings: &AnthropicSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(crate::USER_AGENT)
            .gzip(true)
            .brotli(true);

        if let Some(timeout) = settings.request_timeout.filter(|t| *t > 0.0) {
            builder = builder.timeout(seconds(timeout));
        }

        Ok(Self {
            http: builder.build()?,
            api_key: ApiKey(settings.api_key.trim().to_string()),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_version: settings.api_version.clone(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    async fn send(&self, prompt: &str, max_tokens: u32) -> Result<MessagesResponse, LlmError> {
        if self.api_key.0.is_empty() {
            return Err(LlmError::ApiKeyNotSet);
        }

        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(self.messages_url())
            .header("x-api-key", &self.api_key.0)
            .header("anthropic-version", &self.api_version)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Anthropic API rate limited");
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &text));
        }

        let body: MessagesResponse = response.json().await?;
        debug!(
            model = %self.model,
            stop_reason = body.stop_reason.as_deref().unwrap_or("unknown"),
            "completion received"
        );
        Ok(body)
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let text = self.send(prompt, max_tokens).await?.text();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyReply);
        }
        Ok(text)
    }
}

fn classify_error(status: StatusCode, body: &str) -> LlmError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => LlmError::Api {
            status: status.as_u16(),
            kind: parsed.error.kind,
            message: parsed.error.message,
        },
        Err(_) => {
            let snippet: String = body.chars().take(200).collect();
            LlmError::Api {
                status: status.as_u16(),
                kind: "http_error".to_string(),
                message: snippet,
            }
        }
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: &str) -> AnthropicClient {
        let settings = AnthropicSettings {
            api_key: api_key.to_string(),
            base_url: server.uri(),
            ..Default::default()
        };
        AnthropicClient::with_settings(&settings).unwrap()
    }

    #[tokio::test]
    async fn complete_sends_headers_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-3-opus-20240229",
                "max_tokens": 512
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "[]"}],
                "stop_reason": "end_turn"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "test-key");
        let text = client.complete("find a loader", 512).await.unwrap();
        assert_eq!(text, "[]");
    }

    #[tokio::test]
    async fn complete_429_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = client_for(&server, "test-key");
        let result = client.complete("anything", 10).await;
        assert!(matches!(result, Err(LlmError::RateLimited)));
    }

    #[tokio::test]
    async fn complete_provider_error_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "invalid_request_error", "message": "max_tokens too large"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, "test-key");
        match client.complete("anything", 10).await {
            Err(LlmError::Api { status: 400, kind, .. }) => {
                assert_eq!(kind, "invalid_request_error");
            }
            other => panic!("expected Api(400), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_without_text_is_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [],
                "stop_reason": "max_tokens"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, "test-key");
        assert!(matches!(
            client.complete("anything", 10).await,
            Err(LlmError::EmptyReply)
        ));
    }

    #[tokio::test]
    async fn missing_key_never_reaches_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, "  ");
        assert!(matches!(
            client.complete("anything", 10).await,
            Err(LlmError::ApiKeyNotSet)
        ));
    }
}
