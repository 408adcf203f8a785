//! HTTP chat client for OpenAI-compatible and Ollama endpoints.

use super::{CompletionBackend, LlmError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Wire dialect spoken by the model endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// `POST {base}/chat/completions` (GitHub Models, OpenAI, vLLM, ...)
    #[default]
    Openai,
    /// `POST {base}/api/chat`
    Ollama,
}

/// Configuration for the chat client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub provider: Provider,
    pub base_url: String,
    pub model_name: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Openai,
            base_url: "https://models.github.ai/inference".to_string(),
            model_name: "openai/gpt-4.1-nano".to_string(),
            api_key: None,
            temperature: 1.0,
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn user(content: String) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

/// OpenAI-style chat completion request.
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: ResponseMessage,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat client used for every topic analysis.
pub struct ChatClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl ChatClient {
    /// Build a client. Fails only if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match self.config.provider {
            Provider::Openai => format!("{}/chat/completions", base),
            Provider::Ollama => format!("{}/api/chat", base),
        }
    }

    fn request_body(&self, prompt: String) -> Result<serde_json::Value, LlmError> {
        let messages = vec![ChatMessage::user(prompt)];
        let body = match self.config.provider {
            Provider::Openai => serde_json::to_value(OpenAiRequest {
                model: self.config.model_name.clone(),
                messages,
                temperature: self.config.temperature,
            }),
            Provider::Ollama => serde_json::to_value(OllamaRequest {
                model: self.config.model_name.clone(),
                messages,
                stream: false,
                options: OllamaOptions {
                    temperature: self.config.temperature,
                },
            }),
        };
        body.map_err(|e| LlmError::Request(e.to_string()))
    }

    fn extract_content(&self, raw: &str) -> Result<String, LlmError> {
        let content = match self.config.provider {
            Provider::Openai => {
                let parsed: OpenAiResponse =
                    serde_json::from_str(raw).map_err(|e| LlmError::Decode(e.to_string()))?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
            }
            Provider::Ollama => {
                let parsed: OllamaResponse =
                    serde_json::from_str(raw).map_err(|e| LlmError::Decode(e.to_string()))?;
                parsed.message.content
            }
        };

        match content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(LlmError::EmptyResponse),
        }
    }

    async fn send_prompt(&self, prompt: String) -> Result<String, LlmError> {
        let url = self.endpoint();
        let body = self.request_body(prompt)?;

        debug!("Sending completion request to {}", url);

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.config.timeout_seconds)
            } else if e.is_connect() {
                LlmError::Connect(self.config.base_url.clone())
            } else {
                LlmError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.config.timeout_seconds)
            } else {
                LlmError::Decode(e.to_string())
            }
        })?;

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: raw,
            });
        }

        self.extract_content(&raw)
    }
}

impl CompletionBackend for ChatClient {
    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    async fn complete(&self, prompt: String) -> Result<String, LlmError> {
        self.send_prompt(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(provider: Provider) -> ChatClient {
        ChatClient::new(ClientConfig {
            provider,
            base_url: "http://localhost:11434/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.provider, Provider::Openai);
        assert_eq!(config.timeout_seconds, 120);
        assert_eq!(config.model_name, "openai/gpt-4.1-nano");
    }

    #[test]
    fn test_endpoint_per_provider() {
        assert_eq!(
            client(Provider::Openai).endpoint(),
            "http://localhost:11434/chat/completions"
        );
        assert_eq!(
            client(Provider::Ollama).endpoint(),
            "http://localhost:11434/api/chat"
        );
    }

    #[test]
    fn test_request_body_shapes() {
        let openai = client(Provider::Openai)
            .request_body("hi".to_string())
            .unwrap();
        assert_eq!(openai["messages"][0]["role"], "user");
        assert_eq!(openai["messages"][0]["content"], "hi");
        assert!(openai.get("stream").is_none());

        let ollama = client(Provider::Ollama)
            .request_body("hi".to_string())
            .unwrap();
        assert_eq!(ollama["stream"], false);
        assert!(ollama["options"]["temperature"].is_number());
    }

    #[test]
    fn test_extract_openai_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"All good."}}]}"#;
        assert_eq!(
            client(Provider::Openai).extract_content(raw).unwrap(),
            "All good."
        );
    }

    #[test]
    fn test_extract_ollama_content() {
        let raw = r#"{"message":{"role":"assistant","content":"Fine."},"done":true}"#;
        assert_eq!(client(Provider::Ollama).extract_content(raw).unwrap(), "Fine.");
    }

    #[test]
    fn test_extract_empty_and_malformed() {
        let openai = client(Provider::Openai);
        assert!(matches!(
            openai.extract_content(r#"{"choices":[]}"#),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            openai.extract_content("not json"),
            Err(LlmError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_error() {
        let client = ChatClient::new(ClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..ClientConfig::default()
        })
        .unwrap();
        let result = client.complete("hello".to_string()).await;
        tokio_test::assert_err!(result);
    }
}
