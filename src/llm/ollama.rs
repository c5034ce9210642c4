//! Ollama chat client.
//!
//! Sends one non-streaming user message to `/api/chat` and returns the
//! assistant's reply.

use super::{LanguageModel, ModelError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub ollama_url: String,
    pub model_name: String,
    /// Sampling temperature; the model default applies when unset.
    pub temperature: Option<f32>,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.1".to_string(),
            temperature: None,
            timeout_seconds: 300,
        }
    }
}

/// Message in the chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for a local or remote Ollama server.
pub struct OllamaClient {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> reqwest::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn build_request(&self, prompt: &str) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
            options: self
                .config
                .temperature
                .map(|temperature| OllamaOptions { temperature }),
        }
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!("{}/api/chat", self.config.ollama_url.trim_end_matches('/'));
        debug!("Sending {} byte prompt to {}", prompt.len(), url);

        let response = self
            .http_client
            .post(&url)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    ModelError::Connect(self.config.ollama_url.clone())
                } else {
                    ModelError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status, body });
        }

        let chat_response: OllamaChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout(self.config.timeout_seconds)
            } else {
                ModelError::Decode(e.to_string())
            }
        })?;

        Ok(chat_response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = OllamaConfig::default();
        assert_eq!(config.model_name, "llama3.1");
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert!(config.temperature.is_none());
    }

    #[test]
    fn test_request_shape() {
        let client = OllamaClient::new(OllamaConfig::default()).unwrap();
        let request = serde_json::to_value(client.build_request("Summarize this")).unwrap();
        assert_eq!(
            request,
            json!({
                "model": "llama3.1",
                "messages": [{"role": "user", "content": "Summarize this"}],
                "stream": false
            })
        );

        let client = OllamaClient::new(OllamaConfig {
            temperature: Some(0.5),
            ..OllamaConfig::default()
        })
        .unwrap();
        let request = serde_json::to_value(client.build_request("x")).unwrap();
        assert_eq!(request["options"]["temperature"], json!(0.5));
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"model":"llama3.1","created_at":"2024-01-01T00:00:00Z",
            "message":{"role":"assistant","content":"Key findings: ..."},"done":true}"#;
        let response: OllamaChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.message.content, "Key findings: ...");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let client = OllamaClient::new(OllamaConfig {
            ollama_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..OllamaConfig::default()
        })
        .unwrap();

        let result = client.complete("hello").await;
        assert!(matches!(
            result,
            Err(ModelError::Connect(_)) | Err(ModelError::Request(_)) | Err(ModelError::Timeout(_))
        ));
    }
}
