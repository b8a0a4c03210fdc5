//! LLM client abstraction.
//!
//! One trait, one HTTP implementation that speaks the Ollama chat API with an
//! OpenAI-compatible fallback, and a fake client for tests. Responses are
//! plain text; collaborators that need structure (the classifier) parse it
//! themselves.

use crate::config::LlmConfig;
use crate::transcript::Role;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One chat message on the wire. Role serializes to the usual
/// system/user/assistant strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// LLM transport errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("backend returned empty content")]
    Empty,
}

/// Generic chat-completion client.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the messages and return the assistant's text content.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// HTTP client for Ollama or OpenAI-compatible endpoints.
pub struct HttpLlmClient {
    config: LlmConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok());
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Heuristic: default Ollama port or an "ollama" host component.
    fn is_ollama_endpoint(&self) -> bool {
        self.config.endpoint.contains("11434") || self.config.endpoint.contains("ollama")
    }

    /// Cheap reachability probe for `triagectl doctor`. Never errors.
    pub async fn is_reachable(&self) -> bool {
        let url = if self.is_ollama_endpoint() {
            format!("{}/api/tags", self.config.endpoint)
        } else {
            format!("{}/v1/models", self.config.endpoint)
        };
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
        {
            Ok(c) => c,
            Err(_) => return false,
        };
        client
            .get(url)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn chat_ollama(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.config.endpoint);
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "stream": false,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(LlmError::Http(format!("HTTP {} from Ollama", response.status())));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        let text = json
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| LlmError::InvalidResponse("missing message.content".to_string()))?;

        Ok(text.to_string())
    }

    async fn chat_openai_compatible(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.config.endpoint);
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "max_tokens": self.config.max_tokens,
        });

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(LlmError::Http(format!(
                "HTTP {} from OpenAI-compatible API",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        let text = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                LlmError::InvalidResponse("missing choices[0].message.content".to_string())
            })?;

        Ok(text.to_string())
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.config.timeout_secs)
        } else {
            LlmError::Http(format!("request failed: {e}"))
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        if self.is_ollama_endpoint() {
            self.chat_ollama(messages).await
        } else {
            self.chat_openai_compatible(messages).await
        }
    }
}

/// Fake client for tests: scripted responses, recorded calls.
pub struct FakeLlmClient {
    responses: std::sync::Mutex<Vec<Result<String, LlmError>>>,
    calls: std::sync::Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeLlmClient {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A client that answers every call with the same text.
    pub fn always(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Messages received on call `n`, for asserting prompt/history contents.
    pub fn call(&self, n: usize) -> Option<Vec<ChatMessage>> {
        self.calls.lock().unwrap().get(n).cloned()
    }
}

#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());

        let mut responses = self.responses.lock().unwrap();
        match responses.len() {
            0 => Err(LlmError::Empty),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_client_replays_single_response() {
        let client = FakeLlmClient::always("hello");
        let msgs = vec![ChatMessage::new(Role::User, "hi")];

        assert_eq!(client.chat(&msgs).await.unwrap(), "hello");
        assert_eq!(client.chat(&msgs).await.unwrap(), "hello");
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn fake_client_pops_multiple_responses() {
        let client = FakeLlmClient::new(vec![
            Ok("one".to_string()),
            Err(LlmError::Timeout(30)),
        ]);
        let msgs = vec![ChatMessage::new(Role::User, "x")];

        assert_eq!(client.chat(&msgs).await.unwrap(), "one");
        assert!(matches!(client.chat(&msgs).await, Err(LlmError::Timeout(30))));
    }

    #[tokio::test]
    async fn fake_client_records_received_messages() {
        let client = FakeLlmClient::always("ok");
        client
            .chat(&[
                ChatMessage::new(Role::System, "rules"),
                ChatMessage::new(Role::User, "question"),
            ])
            .await
            .unwrap();

        let call = client.call(0).unwrap();
        assert_eq!(call.len(), 2);
        assert_eq!(call[1].content, "question");
    }

    #[test]
    fn chat_message_role_serializes_to_wire_strings() {
        let msg = ChatMessage::new(Role::Assistant, "text");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
