//! Diagnostic and remediation responder ports.
//!
//! Both responders are the same kind of collaborator — a stateless
//! request/response text generator fed the accumulated conversation — and
//! differ only in the system prompt they carry.

use crate::error::TriageError;
use crate::llm::{ChatMessage, LlmClient};
use crate::prompts;
use crate::transcript::{ConversationHistory, Role};
use async_trait::async_trait;
use std::sync::Arc;

/// Stateless narrative generator over the conversation so far.
#[async_trait]
pub trait ResponderPort: Send + Sync {
    async fn respond(&self, history: &ConversationHistory) -> Result<String, TriageError>;
}

/// LLM-backed responder: fixed system prompt + windowed history.
pub struct LlmResponder {
    client: Arc<dyn LlmClient>,
    system_prompt: String,
    max_turns: usize,
}

impl LlmResponder {
    pub fn diagnostic(client: Arc<dyn LlmClient>, max_turns: usize) -> Self {
        Self {
            client,
            system_prompt: prompts::diagnostic_prompt(),
            max_turns,
        }
    }

    pub fn remediation(client: Arc<dyn LlmClient>, max_turns: usize) -> Self {
        Self {
            client,
            system_prompt: prompts::remediation_prompt(),
            max_turns,
        }
    }
}

#[async_trait]
impl ResponderPort for LlmResponder {
    async fn respond(&self, history: &ConversationHistory) -> Result<String, TriageError> {
        let mut messages = vec![ChatMessage::new(Role::System, self.system_prompt.clone())];
        for turn in history.windowed(self.max_turns) {
            messages.push(ChatMessage::new(turn.role, turn.content.clone()));
        }

        Ok(self.client.chat(&messages).await?)
    }
}

/// Test double: fixed narrative, records each history it was handed.
pub struct FakeResponder {
    narrative: String,
    seen: std::sync::Mutex<Vec<Vec<(Role, String)>>>,
}

impl FakeResponder {
    pub fn saying(narrative: &str) -> Self {
        Self {
            narrative: narrative.to_string(),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A responder that violates the non-empty contract.
    pub fn silent() -> Self {
        Self::saying("")
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// The (role, content) pairs of the history received on call `n`.
    pub fn history_seen(&self, n: usize) -> Option<Vec<(Role, String)>> {
        self.seen.lock().unwrap().get(n).cloned()
    }
}

#[async_trait]
impl ResponderPort for FakeResponder {
    async fn respond(&self, history: &ConversationHistory) -> Result<String, TriageError> {
        let turns = history
            .turns()
            .iter()
            .map(|t| (t.role, t.content.clone()))
            .collect();
        self.seen.lock().unwrap().push(turns);
        Ok(self.narrative.clone())
    }
}
