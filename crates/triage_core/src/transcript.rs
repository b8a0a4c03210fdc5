//! Conversation history for one workflow invocation.
//!
//! Append-only and strictly ordered. Owned by the engine for the duration of
//! a single request and discarded afterwards — there is no cross-request
//! persistence by contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message exchanged with a text-generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// Ordered, append-only sequence of turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn::new(role, content));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The turns a prompt should carry: every system turn plus the most
    /// recent `max_turns` non-system turns, original order preserved.
    pub fn windowed(&self, max_turns: usize) -> Vec<&Turn> {
        let non_system = self.turns.iter().filter(|t| t.role != Role::System).count();
        let skip = non_system.saturating_sub(max_turns);
        let mut skipped = 0;
        self.turns
            .iter()
            .filter(|t| {
                if t.role == Role::System {
                    true
                } else if skipped < skip {
                    skipped += 1;
                    false
                } else {
                    true
                }
            })
            .collect()
    }
}
