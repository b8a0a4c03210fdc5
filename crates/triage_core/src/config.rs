//! Workflow configuration.
//!
//! Loaded once from TOML at startup; immutable afterwards. Every field has a
//! default so an absent file (or an empty one) yields a working local-Ollama
//! setup.

use crate::error::TriageError;
use crate::keywords::{KeywordSet, MatchMode, Vocabulary};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// LLM backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL, e.g. "http://127.0.0.1:11434" (Ollama) or an
    /// OpenAI-compatible endpoint root.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key, if the backend
    /// needs one. The key itself never lives in the config file.
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Defensive per-call timeout. Not part of the routing contract.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    3000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Keyword matching settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub mode: MatchMode,
}

/// Optional replacements for the built-in keyword vocabularies. A present
/// list replaces the corresponding built-in set wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordOverrides {
    #[serde(default)]
    pub networking: Option<Vec<String>>,
    #[serde(default)]
    pub hardware: Option<Vec<String>>,
    #[serde(default)]
    pub script: Option<Vec<String>>,
    #[serde(default)]
    pub change_intent: Option<Vec<String>>,
}

/// Conversation history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Non-system turns carried into prompts (valid: 2-64).
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

fn default_max_turns() -> usize {
    12
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
        }
    }
}

impl HistoryConfig {
    /// Clamped to the valid range (2-64).
    pub fn effective_max_turns(&self) -> usize {
        self.max_turns.clamp(2, 64)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub keywords: KeywordOverrides,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl TriageConfig {
    /// Load from a TOML file. A missing file yields defaults; a present but
    /// unparseable file is an error.
    pub fn load(path: &Path) -> Result<Self, TriageError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| TriageError::Config(format!("{}: {e}", path.display())))
    }

    /// Build the keyword vocabulary with any configured overrides applied.
    pub fn vocabulary(&self) -> Vocabulary {
        let mut vocab = Vocabulary::builtin();
        if let Some(list) = &self.keywords.networking {
            vocab.networking_topic = KeywordSet::new("networking-topic", list);
        }
        if let Some(list) = &self.keywords.hardware {
            vocab.hardware_topic = KeywordSet::new("hardware-topic", list);
        }
        if let Some(list) = &self.keywords.script {
            vocab.script_topic = KeywordSet::new("script-topic", list);
        }
        if let Some(list) = &self.keywords.change_intent {
            vocab.change_intent = KeywordSet::new("change-intent", list);
        }
        vocab
    }
}
