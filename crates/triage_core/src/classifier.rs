//! Category classifier port.
//!
//! The classifier is an external collaborator with a strict output contract:
//! exactly one of the five category labels, verbatim. Anything else is fatal
//! for the request — no silent default category.

use crate::category::Category;
use crate::error::TriageError;
use crate::llm::{ChatMessage, LlmClient};
use crate::transcript::Role;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Maps a raw request string to exactly one category.
#[async_trait]
pub trait ClassifierPort: Send + Sync {
    async fn classify(&self, raw_text: &str) -> Result<Category, TriageError>;
}

const CLASSIFIER_SYSTEM_PROMPT: &str = "\
You are a triage classifier for an IT support desk. Classify the user's request
into exactly one of these categories:

- Networking: switching, routing, VLANs, links, protocols
- ServerOS: operating systems, services, logs, performance
- ScriptAutomation: scripts, playbooks, pipelines, config management
- HardwareComponents: physical servers, management controllers, disks, power
- Unknown: anything that fits none of the above

Respond with a JSON object of the form {\"category\": \"<label>\"} and nothing
else. The label must be one of: Networking, ServerOS, ScriptAutomation,
HardwareComponents, Unknown.";

/// LLM-backed classifier.
pub struct LlmClassifier {
    client: Arc<dyn LlmClient>,
}

impl LlmClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClassifierPort for LlmClassifier {
    async fn classify(&self, raw_text: &str) -> Result<Category, TriageError> {
        let messages = vec![
            ChatMessage::new(Role::System, CLASSIFIER_SYSTEM_PROMPT),
            ChatMessage::new(Role::User, raw_text),
        ];

        let output = self.client.chat(&messages).await?;
        let category = parse_label(&output)
            .ok_or_else(|| TriageError::Classification(format!("unusable label: {output:?}")))?;

        debug!(category = %category, "request classified");
        Ok(category)
    }
}

/// Accepts the strict JSON shape, or a bare verbatim label as a concession to
/// models that skip the JSON wrapper. Never maps unknown text to a category.
fn parse_label(output: &str) -> Option<Category> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return value
            .get("category")
            .and_then(|c| c.as_str())
            .and_then(Category::from_label);
    }

    Category::from_label(trimmed)
}

/// Test double returning a fixed category (or a scripted error).
pub struct FakeClassifier {
    result: Result<Category, String>,
}

impl FakeClassifier {
    pub fn returning(category: Category) -> Self {
        Self {
            result: Ok(category),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
        }
    }
}

#[async_trait]
impl ClassifierPort for FakeClassifier {
    async fn classify(&self, _raw_text: &str) -> Result<Category, TriageError> {
        self.result
            .clone()
            .map_err(TriageError::Classification)
    }
}
