//! The unit of work: one free-text support request.

use crate::category::Category;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single incoming support request. Constructed once at workflow entry and
/// read-only afterwards; normalization happens exactly once here so every
/// keyword check downstream sees the same text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Correlation id for logs and transcripts.
    pub case_id: Uuid,
    /// Original user-submitted text, untouched.
    pub raw_text: String,
    /// Lowercased, trimmed derivative of `raw_text`. All keyword matching
    /// runs against this field.
    pub normalized_text: String,
    /// Optional caller-supplied category preset. An unparseable hint is
    /// ignored at classification time, not rejected.
    pub category_hint: Option<String>,
}

impl Request {
    pub fn new(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let normalized_text = normalize(&raw_text);
        Self {
            case_id: Uuid::new_v4(),
            raw_text,
            normalized_text,
            category_hint: None,
        }
    }

    pub fn with_category_hint(mut self, hint: impl Into<String>) -> Self {
        self.category_hint = Some(hint.into());
        self
    }

    /// The hint, parsed against the strict category enumeration. `None` both
    /// when no hint was supplied and when the hint is not a valid label.
    pub fn parsed_hint(&self) -> Option<Category> {
        self.category_hint
            .as_deref()
            .and_then(Category::from_label)
    }
}

/// Lowercase + trim, nothing else. Matches the matching contract: substring
/// checks, no tokenization.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
