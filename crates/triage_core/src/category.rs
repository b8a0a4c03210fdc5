//! Support-request categories.
//!
//! Exactly five values, matching the classifier's output contract verbatim.
//! Parsing is strict: anything outside the enumeration is rejected so a
//! misbehaving classifier surfaces as an error instead of a silent default.

use serde::{Deserialize, Serialize};

/// The five triage categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Networking,
    #[serde(rename = "ServerOS")]
    ServerOs,
    ScriptAutomation,
    HardwareComponents,
    Unknown,
}

impl Category {
    /// Wire label as produced by the classifier collaborator.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Networking => "Networking",
            Self::ServerOs => "ServerOS",
            Self::ScriptAutomation => "ScriptAutomation",
            Self::HardwareComponents => "HardwareComponents",
            Self::Unknown => "Unknown",
        }
    }

    /// Strict parse of a classifier label. Returns None for anything that is
    /// not one of the five labels (after trimming).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Networking" => Some(Self::Networking),
            "ServerOS" => Some(Self::ServerOs),
            "ScriptAutomation" => Some(Self::ScriptAutomation),
            "HardwareComponents" => Some(Self::HardwareComponents),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// All categories in routing order.
    pub fn all() -> &'static [Category] {
        &[
            Self::Networking,
            Self::ServerOs,
            Self::ScriptAutomation,
            Self::HardwareComponents,
            Self::Unknown,
        ]
    }

    /// Whether this category requires topic-keyword corroboration before the
    /// router will act on it. ServerOS and Unknown pass ungated.
    pub fn is_gated(&self) -> bool {
        matches!(
            self,
            Self::Networking | Self::ScriptAutomation | Self::HardwareComponents
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}
