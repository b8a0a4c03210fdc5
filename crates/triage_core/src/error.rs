//! Error types for the triage workflow.
//!
//! Every variant is terminal for the current request: there is no retry and
//! no partial-result recovery. A declined approval is NOT an error (it is a
//! diagnostics-only outcome), and a failed topic gate is a named outcome on
//! `TriageOutcome`, not a variant here.

use crate::llm::LlmError;
use thiserror::Error;

/// Stage of the workflow that produced a responder failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderStage {
    Diagnostic,
    Remediation,
}

impl std::fmt::Display for ResponderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Diagnostic => write!(f, "diagnostic"),
            Self::Remediation => write!(f, "remediation"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TriageError {
    /// Classifier returned empty, malformed, or out-of-enumeration output.
    #[error("classification failed: {0}")]
    Classification(String),

    /// A responder yielded no content. Fatal, no fallback narrative.
    #[error("{stage} responder returned empty output")]
    EmptyResponse { stage: ResponderStage },

    /// Transport-level failure talking to an LLM backend.
    #[error("LLM backend error: {0}")]
    Llm(#[from] LlmError),

    /// Approval gate could not collect a decision (e.g. stdin closed).
    #[error("approval gate failed: {0}")]
    Approval(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
