//! Approval gate port.
//!
//! The gate is the only checkpoint between diagnostics and remediation. It is
//! synchronous from the router's perspective: the engine blocks on the answer
//! and never retries it.

use crate::error::TriageError;
use std::io::{BufRead, Write};
use tracing::info;

/// Yes/no checkpoint invoked before any change-making content is produced.
pub trait ApprovalPort: Send + Sync {
    /// Present `message` and collect a decision. `Ok(false)` is a valid
    /// terminal outcome (diagnostics-only), not an error.
    fn request_approval(&self, message: &str) -> Result<bool, TriageError>;
}

/// Reference stub that approves everything.
///
/// This is a placeholder, not a policy: the decision tree was shipped with
/// approval hard-wired to yes. Hosts that want real gating inject their own
/// `ApprovalPort`.
pub struct AutoApprove;

impl ApprovalPort for AutoApprove {
    fn request_approval(&self, message: &str) -> Result<bool, TriageError> {
        info!(message, "auto-approving remediation (stub gate)");
        Ok(true)
    }
}

/// Interactive y/n prompt on the controlling terminal.
pub struct InteractiveApproval;

impl ApprovalPort for InteractiveApproval {
    fn request_approval(&self, message: &str) -> Result<bool, TriageError> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        write!(out, "\n{message}\nProceed? [y/N] ")
            .and_then(|_| out.flush())
            .map_err(|e| TriageError::Approval(format!("prompt write failed: {e}")))?;

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| TriageError::Approval(format!("failed to read decision: {e}")))?;

        let answer = line.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}

/// Test double with preloaded answers. Records the messages it was shown.
pub struct ScriptedApproval {
    answers: std::sync::Mutex<Vec<bool>>,
    messages: std::sync::Mutex<Vec<String>>,
}

impl ScriptedApproval {
    pub fn new(answers: Vec<bool>) -> Self {
        Self {
            answers: std::sync::Mutex::new(answers),
            messages: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn always(answer: bool) -> Self {
        Self::new(vec![answer])
    }

    pub fn times_asked(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ApprovalPort for ScriptedApproval {
    fn request_approval(&self, message: &str) -> Result<bool, TriageError> {
        self.messages.lock().unwrap().push(message.to_string());

        let mut answers = self.answers.lock().unwrap();
        match answers.len() {
            0 => Ok(false),
            1 => Ok(answers[0]),
            _ => Ok(answers.remove(0)),
        }
    }
}
