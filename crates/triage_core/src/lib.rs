//! Triage Desk core library.
//!
//! Implements a single IT-support triage workflow: classify a free-text
//! request into one of five categories, corroborate the classification with
//! keyword evidence, walk a table-driven decision procedure, and produce a
//! diagnostic narrative — with a remediation narrative available only behind
//! an explicit approval gate.
//!
//! The collaborators (classifier, responders, approval gate) are ports;
//! `TriageEngine` only sequences them.

pub mod approval;
pub mod category;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod keywords;
pub mod llm;
pub mod prompts;
pub mod request;
pub mod responder;
pub mod rules;
pub mod transcript;

pub use approval::{ApprovalPort, AutoApprove, InteractiveApproval};
pub use category::Category;
pub use classifier::{ClassifierPort, LlmClassifier};
pub use config::TriageConfig;
pub use engine::{TriageEngine, TriageMode, TriageOutcome, TriageReport};
pub use error::TriageError;
pub use keywords::{KeywordSet, MatchMode, Vocabulary};
pub use llm::{HttpLlmClient, LlmClient};
pub use request::Request;
pub use responder::{LlmResponder, ResponderPort};
pub use rules::{Action, RouteDecision, RouteOutcome, Router};
pub use transcript::{ConversationHistory, Role};
