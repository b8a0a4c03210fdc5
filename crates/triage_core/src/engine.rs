//! The triage engine: one request in, exactly one narrative out (or a named
//! no-result outcome, or a fatal error).
//!
//! Control flow, fixed: classify → route → diagnose (always) → if change
//! intent, approval gate → if approved, remediate. Remediation is never
//! invoked without a prior diagnostic call and an affirmative gate decision.
//! Each invocation owns its conversation history; nothing survives the call.

use crate::approval::ApprovalPort;
use crate::category::Category;
use crate::classifier::ClassifierPort;
use crate::error::{ResponderStage, TriageError};
use crate::prompts::APPROVAL_PROMPT;
use crate::request::Request;
use crate::responder::ResponderPort;
use crate::rules::{Action, RouteDecision, RouteOutcome, Router};
use crate::transcript::{ConversationHistory, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Which responder terminated the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageMode {
    Diagnostic,
    Remediation,
}

/// Successful run: the narrative plus the decision trail behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageReport {
    pub case_id: Uuid,
    pub decision: RouteDecision,
    pub mode: TriageMode,
    /// The narrative produced by whichever responder terminated the run.
    pub output_text: String,
    /// Gate decision, if the gate was invoked at all.
    pub approval: Option<bool>,
}

/// Terminal outcome of one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TriageOutcome {
    Completed(TriageReport),
    /// Gated category, no corroborating topic keywords. The reference tree
    /// fell through silently here; this implementation reports it.
    InsufficientEvidence {
        case_id: Uuid,
        category: Category,
    },
}

/// The workflow engine. All collaborators are injected; the engine itself
/// holds no mutable state and can serve any number of sequential requests.
pub struct TriageEngine {
    classifier: Arc<dyn ClassifierPort>,
    diagnostic: Arc<dyn ResponderPort>,
    remediation: Arc<dyn ResponderPort>,
    approval: Arc<dyn ApprovalPort>,
    router: Router,
}

impl TriageEngine {
    pub fn new(
        classifier: Arc<dyn ClassifierPort>,
        diagnostic: Arc<dyn ResponderPort>,
        remediation: Arc<dyn ResponderPort>,
        approval: Arc<dyn ApprovalPort>,
        router: Router,
    ) -> Self {
        Self {
            classifier,
            diagnostic,
            remediation,
            approval,
            router,
        }
    }

    /// Run one request to its terminal outcome.
    pub async fn run(&self, request: &Request) -> Result<TriageOutcome, TriageError> {
        // A valid caller-supplied hint short-circuits the classifier; an
        // invalid hint is ignored, not fatal.
        let category = match request.parsed_hint() {
            Some(hint) => {
                info!(case_id = %request.case_id, category = %hint, "using caller category hint");
                hint
            }
            None => self.classifier.classify(&request.raw_text).await?,
        };

        let decision = match self.router.route(category, &request.normalized_text) {
            RouteOutcome::Selected(decision) => decision,
            RouteOutcome::InsufficientEvidence { category } => {
                info!(case_id = %request.case_id, %category, "insufficient topic evidence");
                return Ok(TriageOutcome::InsufficientEvidence {
                    case_id: request.case_id,
                    category,
                });
            }
        };

        info!(
            case_id = %request.case_id,
            category = %decision.category,
            subtopic = %decision.subtopic,
            action = ?decision.action,
            "route selected"
        );

        let mut history = ConversationHistory::new();
        history.push(Role::User, request.raw_text.clone());

        // Diagnostics always run first, whatever the leaf.
        let diagnostic_text = self.diagnostic.respond(&history).await?;
        if diagnostic_text.trim().is_empty() {
            return Err(TriageError::EmptyResponse {
                stage: ResponderStage::Diagnostic,
            });
        }
        history.push(Role::Assistant, diagnostic_text.clone());

        if decision.action == Action::Diagnose {
            return Ok(TriageOutcome::Completed(TriageReport {
                case_id: request.case_id,
                decision,
                mode: TriageMode::Diagnostic,
                output_text: diagnostic_text,
                approval: None,
            }));
        }

        // Change intent detected: everything past this point is gated.
        let approved = self.approval.request_approval(APPROVAL_PROMPT)?;
        if !approved {
            info!(case_id = %request.case_id, "remediation declined at the gate");
            return Ok(TriageOutcome::Completed(TriageReport {
                case_id: request.case_id,
                decision,
                mode: TriageMode::Diagnostic,
                output_text: diagnostic_text,
                approval: Some(false),
            }));
        }

        let remediation_text = self.remediation.respond(&history).await?;
        if remediation_text.trim().is_empty() {
            return Err(TriageError::EmptyResponse {
                stage: ResponderStage::Remediation,
            });
        }
        history.push(Role::Assistant, remediation_text.clone());

        Ok(TriageOutcome::Completed(TriageReport {
            case_id: request.case_id,
            decision,
            mode: TriageMode::Remediation,
            output_text: remediation_text,
            approval: Some(true),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::ScriptedApproval;
    use crate::classifier::FakeClassifier;
    use crate::responder::FakeResponder;

    struct Harness {
        engine: TriageEngine,
        diagnostic: Arc<FakeResponder>,
        remediation: Arc<FakeResponder>,
        approval: Arc<ScriptedApproval>,
    }

    fn harness(category: Category, approve: bool) -> Harness {
        let diagnostic = Arc::new(FakeResponder::saying("diagnostic narrative"));
        let remediation = Arc::new(FakeResponder::saying("remediation narrative"));
        let approval = Arc::new(ScriptedApproval::always(approve));
        let engine = TriageEngine::new(
            Arc::new(FakeClassifier::returning(category)),
            diagnostic.clone(),
            remediation.clone(),
            approval.clone(),
            Router::with_defaults(),
        );
        Harness {
            engine,
            diagnostic,
            remediation,
            approval,
        }
    }

    fn completed(outcome: TriageOutcome) -> TriageReport {
        match outcome {
            TriageOutcome::Completed(report) => report,
            other => panic!("expected completed run, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_category_always_diagnoses_and_never_remediates_ungated() {
        let h = harness(Category::Unknown, true);
        let request = Request::new("something odd is happening");

        let report = completed(h.engine.run(&request).await.unwrap());
        assert_eq!(report.mode, TriageMode::Diagnostic);
        assert_eq!(h.diagnostic.call_count(), 1);
        assert_eq!(h.remediation.call_count(), 0);
        assert_eq!(h.approval.times_asked(), 0);
    }

    #[tokio::test]
    async fn no_change_intent_is_diagnostic_only_regardless_of_category() {
        for category in [
            Category::Networking,
            Category::ServerOs,
            Category::HardwareComponents,
        ] {
            let h = harness(category, true);
            let text = match category {
                Category::Networking => "bgp keeps flapping on the core router",
                Category::HardwareComponents => "idrac reports a psu fault",
                _ => "print spooler will not start",
            };
            let report = completed(h.engine.run(&Request::new(text)).await.unwrap());
            assert_eq!(report.mode, TriageMode::Diagnostic);
            assert!(report.approval.is_none());
            assert_eq!(h.remediation.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn change_intent_plus_approval_reaches_remediation() {
        let h = harness(Category::HardwareComponents, true);
        let request =
            Request::new("iDRAC reports PSU brownout, please go ahead and replace the failed supply");

        let report = completed(h.engine.run(&request).await.unwrap());
        assert_eq!(report.mode, TriageMode::Remediation);
        assert_eq!(report.output_text, "remediation narrative");
        assert_eq!(report.approval, Some(true));
        assert_eq!(report.decision.subtopic, "dell-idrac");
        assert_eq!(h.diagnostic.call_count(), 1);
        assert_eq!(h.remediation.call_count(), 1);
        assert_eq!(h.approval.times_asked(), 1);
    }

    #[tokio::test]
    async fn declined_gate_terminates_with_the_diagnostic_result() {
        let h = harness(Category::Networking, false);
        let request = Request::new("VLAN trunk is down, implement the fix now");

        let report = completed(h.engine.run(&request).await.unwrap());
        assert_eq!(report.mode, TriageMode::Diagnostic);
        assert_eq!(report.output_text, "diagnostic narrative");
        assert_eq!(report.approval, Some(false));
        assert_eq!(h.remediation.call_count(), 0);
    }

    #[tokio::test]
    async fn gate_is_shown_the_fixed_confirmation_message() {
        let h = harness(Category::Networking, true);
        let request = Request::new("vlan trunk flap, go ahead");

        h.engine.run(&request).await.unwrap();
        assert_eq!(h.approval.messages(), vec![APPROVAL_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn gated_category_without_evidence_is_a_named_gap() {
        let h = harness(Category::HardwareComponents, true);
        let request = Request::new("server is broken");

        match h.engine.run(&request).await.unwrap() {
            TriageOutcome::InsufficientEvidence { category, .. } => {
                assert_eq!(category, Category::HardwareComponents);
            }
            other => panic!("expected gap outcome, got {other:?}"),
        }
        // Nothing was called past the gate
        assert_eq!(h.diagnostic.call_count(), 0);
        assert_eq!(h.approval.times_asked(), 0);
    }

    #[tokio::test]
    async fn remediation_sees_the_diagnostic_turn_in_order() {
        let h = harness(Category::Networking, true);
        let request = Request::new("vlan trunk is down, implement the fix now");

        h.engine.run(&request).await.unwrap();

        let seen = h.remediation.history_seen(0).unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, Role::User);
        assert_eq!(seen[0].1, request.raw_text);
        assert_eq!(seen[1].0, Role::Assistant);
        assert_eq!(seen[1].1, "diagnostic narrative");
    }

    #[tokio::test]
    async fn empty_diagnostic_output_is_fatal() {
        let diagnostic = Arc::new(FakeResponder::silent());
        let engine = TriageEngine::new(
            Arc::new(FakeClassifier::returning(Category::Unknown)),
            diagnostic,
            Arc::new(FakeResponder::saying("unused")),
            Arc::new(ScriptedApproval::always(true)),
            Router::with_defaults(),
        );

        let err = engine.run(&Request::new("anything")).await.unwrap_err();
        assert!(matches!(
            err,
            TriageError::EmptyResponse {
                stage: ResponderStage::Diagnostic
            }
        ));
    }

    #[tokio::test]
    async fn empty_remediation_output_is_fatal() {
        let engine = TriageEngine::new(
            Arc::new(FakeClassifier::returning(Category::ServerOs)),
            Arc::new(FakeResponder::saying("diag")),
            Arc::new(FakeResponder::silent()),
            Arc::new(ScriptedApproval::always(true)),
            Router::with_defaults(),
        );

        let err = engine
            .run(&Request::new("restart the service, go ahead"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TriageError::EmptyResponse {
                stage: ResponderStage::Remediation
            }
        ));
    }

    #[tokio::test]
    async fn classifier_failure_aborts_the_request() {
        let engine = TriageEngine::new(
            Arc::new(FakeClassifier::failing("no usable label")),
            Arc::new(FakeResponder::saying("diag")),
            Arc::new(FakeResponder::saying("rem")),
            Arc::new(ScriptedApproval::always(true)),
            Router::with_defaults(),
        );

        let err = engine.run(&Request::new("anything")).await.unwrap_err();
        assert!(matches!(err, TriageError::Classification(_)));
    }

    #[tokio::test]
    async fn valid_hint_skips_the_classifier() {
        // A failing classifier proves the hint path never touches it.
        let engine = TriageEngine::new(
            Arc::new(FakeClassifier::failing("should not be called")),
            Arc::new(FakeResponder::saying("diag")),
            Arc::new(FakeResponder::saying("rem")),
            Arc::new(ScriptedApproval::always(true)),
            Router::with_defaults(),
        );

        let request = Request::new("print spooler hangs").with_category_hint("ServerOS");
        let report = completed(engine.run(&request).await.unwrap());
        assert_eq!(report.decision.category, Category::ServerOs);
    }

    #[tokio::test]
    async fn invalid_hint_falls_back_to_the_classifier() {
        let engine = TriageEngine::new(
            Arc::new(FakeClassifier::returning(Category::Unknown)),
            Arc::new(FakeResponder::saying("diag")),
            Arc::new(FakeResponder::saying("rem")),
            Arc::new(ScriptedApproval::always(true)),
            Router::with_defaults(),
        );

        let request = Request::new("weird issue").with_category_hint("NotACategory");
        let report = completed(engine.run(&request).await.unwrap());
        assert_eq!(report.decision.category, Category::Unknown);
    }
}
