//! Decision tree router, flattened into a rule table.
//!
//! The reference decision tree is thousands of near-identical branches; every
//! leaf performs the same two steps. What actually varies is captured here:
//! whether the category needs topic corroboration, which subtopic family the
//! evidence points at, and whether the user signalled change intent. One
//! evaluator walks that table in a single pass with no backtracking.
//!
//! Subtopic selection is recorded for observability only — it never changes
//! the selected action. That property is load-bearing and tested below.

use crate::category::Category;
use crate::keywords::{MatchMode, Vocabulary};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Subtopic family name used when no family matched.
pub const GENERIC_SUBTOPIC: &str = "generic";

/// The two terminal actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Diagnostics only.
    Diagnose,
    /// Diagnostics first, then remediation behind the approval gate.
    DiagnoseThenGateRemediate,
}

/// A fully resolved routing decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDecision {
    pub category: Category,
    /// Topic keywords that corroborated the category. Empty for the ungated
    /// ServerOS and Unknown paths.
    pub topic_evidence: Vec<String>,
    /// Vendor/error-family name, or "generic". Informational only.
    pub subtopic: String,
    /// Change-intent keywords found in the normalized text.
    pub change_intent_evidence: Vec<String>,
    pub action: Action,
}

/// Result of routing one classified request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RouteOutcome {
    Selected(RouteDecision),
    /// A gated category whose topic keywords did not corroborate the
    /// classification. The reference tree silently produced nothing here;
    /// this implementation names the gap instead.
    InsufficientEvidence { category: Category },
}

/// Table-driven router. Holds the immutable vocabulary and matching mode.
pub struct Router {
    vocab: Vocabulary,
    mode: MatchMode,
}

impl Router {
    pub fn new(vocab: Vocabulary, mode: MatchMode) -> Self {
        Self { vocab, mode }
    }

    pub fn with_defaults() -> Self {
        Self::new(Vocabulary::builtin(), MatchMode::Substring)
    }

    /// Walk the table: topic gate, subtopic dispatch, action selection.
    /// `text` must be pre-normalized (lowercase, trimmed).
    pub fn route(&self, category: Category, text: &str) -> RouteOutcome {
        let topic_evidence = match self.vocab.topic_set_for(category) {
            Some(set) => {
                let hits = set.matched(text, self.mode);
                if hits.is_empty() {
                    debug!(%category, "topic gate failed, no corroborating keywords");
                    return RouteOutcome::InsufficientEvidence { category };
                }
                hits.into_iter().map(String::from).collect()
            }
            None => Vec::new(),
        };

        // First matching family wins; order is fixed by the vocabulary.
        let subtopic = self
            .vocab
            .subtopics_for(category)
            .iter()
            .find(|s| s.keywords.matches(text, self.mode))
            .map(|s| s.name.clone())
            .unwrap_or_else(|| GENERIC_SUBTOPIC.to_string());

        let change_intent_evidence: Vec<String> = self
            .vocab
            .change_intent
            .matched(text, self.mode)
            .into_iter()
            .map(String::from)
            .collect();

        let action = if change_intent_evidence.is_empty() {
            Action::Diagnose
        } else {
            Action::DiagnoseThenGateRemediate
        };

        debug!(%category, %subtopic, ?action, "route selected");
        RouteOutcome::Selected(RouteDecision {
            category,
            topic_evidence,
            subtopic,
            change_intent_evidence,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(category: Category, text: &str) -> RouteDecision {
        match Router::with_defaults().route(category, text) {
            RouteOutcome::Selected(d) => d,
            RouteOutcome::InsufficientEvidence { category } => {
                panic!("unexpected gate failure for {category}")
            }
        }
    }

    #[test]
    fn gated_category_without_topic_keywords_yields_insufficient_evidence() {
        let router = Router::with_defaults();
        for category in [
            Category::Networking,
            Category::HardwareComponents,
            Category::ScriptAutomation,
        ] {
            let outcome = router.route(category, "the server is broken");
            assert!(
                matches!(outcome, RouteOutcome::InsufficientEvidence { category: c } if c == category),
                "expected gap outcome for {category}"
            );
        }
    }

    #[test]
    fn server_os_and_unknown_pass_ungated() {
        for category in [Category::ServerOs, Category::Unknown] {
            let d = decision(category, "the spooler service will not start");
            assert!(d.topic_evidence.is_empty());
            assert_eq!(d.action, Action::Diagnose);
        }
    }

    #[test]
    fn topic_evidence_is_recorded() {
        let d = decision(Category::Networking, "bgp keeps flapping, drops every hour");
        assert!(d.topic_evidence.contains(&"bgp".to_string()));
        assert!(d.topic_evidence.contains(&"flap".to_string()));
        assert!(d.topic_evidence.contains(&"drops".to_string()));
    }

    #[test]
    fn subtopic_dispatch_is_first_match_in_priority_order() {
        let d = decision(
            Category::HardwareComponents,
            "idrac reports psu brownout on the ipmi bus",
        );
        // dell-idrac is tested before ipmi-bmc
        assert_eq!(d.subtopic, "dell-idrac");

        let d = decision(Category::HardwareComponents, "psu brownout");
        assert_eq!(d.subtopic, GENERIC_SUBTOPIC);
    }

    #[test]
    fn subtopic_never_changes_the_action() {
        // Same shape of request, differing only in which vendor family the
        // evidence points at. The action must be identical across all of them.
        let variants = [
            "idrac reports a failed psu",
            "ilo reports a failed psu",
            "ipmi reports a failed psu",
            "chassis reports a failed psu",
        ];
        let actions: Vec<Action> = variants
            .iter()
            .map(|t| decision(Category::HardwareComponents, t).action)
            .collect();
        assert!(actions.iter().all(|a| *a == Action::Diagnose));

        let actions: Vec<Action> = variants
            .iter()
            .map(|t| {
                let text = format!("{t}, go ahead and replace it");
                decision(Category::HardwareComponents, &text).action
            })
            .collect();
        assert!(actions
            .iter()
            .all(|a| *a == Action::DiagnoseThenGateRemediate));
    }

    #[test]
    fn change_intent_selects_the_gated_action() {
        let d = decision(Category::Networking, "vlan trunk is down, implement the fix now");
        assert_eq!(d.action, Action::DiagnoseThenGateRemediate);
        assert!(d
            .change_intent_evidence
            .contains(&"implement".to_string()));

        let d = decision(Category::Networking, "vlan trunk is down, what do you suggest?");
        assert_eq!(d.action, Action::Diagnose);
        assert!(d.change_intent_evidence.is_empty());
    }

    #[test]
    fn script_automation_cross_wires_into_hardware_families() {
        let d = decision(
            Category::ScriptAutomation,
            "ansible playbook against the idrac fails with fatal: unreachable=1",
        );
        assert_eq!(d.subtopic, "dell-idrac");
        // Still informational only
        assert_eq!(d.action, Action::Diagnose);
    }

    #[test]
    fn substring_semantics_reach_the_gate() {
        // "raid" inside "upgraded" corroborates HardwareComponents. Crude,
        // documented, preserved.
        let d = decision(Category::HardwareComponents, "we upgraded the bios last night");
        assert_eq!(d.topic_evidence, vec!["raid".to_string()]);
    }
}
