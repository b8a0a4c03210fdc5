//! Keyword sets and the substring matcher.
//!
//! Matching is deliberately crude: pure substring search over pre-lowercased
//! text, no tokenization and no word boundaries. That means "raid" matches
//! inside "upgraded" — a known false-positive source, preserved because the
//! routing contract depends on it. `MatchMode::WordBoundary` exists as an
//! opt-in correction strategy but is not the default anywhere.

use crate::category::Category;
use serde::{Deserialize, Serialize};

/// How keyword literals are matched against normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Plain substring search (the reference behavior).
    #[default]
    Substring,
    /// Require non-alphanumeric (or edge) on both sides of the hit.
    WordBoundary,
}

/// A named, immutable set of lowercase keyword literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSet {
    pub name: String,
    literals: Vec<String>,
}

impl KeywordSet {
    /// Literals are lowercased on construction so the set upholds the
    /// "stored lowercase" invariant no matter what the caller passes.
    pub fn new<S: AsRef<str>>(name: impl Into<String>, literals: &[S]) -> Self {
        Self {
            name: name.into(),
            literals: literals
                .iter()
                .map(|l| l.as_ref().trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    /// True iff at least one literal occurs in `text` under `mode`.
    /// `text` is expected pre-normalized (lowercase, trimmed).
    pub fn matches(&self, text: &str, mode: MatchMode) -> bool {
        self.literals.iter().any(|kw| hit(text, kw, mode))
    }

    /// The literals that occur in `text`, in set order. Used for evidence
    /// trails in logs and CLI output.
    pub fn matched<'a>(&'a self, text: &str, mode: MatchMode) -> Vec<&'a str> {
        self.literals
            .iter()
            .filter(|kw| hit(text, kw, mode))
            .map(|s| s.as_str())
            .collect()
    }
}

fn hit(text: &str, keyword: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Substring => text.contains(keyword),
        MatchMode::WordBoundary => {
            let mut start = 0;
            while let Some(pos) = text[start..].find(keyword) {
                let at = start + pos;
                let end = at + keyword.len();
                let left_ok = at == 0
                    || !text[..at].chars().next_back().is_some_and(|c| c.is_alphanumeric());
                let right_ok = end == text.len()
                    || !text[end..].chars().next().is_some_and(|c| c.is_alphanumeric());
                if left_ok && right_ok {
                    return true;
                }
                start = end;
            }
            false
        }
    }
}

/// A vendor/error-family keyword set used for second-level dispatch. The
/// selected family is recorded in the decision but never changes the action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtopic {
    pub name: String,
    pub keywords: KeywordSet,
}

impl Subtopic {
    fn new<S: AsRef<str>>(name: &str, literals: &[S]) -> Self {
        Self {
            name: name.to_string(),
            keywords: KeywordSet::new(name, literals),
        }
    }
}

/// The full keyword vocabulary: topic gates, subtopic families, and the
/// change-intent indicators. Built once at startup and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    pub networking_topic: KeywordSet,
    pub hardware_topic: KeywordSet,
    pub script_topic: KeywordSet,
    pub change_intent: KeywordSet,
    pub networking_subtopics: Vec<Subtopic>,
    pub hardware_subtopics: Vec<Subtopic>,
}

impl Vocabulary {
    /// The built-in vocabulary.
    pub fn builtin() -> Self {
        Self {
            networking_topic: KeywordSet::new(
                "networking-topic",
                &[
                    "vlan",
                    "trunk",
                    "etherchannel",
                    "lacp",
                    "stp",
                    "spanning-tree",
                    "bgp",
                    "ospf",
                    "eigrp",
                    "hsrp",
                    "vrf",
                    "mtu",
                    "crc",
                    "drops",
                    "flap",
                ],
            ),
            hardware_topic: KeywordSet::new(
                "hardware-topic",
                &[
                    "idrac",
                    "ilo",
                    "ipmi",
                    "bmc",
                    "raid",
                    "psu",
                    "power supply",
                    "dimm",
                    "ecc",
                    "thermal",
                    "fan",
                    "firmware",
                    "backplane",
                    "chassis",
                ],
            ),
            script_topic: KeywordSet::new(
                "script-topic",
                &[
                    "ansible",
                    "terraform",
                    "playbook",
                    "powershell",
                    "python",
                    "bash",
                    "yaml",
                    "pipeline",
                    "cron",
                    "fatal:",
                    "traceback",
                    "unreachable=",
                    "syntax error",
                ],
            ),
            change_intent: KeywordSet::new(
                "change-intent",
                &[
                    "apply",
                    "proceed",
                    "go ahead",
                    "make the change",
                    "implement",
                    "do it",
                    "run the fix",
                ],
            ),
            networking_subtopics: vec![
                Subtopic::new(
                    "layer2",
                    &["vlan", "trunk", "stp", "spanning-tree", "etherchannel", "lacp"],
                ),
                Subtopic::new("routing-protocol", &["bgp", "ospf", "eigrp", "hsrp", "vrf"]),
                Subtopic::new("interface-health", &["crc", "drops", "flap", "mtu"]),
            ],
            hardware_subtopics: vec![
                Subtopic::new("dell-idrac", &["idrac", "dell", "poweredge", "perc"]),
                Subtopic::new("hpe-ilo", &["ilo", "hpe", "proliant", "smart array"]),
                Subtopic::new("ipmi-bmc", &["ipmi", "bmc", "redfish"]),
            ],
        }
    }

    /// Topic keyword gate for a category, if the category is gated.
    pub fn topic_set_for(&self, category: Category) -> Option<&KeywordSet> {
        match category {
            Category::Networking => Some(&self.networking_topic),
            Category::HardwareComponents => Some(&self.hardware_topic),
            Category::ScriptAutomation => Some(&self.script_topic),
            Category::ServerOs | Category::Unknown => None,
        }
    }

    /// Subtopic families tested, in priority order, once the gate passes.
    /// ScriptAutomation is wired through the hardware families — that
    /// cross-wiring exists in the reference decision tree and is preserved
    /// (it never changes the action either way).
    pub fn subtopics_for(&self, category: Category) -> &[Subtopic] {
        match category {
            Category::Networking => &self.networking_subtopics,
            Category::HardwareComponents | Category::ScriptAutomation => &self.hardware_subtopics,
            Category::ServerOs | Category::Unknown => &[],
        }
    }
}
