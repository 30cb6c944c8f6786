use serde::{Deserialize, Serialize};

use super::super::domain::RuleKind;

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum EligibilityDecision {
    Eligible(EligibleReason),
    Ineligible(IneligibleReason),
}

impl EligibilityDecision {
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityDecision::Eligible(_))
    }

    pub fn summary(&self) -> String {
        match self {
            EligibilityDecision::Eligible(reason) => reason.summary(),
            EligibilityDecision::Ineligible(reason) => reason.summary(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rule", rename_all = "snake_case")]
pub enum EligibleReason {
    ExistingParticipant,
    OpenEvent,
    RuleMatched(RuleKind),
}

impl EligibleReason {
    pub fn summary(&self) -> String {
        match self {
            EligibleReason::ExistingParticipant => "eligible as an existing participant".to_string(),
            EligibleReason::OpenEvent => "eligible: event is open to everyone".to_string(),
            EligibleReason::RuleMatched(kind) => format!("eligible by {} rule", kind.label()),
        }
    }
}

/// Reasons a candidate may not join or view an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    JoinCodeRequired,
    NoRuleMatched,
    EventEnded,
}

impl IneligibleReason {
    pub fn summary(&self) -> String {
        match self {
            IneligibleReason::JoinCodeRequired => {
                "not eligible: this event can only be joined with its code".to_string()
            }
            IneligibleReason::NoRuleMatched => {
                "not eligible: no eligibility criteria matched".to_string()
            }
            IneligibleReason::EventEnded => "not eligible: the event has ended".to_string(),
        }
    }
}
