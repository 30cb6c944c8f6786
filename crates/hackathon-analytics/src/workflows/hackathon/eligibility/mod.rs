mod policy;
mod rules;

pub use policy::{EligibilityDecision, EligibleReason, IneligibleReason};

use chrono::{DateTime, Utc};

use super::domain::{CandidateProfile, EligibilityRule, Event};

/// Stateless evaluator deciding whether a candidate may join an event
/// without a join code.
pub struct EligibilityEvaluator;

impl EligibilityEvaluator {
    /// Steps are applied in priority order and the first applicable one wins:
    /// existing participant, open event, code-only gate, then any matching rule.
    pub fn evaluate(
        profile: &CandidateProfile,
        rules: &[EligibilityRule],
        already_participant: bool,
    ) -> EligibilityDecision {
        if already_participant {
            return EligibilityDecision::Eligible(EligibleReason::ExistingParticipant);
        }

        if rules.is_empty() {
            return EligibilityDecision::Eligible(EligibleReason::OpenEvent);
        }

        if rules::requires_join_code(rules) {
            return EligibilityDecision::Ineligible(IneligibleReason::JoinCodeRequired);
        }

        match rules::first_match(profile, rules) {
            Some(kind) => EligibilityDecision::Eligible(EligibleReason::RuleMatched(kind)),
            None => EligibilityDecision::Ineligible(IneligibleReason::NoRuleMatched),
        }
    }

    /// Past participants keep access after the event ends; everyone else is
    /// turned away once it has ended.
    pub fn can_view(
        profile: &CandidateProfile,
        event: &Event,
        already_participant: bool,
        now: DateTime<Utc>,
    ) -> EligibilityDecision {
        if already_participant {
            return EligibilityDecision::Eligible(EligibleReason::ExistingParticipant);
        }

        if event.has_ended(now) {
            return EligibilityDecision::Ineligible(IneligibleReason::EventEnded);
        }

        Self::evaluate(profile, &event.eligibility_criteria, false)
    }
}
