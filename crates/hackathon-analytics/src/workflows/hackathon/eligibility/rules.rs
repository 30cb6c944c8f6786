use super::super::domain::{CandidateProfile, EligibilityRule, RuleKind};

/// First rule satisfied by the profile. Rules with empty value lists never
/// match, and `CodeOnly` is never matched here.
pub(crate) fn first_match(
    profile: &CandidateProfile,
    rules: &[EligibilityRule],
) -> Option<RuleKind> {
    rules
        .iter()
        .find(|rule| rule_matches(profile, rule))
        .map(EligibilityRule::kind)
}

pub(crate) fn requires_join_code(rules: &[EligibilityRule]) -> bool {
    rules
        .iter()
        .any(|rule| matches!(rule, EligibilityRule::CodeOnly))
}

fn rule_matches(profile: &CandidateProfile, rule: &EligibilityRule) -> bool {
    match rule {
        EligibilityRule::Grade { values } => contains(values, profile.grade.as_deref()),
        EligibilityRule::School { values } => contains(values, profile.institution()),
        EligibilityRule::State { values } => contains(values, profile.state.as_deref()),
        EligibilityRule::PhoneNumbers { phone_numbers } => {
            contains(phone_numbers, profile.phone_number.as_deref())
        }
        EligibilityRule::CodeOnly => false,
    }
}

fn contains(values: &[String], candidate: Option<&str>) -> bool {
    match candidate {
        Some(candidate) if !values.is_empty() => values.iter().any(|value| value == candidate),
        _ => false,
    }
}
