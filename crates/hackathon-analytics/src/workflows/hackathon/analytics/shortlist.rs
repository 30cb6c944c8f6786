use serde::{Deserialize, Serialize};

use super::super::criteria::{CriteriaMatcher, DemographicFilter};
use super::super::domain::{ParameterId, SubmissionWithProfile};

/// Minimum score for one parameter, located by id first and then by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParameterScoreRequirement {
    #[serde(default)]
    pub parameter_id: Option<ParameterId>,
    #[serde(default)]
    pub parameter_name: Option<String>,
    pub min_score: f64,
}

/// Conjunction of optional conditions. Unset conditions always pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ShortlistCriteria {
    pub min_total_score: Option<f64>,
    pub parameter_scores: Vec<ParameterScoreRequirement>,
    pub demographics: Option<DemographicFilter>,
}

impl ShortlistCriteria {
    pub fn accepts(&self, entry: &SubmissionWithProfile) -> bool {
        if let Some(minimum) = self.min_total_score {
            if entry.total_score() < minimum {
                return false;
            }
        }

        let parameters_pass = self.parameter_scores.iter().all(|requirement| {
            entry
                .submission
                .evaluation_for(
                    requirement.parameter_id.as_ref(),
                    requirement.parameter_name.as_deref(),
                )
                .map(|evaluation| evaluation.score >= requirement.min_score)
                .unwrap_or(false)
        });
        if !parameters_pass {
            return false;
        }

        match &self.demographics {
            Some(filter) => CriteriaMatcher::matches(entry.candidate.as_ref(), filter),
            None => true,
        }
    }
}

/// Submissions passing every criterion, in input order.
pub fn select_shortlist<'a>(
    submissions: &'a [SubmissionWithProfile],
    criteria: &ShortlistCriteria,
) -> Vec<&'a SubmissionWithProfile> {
    submissions
        .iter()
        .filter(|entry| criteria.accepts(entry))
        .collect()
}
