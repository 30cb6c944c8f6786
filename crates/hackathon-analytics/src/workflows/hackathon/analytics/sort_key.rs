use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::super::domain::SubmissionWithProfile;
use super::views::LeaderboardGroup;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Closed set of sortable paths. Anything outside it parses to `Unresolved`,
/// which resolves to `0` for every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    TotalScore,
    AverageScore,
    SubmissionCount,
    TopPerformerScore,
    Parameter(String),
    Unresolved,
}

impl SortKey {
    pub fn parse(path: &str) -> Self {
        match path.trim() {
            "totalScore" => SortKey::TotalScore,
            "averageScore" => SortKey::AverageScore,
            "submissionCount" => SortKey::SubmissionCount,
            "topPerformer.totalScore" => SortKey::TopPerformerScore,
            other => match other.strip_prefix("parameters.") {
                Some(name) if !name.is_empty() => SortKey::Parameter(name.to_string()),
                _ => SortKey::Unresolved,
            },
        }
    }
}

/// Rows that can be ordered by a [`SortKey`]. Keys a row does not carry resolve to `0`.
pub trait SortTarget {
    fn sort_value(&self, key: &SortKey) -> f64;
}

impl SortTarget for SubmissionWithProfile {
    fn sort_value(&self, key: &SortKey) -> f64 {
        match key {
            SortKey::TotalScore => self.submission.total_score,
            SortKey::Parameter(name) => self
                .submission
                .evaluation_for(None, Some(name))
                .map(|evaluation| evaluation.score)
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

impl SortTarget for &SubmissionWithProfile {
    fn sort_value(&self, key: &SortKey) -> f64 {
        (**self).sort_value(key)
    }
}

impl SortTarget for LeaderboardGroup {
    fn sort_value(&self, key: &SortKey) -> f64 {
        match key {
            SortKey::AverageScore => self.average_score,
            SortKey::SubmissionCount => self.submission_count as f64,
            SortKey::TopPerformerScore => self
                .top_performer
                .as_ref()
                .map(|performer| performer.total_score)
                .unwrap_or(0.0),
            SortKey::Parameter(name) => self
                .parameter_scores
                .iter()
                .find(|score| &score.parameter == name)
                .map(|score| score.score)
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

/// Stable in both directions: ties keep their incoming order.
pub fn sort_rows<T: SortTarget>(rows: &mut [T], key: &SortKey, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let (a, b) = (a.sort_value(key), b.sort_value(key));
        let ordering = match direction {
            SortDirection::Asc => a.partial_cmp(&b),
            SortDirection::Desc => b.partial_cmp(&a),
        };
        ordering.unwrap_or(Ordering::Equal)
    });
}
