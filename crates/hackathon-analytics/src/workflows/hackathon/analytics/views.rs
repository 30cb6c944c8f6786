use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::super::domain::{
    CandidateId, CandidateProfile, Evaluation, SubmissionId, SubmissionWithProfile,
};
use super::super::scoring::{ScoreDistribution, ThresholdSummary};

/// Compact candidate summary used by leaderboard and shortlist rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    pub id: CandidateId,
    pub name: Option<String>,
    pub grade: Option<String>,
    pub school: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub gender: Option<String>,
}

impl CandidateSummary {
    pub fn from_profile(profile: &CandidateProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.full_name.clone(),
            grade: profile.grade.clone(),
            school: profile.institution().map(str::to_string),
            state: profile.state.clone(),
            district: profile.district.clone(),
            gender: profile.gender.clone(),
        }
    }
}

/// Reduced summary for cluster members.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: CandidateId,
    pub name: Option<String>,
    pub school: Option<String>,
    pub grade: Option<String>,
}

impl MemberSummary {
    pub fn from_profile(profile: &CandidateProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.full_name.clone(),
            school: profile.institution().map(str::to_string),
            grade: profile.grade.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformerSummary {
    pub name: Option<String>,
    pub school: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    pub submission_id: SubmissionId,
    pub user: Option<PerformerSummary>,
    pub total_score: f64,
}

impl TopPerformer {
    pub fn from_entry(entry: &SubmissionWithProfile) -> Self {
        Self {
            submission_id: entry.submission.id.clone(),
            user: entry.candidate.as_ref().map(|profile| PerformerSummary {
                name: profile.full_name.clone(),
                school: profile.institution().map(str::to_string),
                grade: profile.grade.clone(),
            }),
            total_score: entry.submission.total_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterScore {
    pub parameter: String,
    pub score: f64,
}

pub(crate) fn parameter_scores(evaluations: &[Evaluation]) -> Vec<ParameterScore> {
    evaluations
        .iter()
        .map(|evaluation| ParameterScore {
            parameter: evaluation.parameter_name.clone(),
            score: evaluation.score,
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicInsights {
    pub by_state: BTreeMap<String, usize>,
    pub by_gender: BTreeMap<String, usize>,
    pub by_grade: BTreeMap<String, usize>,
    pub by_school: BTreeMap<String, usize>,
    pub by_district: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInsight {
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
    pub distribution: ScoreDistribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub above_threshold: Option<ThresholdSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallScores {
    pub average: f64,
    pub distribution: ScoreDistribution,
    pub top_performers: Vec<TopPerformer>,
    pub score_threshold: ThresholdSummary,
}

/// Insights document. Sections without data serialize as `{}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub total_submissions: usize,
    #[serde(serialize_with = "empty_object_when_none")]
    pub demographic_insights: Option<DemographicInsights>,
    pub parameter_insights: BTreeMap<String, ParameterInsight>,
    #[serde(serialize_with = "empty_object_when_none")]
    pub overall_scores: Option<OverallScores>,
}

impl InsightsReport {
    pub fn empty() -> Self {
        Self {
            total_submissions: 0,
            demographic_insights: None,
            parameter_insights: BTreeMap::new(),
            overall_scores: None,
        }
    }
}

fn empty_object_when_none<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(value) => value.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub submission_id: SubmissionId,
    pub user: Option<CandidateSummary>,
    pub total_score: f64,
    pub parameter_scores: Vec<ParameterScore>,
    pub is_shortlisted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardGroup {
    pub group_name: String,
    pub submission_count: usize,
    pub average_score: f64,
    pub parameter_scores: Vec<ParameterScore>,
    pub top_performer: Option<TopPerformer>,
}

/// Either ranked individual rows or aggregated groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Leaderboard {
    Ranked(Vec<LeaderboardEntry>),
    Grouped(Vec<LeaderboardGroup>),
}

impl Leaderboard {
    pub fn len(&self) -> usize {
        match self {
            Leaderboard::Ranked(entries) => entries.len(),
            Leaderboard::Grouped(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMember {
    pub submission_id: SubmissionId,
    pub user: Option<MemberSummary>,
    pub total_score: f64,
}

impl ClusterMember {
    pub fn from_entry(entry: &SubmissionWithProfile) -> Self {
        Self {
            submission_id: entry.submission.id.clone(),
            user: entry.candidate.as_ref().map(MemberSummary::from_profile),
            total_score: entry.submission.total_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterView {
    pub cluster_id: usize,
    pub cluster_name: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centroid: Option<Vec<ParameterScore>>,
    pub average_score: f64,
    pub members: Vec<ClusterMember>,
}

/// Shortlist candidate or shortlisted submission row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortlistEntry {
    pub submission_id: SubmissionId,
    pub user: Option<CandidateSummary>,
    pub total_score: f64,
    pub parameter_scores: Vec<ParameterScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_shortlisted: Option<bool>,
}

impl ShortlistEntry {
    pub fn from_entry(entry: &SubmissionWithProfile, is_shortlisted: Option<bool>) -> Self {
        Self {
            submission_id: entry.submission.id.clone(),
            user: entry.candidate.as_ref().map(CandidateSummary::from_profile),
            total_score: entry.submission.total_score,
            parameter_scores: parameter_scores(&entry.submission.evaluation),
            is_shortlisted,
        }
    }
}
