use serde::{Deserialize, Serialize};

use super::super::criteria::CriteriaMatcher;
use super::super::domain::{non_blank, Event, Parameter, SubmissionWithProfile};
use super::super::scoring;
use super::sort_key::{sort_rows, SortDirection, SortKey};
use super::views::{ClusterMember, ClusterView, ParameterScore};
use super::ClusterRequest;

/// Partitioning strategy. None of these are statistical clustering; score and
/// parameter strategies split the ranked list into equal contiguous buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStrategy {
    #[default]
    Parameters,
    Demographics,
    Scores,
}

impl ClusterStrategy {
    pub const fn label(self) -> &'static str {
        match self {
            ClusterStrategy::Parameters => "parameters",
            ClusterStrategy::Demographics => "demographics",
            ClusterStrategy::Scores => "scores",
        }
    }
}

/// Contiguous buckets of `ceil(n / k)` items; the last bucket may be short and
/// fewer than `k` buckets come back when `n` runs out first.
pub fn partition<T>(items: &[T], k: usize) -> Vec<&[T]> {
    if k == 0 || items.is_empty() {
        return Vec::new();
    }
    let size = items.len().div_ceil(k);
    items.chunks(size).take(k).collect()
}

pub fn build_clusters(
    event: &Event,
    submissions: &[SubmissionWithProfile],
    request: &ClusterRequest,
) -> Vec<ClusterView> {
    let filtered =
        CriteriaMatcher::filter(submissions, &request.filters, |entry| entry.candidate.as_ref());
    let k = request.num_clusters;

    match request.cluster_by {
        ClusterStrategy::Parameters => {
            let features = selected_parameters(event, &request.parameters);
            ranked_buckets(
                filtered,
                k,
                |index, _| parameter_cluster_name(index),
                Some(features.as_slice()),
            )
        }
        ClusterStrategy::Scores => ranked_buckets(filtered, k, score_tier_name, None),
        ClusterStrategy::Demographics => grade_groups(&filtered, k),
    }
}

fn selected_parameters<'a>(event: &'a Event, selection: &[String]) -> Vec<&'a Parameter> {
    if selection.is_empty() {
        return event.parameters.iter().collect();
    }
    event
        .parameters
        .iter()
        .filter(|parameter| {
            selection
                .iter()
                .any(|wanted| wanted == &parameter.id.0 || wanted == &parameter.name)
        })
        .collect()
}

fn ranked_buckets<F>(
    mut rows: Vec<&SubmissionWithProfile>,
    k: usize,
    name: F,
    features: Option<&[&Parameter]>,
) -> Vec<ClusterView>
where
    F: Fn(usize, usize) -> String,
{
    sort_rows(&mut rows, &SortKey::TotalScore, SortDirection::Desc);

    partition(&rows, k)
        .into_iter()
        .enumerate()
        .map(|(index, bucket)| ClusterView {
            cluster_id: index + 1,
            cluster_name: name(index, k),
            size: bucket.len(),
            centroid: features.map(|parameters| centroid(bucket, parameters)),
            average_score: average_total(bucket),
            members: bucket
                .iter()
                .map(|entry| ClusterMember::from_entry(entry))
                .collect(),
        })
        .collect()
}

// Features match by parameter id only; a missing evaluation counts as zero.
fn centroid(bucket: &[&SubmissionWithProfile], parameters: &[&Parameter]) -> Vec<ParameterScore> {
    parameters
        .iter()
        .map(|parameter| {
            let scores: Vec<f64> = bucket
                .iter()
                .map(|entry| {
                    entry
                        .submission
                        .evaluation_for(Some(&parameter.id), None)
                        .map(|evaluation| evaluation.score)
                        .unwrap_or(0.0)
                })
                .collect();
            ParameterScore {
                parameter: parameter.name.clone(),
                score: scoring::mean(&scores),
            }
        })
        .collect()
}

fn grade_groups(rows: &[&SubmissionWithProfile], k: usize) -> Vec<ClusterView> {
    let mut groups: Vec<(String, Vec<&SubmissionWithProfile>)> = Vec::new();
    for &entry in rows {
        let Some(grade) = entry
            .candidate
            .as_ref()
            .and_then(|profile| non_blank(profile.grade.as_deref()))
        else {
            continue;
        };

        match groups.iter_mut().find(|(value, _)| value.as_str() == grade) {
            Some((_, members)) => members.push(entry),
            None => groups.push((grade.to_string(), vec![entry])),
        }
    }

    groups
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(index, (grade, members))| ClusterView {
            cluster_id: index + 1,
            cluster_name: format!("Grade {grade}"),
            size: members.len(),
            centroid: None,
            average_score: average_total(&members),
            members: members
                .iter()
                .map(|entry| ClusterMember::from_entry(entry))
                .collect(),
        })
        .collect()
}

fn average_total(bucket: &[&SubmissionWithProfile]) -> f64 {
    let totals: Vec<f64> = bucket.iter().map(|entry| entry.total_score()).collect();
    scoring::mean(&totals)
}

pub(crate) fn parameter_cluster_name(index: usize) -> String {
    match index {
        0 => "High Performers".to_string(),
        1 => "Medium Performers".to_string(),
        2 => "Developing Performers".to_string(),
        other => format!("Cluster {}", other + 1),
    }
}

pub(crate) fn score_tier_name(index: usize, total: usize) -> String {
    if total == 3 {
        return match index {
            0 => "Top Tier".to_string(),
            1 => "Middle Tier".to_string(),
            _ => "Lower Tier".to_string(),
        };
    }

    if index == 0 {
        "Top Performers".to_string()
    } else if index + 1 == total {
        "Developing Performers".to_string()
    } else {
        format!("Tier {}", index + 1)
    }
}
