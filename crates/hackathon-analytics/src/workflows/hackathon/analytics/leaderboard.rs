use super::super::criteria::CriteriaMatcher;
use super::super::domain::{non_blank, DemographicField, SubmissionWithProfile};
use super::super::scoring;
use super::sort_key::{sort_rows, SortDirection, SortKey};
use super::views::{
    parameter_scores, CandidateSummary, Leaderboard, LeaderboardEntry, LeaderboardGroup,
    ParameterScore, TopPerformer,
};
use super::LeaderboardQuery;

/// Ranked rows when `group_by` is unset, otherwise one aggregated row per group value.
pub fn build_leaderboard(
    submissions: &[SubmissionWithProfile],
    query: &LeaderboardQuery,
    default_limit: usize,
) -> Leaderboard {
    let filtered =
        CriteriaMatcher::filter(submissions, &query.filters, |entry| entry.candidate.as_ref());
    let key = query.sort_key();

    match query.group_by {
        Some(field) => Leaderboard::Grouped(grouped(&filtered, field, &key, query.sort_order)),
        None => {
            let limit = query.limit.unwrap_or(default_limit);
            Leaderboard::Ranked(ranked(filtered, &key, query.sort_order, limit))
        }
    }
}

fn ranked(
    mut rows: Vec<&SubmissionWithProfile>,
    key: &SortKey,
    direction: SortDirection,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    sort_rows(&mut rows, key, direction);
    rows.into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, entry)| LeaderboardEntry {
            rank: index + 1,
            submission_id: entry.submission.id.clone(),
            user: entry.candidate.as_ref().map(CandidateSummary::from_profile),
            total_score: entry.submission.total_score,
            parameter_scores: parameter_scores(&entry.submission.evaluation),
            is_shortlisted: entry.submission.is_shortlisted,
        })
        .collect()
}

fn grouped(
    rows: &[&SubmissionWithProfile],
    field: DemographicField,
    key: &SortKey,
    direction: SortDirection,
) -> Vec<LeaderboardGroup> {
    // Vec of (value, members) keeps first-seen order.
    let mut buckets: Vec<(String, Vec<&SubmissionWithProfile>)> = Vec::new();
    for &entry in rows {
        let Some(value) = entry
            .candidate
            .as_ref()
            .and_then(|profile| non_blank(profile.field(field)))
        else {
            continue;
        };

        match buckets.iter_mut().find(|(name, _)| name.as_str() == value) {
            Some((_, members)) => members.push(entry),
            None => buckets.push((value.to_string(), vec![entry])),
        }
    }

    let mut groups: Vec<LeaderboardGroup> = buckets
        .into_iter()
        .map(|(group_name, members)| summarize_group(group_name, members))
        .collect();
    sort_rows(&mut groups, key, direction);
    groups
}

fn summarize_group(
    group_name: String,
    mut members: Vec<&SubmissionWithProfile>,
) -> LeaderboardGroup {
    let totals: Vec<f64> = members.iter().map(|entry| entry.total_score()).collect();
    let parameter_scores = mean_parameter_scores(&members);

    sort_rows(&mut members, &SortKey::TotalScore, SortDirection::Desc);
    let top_performer = members.first().map(|entry| TopPerformer::from_entry(entry));

    LeaderboardGroup {
        group_name,
        submission_count: totals.len(),
        average_score: scoring::mean(&totals),
        parameter_scores,
        top_performer,
    }
}

fn mean_parameter_scores(members: &[&SubmissionWithProfile]) -> Vec<ParameterScore> {
    let mut collected: Vec<(String, Vec<f64>)> = Vec::new();
    for evaluation in members
        .iter()
        .flat_map(|entry| entry.submission.evaluation.iter())
    {
        match collected
            .iter_mut()
            .find(|(name, _)| *name == evaluation.parameter_name)
        {
            Some((_, scores)) => scores.push(evaluation.score),
            None => collected.push((evaluation.parameter_name.clone(), vec![evaluation.score])),
        }
    }

    collected
        .into_iter()
        .map(|(parameter, scores)| ParameterScore {
            parameter,
            score: scoring::mean(&scores),
        })
        .collect()
}
