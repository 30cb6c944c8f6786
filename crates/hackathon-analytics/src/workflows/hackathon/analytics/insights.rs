use std::collections::BTreeMap;

use super::super::criteria::CriteriaMatcher;
use super::super::domain::{non_blank, Event, SubmissionWithProfile};
use super::super::scoring;
use super::sort_key::{sort_rows, SortDirection, SortKey};
use super::views::{
    DemographicInsights, InsightsReport, OverallScores, ParameterInsight, TopPerformer,
};
use super::InsightsQuery;

/// Builds the insights document for one event. An empty filtered set yields
/// [`InsightsReport::empty`].
pub fn build_insights(
    event: &Event,
    submissions: &[SubmissionWithProfile],
    query: &InsightsQuery,
    top_performers: usize,
) -> InsightsReport {
    let filtered = CriteriaMatcher::filter(submissions, &query.demographic_filters, |entry| {
        entry.candidate.as_ref()
    });

    if filtered.is_empty() {
        return InsightsReport::empty();
    }

    InsightsReport {
        total_submissions: filtered.len(),
        demographic_insights: Some(demographic_insights(&filtered)),
        parameter_insights: parameter_insights(event, &filtered, query),
        overall_scores: Some(overall_scores(&filtered, query.score_threshold, top_performers)),
    }
}

fn demographic_insights(entries: &[&SubmissionWithProfile]) -> DemographicInsights {
    let mut insights = DemographicInsights::default();
    for profile in entries.iter().filter_map(|entry| entry.candidate.as_ref()) {
        tally(&mut insights.by_state, profile.state.as_deref());
        tally(&mut insights.by_gender, profile.gender.as_deref());
        tally(&mut insights.by_grade, profile.grade.as_deref());
        tally(&mut insights.by_school, profile.institution());
        tally(&mut insights.by_district, profile.district.as_deref());
    }
    insights
}

fn tally(counts: &mut BTreeMap<String, usize>, value: Option<&str>) {
    if let Some(value) = non_blank(value) {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
}

// Submissions without any evaluation are skipped; evaluated submissions that
// lack the parameter contribute a zero.
fn parameter_insights(
    event: &Event,
    entries: &[&SubmissionWithProfile],
    query: &InsightsQuery,
) -> BTreeMap<String, ParameterInsight> {
    let evaluated: Vec<_> = entries
        .iter()
        .filter(|entry| !entry.submission.evaluation.is_empty())
        .collect();

    event
        .parameters
        .iter()
        .map(|parameter| {
            let scores: Vec<f64> = evaluated
                .iter()
                .map(|entry| {
                    entry
                        .submission
                        .evaluation_for(Some(&parameter.id), Some(&parameter.name))
                        .map(|evaluation| evaluation.score)
                        .unwrap_or(0.0)
                })
                .collect();

            let above_threshold = query
                .parameter_criteria
                .get(&parameter.id)
                .map(|threshold| scoring::threshold_count(&scores, *threshold));

            let insight = ParameterInsight {
                average: scoring::mean(&scores),
                highest: scoring::highest(&scores),
                lowest: scoring::lowest(&scores),
                distribution: scoring::distribution(&scores),
                above_threshold,
            };
            (parameter.name.clone(), insight)
        })
        .collect()
}

fn overall_scores(
    entries: &[&SubmissionWithProfile],
    threshold: f64,
    top_performers: usize,
) -> OverallScores {
    let totals: Vec<f64> = entries.iter().map(|entry| entry.total_score()).collect();

    let mut ranked = entries.to_vec();
    sort_rows(&mut ranked, &SortKey::TotalScore, SortDirection::Desc);

    OverallScores {
        average: scoring::mean(&totals),
        distribution: scoring::distribution(&totals),
        top_performers: ranked
            .iter()
            .take(top_performers)
            .map(|entry| TopPerformer::from_entry(entry))
            .collect(),
        score_threshold: scoring::threshold_count(&totals, threshold),
    }
}
