use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::analytics::{
    self, ClusterRequest, ClusterView, InsightsQuery, InsightsReport, Leaderboard,
    LeaderboardQuery, ShortlistEntry, ShortlistRequest, DEFAULT_LEADERBOARD_LIMIT,
    DEFAULT_TOP_PERFORMERS,
};
use super::domain::{
    CandidateId, CandidateProfile, Evaluation, Event, EventId, Participation, Submission,
    SubmissionId,
};
use super::eligibility::{EligibilityDecision, EligibilityEvaluator, IneligibleReason};
use super::repository::{EvaluationUpdate, HackathonRepository, RepositoryError};
use super::scoring;

pub const MAX_PARAMETER_SCORE: f64 = 10.0;

/// Tunables for analytics defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsSettings {
    pub leaderboard_limit: usize,
    pub top_performers: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            top_performers: DEFAULT_TOP_PERFORMERS,
        }
    }
}

/// Facade composing the repository with eligibility, scoring, and analytics.
pub struct HackathonService<R> {
    repository: Arc<R>,
    settings: AnalyticsSettings,
}

impl<R> HackathonService<R>
where
    R: HackathonRepository + 'static,
{
    pub fn new(repository: Arc<R>, settings: AnalyticsSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn settings(&self) -> AnalyticsSettings {
        self.settings
    }

    pub fn insights(
        &self,
        event_id: &EventId,
        query: &InsightsQuery,
    ) -> Result<InsightsReport, HackathonServiceError> {
        let event = self.require_event(event_id)?;
        let submissions = self.repository.submissions_for_event(event_id, None)?;
        let report =
            analytics::build_insights(&event, &submissions, query, self.settings.top_performers);
        info!(
            event = %event_id.0,
            submissions = report.total_submissions,
            "built insights report"
        );
        Ok(report)
    }

    pub fn leaderboard(
        &self,
        event_id: &EventId,
        query: &LeaderboardQuery,
    ) -> Result<Leaderboard, HackathonServiceError> {
        self.require_event(event_id)?;
        let submissions = self
            .repository
            .submissions_for_event(event_id, query.min_score)?;
        let leaderboard =
            analytics::build_leaderboard(&submissions, query, self.settings.leaderboard_limit);
        info!(
            event = %event_id.0,
            rows = leaderboard.len(),
            grouped = query.group_by.is_some(),
            "built leaderboard"
        );
        Ok(leaderboard)
    }

    pub fn clusters(
        &self,
        event_id: &EventId,
        request: &ClusterRequest,
    ) -> Result<Vec<ClusterView>, HackathonServiceError> {
        if request.num_clusters == 0 {
            return Err(HackathonServiceError::InvalidInput(
                "numClusters must be at least 1".to_string(),
            ));
        }

        let event = self.require_event(event_id)?;
        let submissions = self.repository.submissions_for_event(event_id, None)?;
        let clusters = analytics::build_clusters(&event, &submissions, request);
        info!(
            event = %event_id.0,
            strategy = request.cluster_by.label(),
            clusters = clusters.len(),
            "built clusters"
        );
        Ok(clusters)
    }

    /// Evaluates the shortlist criteria and, when `auto_shortlist` is set,
    /// flags every passing submission. Submissions that fail are never unflagged.
    pub fn shortlist(
        &self,
        event_id: &EventId,
        request: &ShortlistRequest,
    ) -> Result<Vec<ShortlistEntry>, HackathonServiceError> {
        self.require_event(event_id)?;
        let submissions = self.repository.submissions_for_event(event_id, None)?;
        let passing = analytics::select_shortlist(&submissions, &request.criteria);

        if request.auto_shortlist && !passing.is_empty() {
            let ids: Vec<SubmissionId> = passing
                .iter()
                .map(|entry| entry.submission.id.clone())
                .collect();
            self.repository.set_shortlisted(&ids, true)?;
            info!(event = %event_id.0, shortlisted = ids.len(), "auto-shortlisted submissions");
        }

        Ok(passing
            .into_iter()
            .map(|entry| {
                let flag = request.auto_shortlist || entry.submission.is_shortlisted;
                ShortlistEntry::from_entry(entry, Some(flag))
            })
            .collect())
    }

    pub fn shortlisted(
        &self,
        event_id: &EventId,
    ) -> Result<Vec<ShortlistEntry>, HackathonServiceError> {
        self.require_event(event_id)?;
        let submissions = self.repository.submissions_for_event(event_id, None)?;
        Ok(submissions
            .iter()
            .filter(|entry| entry.submission.is_shortlisted)
            .map(|entry| ShortlistEntry::from_entry(entry, None))
            .collect())
    }

    pub fn toggle_shortlist(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Submission, HackathonServiceError> {
        let current = self.require_submission(submission_id)?;
        self.set_shortlist_flag(submission_id, !current.is_shortlisted)
    }

    pub fn clear_shortlist(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Submission, HackathonServiceError> {
        self.require_submission(submission_id)?;
        self.set_shortlist_flag(submission_id, false)
    }

    /// Replaces a submission's evaluations and recomputes its weighted total in
    /// the same repository write.
    pub fn evaluate_submission(
        &self,
        submission_id: &SubmissionId,
        evaluations: Vec<Evaluation>,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Submission, HackathonServiceError> {
        if let Some(invalid) = evaluations
            .iter()
            .find(|evaluation| !(0.0..=MAX_PARAMETER_SCORE).contains(&evaluation.score))
        {
            return Err(HackathonServiceError::InvalidInput(format!(
                "score {} for parameter {} is outside 0-{}",
                invalid.score, invalid.parameter_id.0, MAX_PARAMETER_SCORE
            )));
        }

        let submission = self.require_submission(submission_id)?;
        let event = self.require_event(&submission.event_id)?;
        let evaluations = with_parameter_names(&event, evaluations);
        let total_score = scoring::total_score(&evaluations, &event.parameters);

        let updated = self.repository.store_evaluation(
            submission_id,
            EvaluationUpdate {
                evaluations,
                feedback,
                total_score,
                evaluated_at: now,
            },
        )?;
        info!(
            submission = %submission_id.0,
            total_score,
            "stored submission evaluation"
        );
        Ok(updated)
    }

    pub fn check_eligibility(
        &self,
        candidate_id: &CandidateId,
        event_id: &EventId,
    ) -> Result<EligibilityDecision, HackathonServiceError> {
        let (profile, event, participant) = self.enrollment_context(candidate_id, event_id)?;
        let decision =
            EligibilityEvaluator::evaluate(&profile, &event.eligibility_criteria, participant);
        debug!(
            candidate = %candidate_id.0,
            event = %event_id.0,
            decision = %decision.summary(),
            "checked eligibility"
        );
        Ok(decision)
    }

    pub fn can_view(
        &self,
        candidate_id: &CandidateId,
        event_id: &EventId,
        now: DateTime<Utc>,
    ) -> Result<EligibilityDecision, HackathonServiceError> {
        let (profile, event, participant) = self.enrollment_context(candidate_id, event_id)?;
        Ok(EligibilityEvaluator::can_view(
            &profile,
            &event,
            participant,
            now,
        ))
    }

    /// Registers a candidate who passes the event's eligibility rules.
    pub fn register_participant(
        &self,
        candidate_id: &CandidateId,
        event_id: &EventId,
        now: DateTime<Utc>,
    ) -> Result<Participation, HackathonServiceError> {
        let (profile, event, participant) = self.enrollment_context(candidate_id, event_id)?;
        if participant {
            return Err(RepositoryError::Conflict.into());
        }
        if event.has_ended(now) {
            return Err(HackathonServiceError::EventEnded);
        }

        match EligibilityEvaluator::evaluate(&profile, &event.eligibility_criteria, false) {
            EligibilityDecision::Eligible(_) => self.enroll(candidate_id, &event, now),
            EligibilityDecision::Ineligible(reason) => {
                Err(HackathonServiceError::NotEligible(reason))
            }
        }
    }

    /// Registers a candidate holding the event's join code, bypassing the rules.
    pub fn join_by_code(
        &self,
        candidate_id: &CandidateId,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Participation, HackathonServiceError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(HackathonServiceError::InvalidInput(
                "join code is required".to_string(),
            ));
        }

        let event = self
            .repository
            .event_by_code(code)?
            .ok_or(RepositoryError::NotFound)?;
        self.require_candidate(candidate_id)?;

        if self.repository.is_participant(candidate_id, &event.id)? {
            return Err(RepositoryError::Conflict.into());
        }
        if event.has_ended(now) {
            return Err(HackathonServiceError::EventEnded);
        }

        self.enroll(candidate_id, &event, now)
    }

    fn enroll(
        &self,
        candidate_id: &CandidateId,
        event: &Event,
        now: DateTime<Utc>,
    ) -> Result<Participation, HackathonServiceError> {
        let participation = Participation {
            candidate_id: candidate_id.clone(),
            event_id: event.id.clone(),
            registered_at: now,
        };
        self.repository.insert_participation(participation.clone())?;
        info!(
            candidate = %candidate_id.0,
            event = %event.id.0,
            "registered participant"
        );
        Ok(participation)
    }

    fn set_shortlist_flag(
        &self,
        submission_id: &SubmissionId,
        value: bool,
    ) -> Result<Submission, HackathonServiceError> {
        self.repository
            .set_shortlisted(std::slice::from_ref(submission_id), value)?;
        debug!(submission = %submission_id.0, value, "updated shortlist flag");
        self.require_submission(submission_id)
    }

    fn enrollment_context(
        &self,
        candidate_id: &CandidateId,
        event_id: &EventId,
    ) -> Result<(CandidateProfile, Event, bool), HackathonServiceError> {
        let event = self.require_event(event_id)?;
        let profile = self.require_candidate(candidate_id)?;
        let participant = self.repository.is_participant(candidate_id, event_id)?;
        Ok((profile, event, participant))
    }

    fn require_event(&self, id: &EventId) -> Result<Event, HackathonServiceError> {
        let event = self
            .repository
            .event(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(event)
    }

    fn require_candidate(
        &self,
        id: &CandidateId,
    ) -> Result<CandidateProfile, HackathonServiceError> {
        let profile = self
            .repository
            .candidate(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(profile)
    }

    fn require_submission(&self, id: &SubmissionId) -> Result<Submission, HackathonServiceError> {
        let submission = self
            .repository
            .submission(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(submission)
    }
}

// Evaluations posted with only an id pick up the event's parameter name.
fn with_parameter_names(event: &Event, evaluations: Vec<Evaluation>) -> Vec<Evaluation> {
    evaluations
        .into_iter()
        .map(|mut evaluation| {
            if evaluation.parameter_name.trim().is_empty() {
                if let Some(parameter) = event.parameter(&evaluation.parameter_id) {
                    evaluation.parameter_name = parameter.name.clone();
                }
            }
            evaluation
        })
        .collect()
}

/// Error raised by the hackathon service.
#[derive(Debug, thiserror::Error)]
pub enum HackathonServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{}", .0.summary())]
    NotEligible(IneligibleReason),
    #[error("the event has ended")]
    EventEnded,
}
