use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    CandidateId, CandidateProfile, Evaluation, Event, EventId, Participation, Submission,
    SubmissionId, SubmissionWithProfile,
};

/// Evaluation write applied atomically: evaluations, feedback and the
/// recomputed total land together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationUpdate {
    pub evaluations: Vec<Evaluation>,
    pub feedback: Option<String>,
    pub total_score: f64,
    pub evaluated_at: DateTime<Utc>,
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait HackathonRepository: Send + Sync {
    fn event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError>;
    fn event_by_code(&self, code: &str) -> Result<Option<Event>, RepositoryError>;
    fn candidate(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError>;
    /// Submissions of an event joined with their candidate profiles. When
    /// `min_score` is set only submissions with `total_score >= min_score` are returned.
    fn submissions_for_event(
        &self,
        id: &EventId,
        min_score: Option<f64>,
    ) -> Result<Vec<SubmissionWithProfile>, RepositoryError>;
    fn submission(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError>;
    fn is_participant(
        &self,
        candidate: &CandidateId,
        event: &EventId,
    ) -> Result<bool, RepositoryError>;
    fn insert_participation(&self, participation: Participation) -> Result<(), RepositoryError>;
    /// Sets the flag on every listed submission; unknown ids yield `NotFound`.
    fn set_shortlisted(&self, ids: &[SubmissionId], value: bool) -> Result<(), RepositoryError>;
    fn store_evaluation(
        &self,
        id: &SubmissionId,
        update: EvaluationUpdate,
    ) -> Result<Submission, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
