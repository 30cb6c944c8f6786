//! Hackathon eligibility decisions and organizer analytics.
//!
//! Analytics builders are pure functions over fetched data; [`HackathonService`]
//! owns repository access and persistence of shortlist and evaluation changes.

pub mod analytics;
pub mod criteria;
pub mod domain;
pub mod eligibility;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use analytics::{
    build_clusters, build_insights, build_leaderboard, partition, select_shortlist,
    write_leaderboard_csv, ClusterRequest, ClusterStrategy, ClusterView, ExportError,
    InsightsQuery, InsightsReport, Leaderboard, LeaderboardEntry, LeaderboardGroup,
    LeaderboardQuery, ParameterScoreRequirement, ShortlistCriteria, ShortlistEntry,
    ShortlistRequest, SortDirection, SortKey, DEFAULT_CLUSTER_COUNT, DEFAULT_LEADERBOARD_LIMIT,
    DEFAULT_TOP_PERFORMERS,
};
pub use criteria::{Constraint, CriteriaMatcher, DemographicFilter, ScalarValue};
pub use domain::{
    AttachmentRef, CandidateId, CandidateProfile, DemographicField, EligibilityRule, Evaluation,
    Event, EventId, EventStatus, Parameter, ParameterId, Participation, RuleKind, Submission,
    SubmissionId, SubmissionWithProfile,
};
pub use eligibility::{EligibilityDecision, EligibilityEvaluator, EligibleReason, IneligibleReason};
pub use repository::{EvaluationUpdate, HackathonRepository, RepositoryError};
pub use router::hackathon_router;
pub use service::{
    AnalyticsSettings, HackathonService, HackathonServiceError, MAX_PARAMETER_SCORE,
};

pub(crate) use router::status_for;
