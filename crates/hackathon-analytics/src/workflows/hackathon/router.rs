use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::analytics::{ClusterRequest, InsightsQuery, LeaderboardQuery, ShortlistRequest};
use super::domain::{CandidateId, Evaluation, EventId, SubmissionId};
use super::eligibility::EligibilityDecision;
use super::repository::{HackathonRepository, RepositoryError};
use super::service::{HackathonService, HackathonServiceError};

type SharedService<R> = State<Arc<HackathonService<R>>>;

/// Router builder exposing analytics, shortlist, evaluation, and enrollment endpoints.
pub fn hackathon_router<R>(service: Arc<HackathonService<R>>) -> Router
where
    R: HackathonRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/analytics/:event_id/insights",
            post(insights_handler::<R>),
        )
        .route(
            "/api/v1/analytics/:event_id/leaderboard",
            post(leaderboard_handler::<R>),
        )
        .route(
            "/api/v1/analytics/:event_id/clusters",
            post(clusters_handler::<R>),
        )
        .route(
            "/api/v1/analytics/:event_id/shortlist",
            post(shortlist_handler::<R>),
        )
        .route(
            "/api/v1/analytics/:event_id/shortlisted",
            get(shortlisted_handler::<R>),
        )
        .route(
            "/api/v1/submissions/:submission_id/shortlist",
            post(toggle_shortlist_handler::<R>).delete(clear_shortlist_handler::<R>),
        )
        .route(
            "/api/v1/submissions/:submission_id/evaluation",
            put(evaluation_handler::<R>),
        )
        .route(
            "/api/v1/events/:event_id/eligibility/:candidate_id",
            get(eligibility_handler::<R>),
        )
        .route(
            "/api/v1/events/:event_id/visibility/:candidate_id",
            get(visibility_handler::<R>),
        )
        .route(
            "/api/v1/events/:event_id/participants",
            post(register_handler::<R>),
        )
        .route("/api/v1/events/join-by-code", post(join_handler::<R>))
        .with_state(service)
}

/// Array responses share a `{count, data}` envelope.
#[derive(Debug, Serialize)]
struct Collection<T> {
    count: usize,
    data: Vec<T>,
}

impl<T: Serialize> Collection<T> {
    fn new(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct RegistrationRequest {
    pub(crate) candidate_id: CandidateId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct JoinByCodeRequest {
    pub(crate) candidate_id: CandidateId,
    pub(crate) code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct EvaluationRequest {
    pub(crate) evaluations: Vec<Evaluation>,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

pub(crate) async fn insights_handler<R>(
    State(service): SharedService<R>,
    Path(event_id): Path<String>,
    body: Result<Json<InsightsQuery>, JsonRejection>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    let query = match body {
        Ok(Json(query)) => query,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.insights(&EventId(event_id), &query) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn leaderboard_handler<R>(
    State(service): SharedService<R>,
    Path(event_id): Path<String>,
    body: Result<Json<LeaderboardQuery>, JsonRejection>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    let query = match body {
        Ok(Json(query)) => query,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.leaderboard(&EventId(event_id), &query) {
        Ok(leaderboard) => {
            let payload = json!({
                "count": leaderboard.len(),
                "data": leaderboard,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn clusters_handler<R>(
    State(service): SharedService<R>,
    Path(event_id): Path<String>,
    body: Result<Json<ClusterRequest>, JsonRejection>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.clusters(&EventId(event_id), &request) {
        Ok(clusters) => (StatusCode::OK, Json(Collection::new(clusters))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn shortlist_handler<R>(
    State(service): SharedService<R>,
    Path(event_id): Path<String>,
    body: Result<Json<ShortlistRequest>, JsonRejection>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.shortlist(&EventId(event_id), &request) {
        Ok(entries) => (StatusCode::OK, Json(Collection::new(entries))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn shortlisted_handler<R>(
    State(service): SharedService<R>,
    Path(event_id): Path<String>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    match service.shortlisted(&EventId(event_id)) {
        Ok(entries) => (StatusCode::OK, Json(Collection::new(entries))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn toggle_shortlist_handler<R>(
    State(service): SharedService<R>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    match service.toggle_shortlist(&SubmissionId(submission_id)) {
        Ok(submission) => (StatusCode::OK, Json(submission)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn clear_shortlist_handler<R>(
    State(service): SharedService<R>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    match service.clear_shortlist(&SubmissionId(submission_id)) {
        Ok(submission) => (StatusCode::OK, Json(submission)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evaluation_handler<R>(
    State(service): SharedService<R>,
    Path(submission_id): Path<String>,
    body: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.evaluate_submission(
        &SubmissionId(submission_id),
        request.evaluations,
        request.feedback,
        Utc::now(),
    ) {
        Ok(submission) => (StatusCode::OK, Json(submission)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn eligibility_handler<R>(
    State(service): SharedService<R>,
    Path((event_id, candidate_id)): Path<(String, String)>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    match service.check_eligibility(&CandidateId(candidate_id), &EventId(event_id)) {
        Ok(decision) => decision_response(decision),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn visibility_handler<R>(
    State(service): SharedService<R>,
    Path((event_id, candidate_id)): Path<(String, String)>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    match service.can_view(&CandidateId(candidate_id), &EventId(event_id), Utc::now()) {
        Ok(decision) => decision_response(decision),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<R>(
    State(service): SharedService<R>,
    Path(event_id): Path<String>,
    body: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.register_participant(&request.candidate_id, &EventId(event_id), Utc::now()) {
        Ok(participation) => (StatusCode::CREATED, Json(participation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn join_handler<R>(
    State(service): SharedService<R>,
    body: Result<Json<JoinByCodeRequest>, JsonRejection>,
) -> Response
where
    R: HackathonRepository + 'static,
{
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.join_by_code(&request.candidate_id, &request.code, Utc::now()) {
        Ok(participation) => (StatusCode::CREATED, Json(participation)).into_response(),
        Err(error) => error_response(error),
    }
}

fn decision_response(decision: EligibilityDecision) -> Response {
    let payload = json!({
        "eligible": decision.is_eligible(),
        "message": decision.summary(),
        "decision": decision,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

pub(crate) fn status_for(error: &HackathonServiceError) -> StatusCode {
    match error {
        HackathonServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        HackathonServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        HackathonServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        HackathonServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        HackathonServiceError::NotEligible(_) | HackathonServiceError::EventEnded => {
            StatusCode::FORBIDDEN
        }
    }
}

fn error_response(error: HackathonServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(&error), Json(payload)).into_response()
}
