use chrono::{DateTime, NaiveDate, Utc};
use hackathon_analytics::error::AppError;
use hackathon_analytics::workflows::hackathon::{
    scoring, CandidateId, CandidateProfile, EvaluationUpdate, Event, EventId,
    HackathonRepository, Participation, RepositoryError, Submission, SubmissionId,
    SubmissionWithProfile,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seed document for the in-memory store.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Snapshot {
    pub(crate) events: Vec<Event>,
    pub(crate) candidates: Vec<CandidateProfile>,
    pub(crate) participations: Vec<Participation>,
    pub(crate) submissions: Vec<Submission>,
}

pub(crate) fn load_snapshot(path: &Path) -> Result<Snapshot, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let snapshot = serde_json::from_str(&raw)?;
    Ok(snapshot)
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryHackathonRepository {
    events: Arc<Mutex<HashMap<EventId, Event>>>,
    candidates: Arc<Mutex<HashMap<CandidateId, CandidateProfile>>>,
    participations: Arc<Mutex<Vec<Participation>>>,
    submissions: Arc<Mutex<Vec<Submission>>>,
}

impl InMemoryHackathonRepository {
    pub(crate) fn from_snapshot(snapshot: Snapshot) -> Self {
        let Snapshot {
            events,
            candidates,
            participations,
            submissions,
        } = snapshot;

        let events: HashMap<EventId, Event> = events
            .into_iter()
            .map(|event| (event.id.clone(), event))
            .collect();

        // Stored totals are derived from the evaluations, never taken from the seed.
        let submissions: Vec<Submission> = submissions
            .into_iter()
            .map(|mut submission| {
                submission.total_score = events
                    .get(&submission.event_id)
                    .map_or(0.0, |event| {
                        scoring::total_score(&submission.evaluation, &event.parameters)
                    });
                submission
            })
            .collect();

        Self {
            events: Arc::new(Mutex::new(events)),
            candidates: Arc::new(Mutex::new(
                candidates
                    .into_iter()
                    .map(|profile| (profile.id.clone(), profile))
                    .collect(),
            )),
            participations: Arc::new(Mutex::new(participations)),
            submissions: Arc::new(Mutex::new(submissions)),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

impl HackathonRepository for InMemoryHackathonRepository {
    fn event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Ok(lock(&self.events)?.get(id).cloned())
    }

    fn event_by_code(&self, code: &str) -> Result<Option<Event>, RepositoryError> {
        let guard = lock(&self.events)?;
        Ok(guard
            .values()
            .find(|event| event.unique_code == code)
            .cloned())
    }

    fn candidate(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError> {
        Ok(lock(&self.candidates)?.get(id).cloned())
    }

    fn submissions_for_event(
        &self,
        id: &EventId,
        min_score: Option<f64>,
    ) -> Result<Vec<SubmissionWithProfile>, RepositoryError> {
        let submissions = lock(&self.submissions)?;
        let candidates = lock(&self.candidates)?;
        Ok(submissions
            .iter()
            .filter(|submission| &submission.event_id == id)
            .filter(|submission| min_score.map_or(true, |min| submission.total_score >= min))
            .map(|submission| SubmissionWithProfile {
                submission: submission.clone(),
                candidate: candidates.get(&submission.candidate_id).cloned(),
            })
            .collect())
    }

    fn submission(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let guard = lock(&self.submissions)?;
        Ok(guard.iter().find(|submission| &submission.id == id).cloned())
    }

    fn is_participant(
        &self,
        candidate: &CandidateId,
        event: &EventId,
    ) -> Result<bool, RepositoryError> {
        let guard = lock(&self.participations)?;
        Ok(guard
            .iter()
            .any(|entry| &entry.candidate_id == candidate && &entry.event_id == event))
    }

    fn insert_participation(&self, participation: Participation) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.participations)?;
        if guard.iter().any(|entry| {
            entry.candidate_id == participation.candidate_id
                && entry.event_id == participation.event_id
        }) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(participation);
        Ok(())
    }

    fn set_shortlisted(&self, ids: &[SubmissionId], value: bool) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.submissions)?;
        if ids
            .iter()
            .any(|id| !guard.iter().any(|submission| &submission.id == id))
        {
            return Err(RepositoryError::NotFound);
        }
        for submission in guard
            .iter_mut()
            .filter(|submission| ids.contains(&submission.id))
        {
            submission.is_shortlisted = value;
        }
        Ok(())
    }

    fn store_evaluation(
        &self,
        id: &SubmissionId,
        update: EvaluationUpdate,
    ) -> Result<Submission, RepositoryError> {
        let mut guard = lock(&self.submissions)?;
        let submission = guard
            .iter_mut()
            .find(|submission| &submission.id == id)
            .ok_or(RepositoryError::NotFound)?;
        submission.evaluation = update.evaluations;
        submission.feedback = update.feedback;
        submission.total_score = update.total_score;
        submission.evaluated_at = Some(update.evaluated_at);
        Ok(submission.clone())
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"))
}

/// Parses a CLI flag through the same serde names the HTTP API accepts.
pub(crate) fn parse_label<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
        .map_err(|err| format!("unrecognised value '{raw}' ({err})"))
}
