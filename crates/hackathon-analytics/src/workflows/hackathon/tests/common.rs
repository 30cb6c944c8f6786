use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::hackathon::domain::{
    CandidateId, CandidateProfile, EligibilityRule, Evaluation, Event, EventId, Parameter,
    ParameterId, Participation, Submission, SubmissionId, SubmissionWithProfile,
};
use crate::workflows::hackathon::repository::{
    EvaluationUpdate, HackathonRepository, RepositoryError,
};
use crate::workflows::hackathon::scoring;
use crate::workflows::hackathon::service::{AnalyticsSettings, HackathonService};

pub(super) const EVENT_ID: &str = "evt-1";
pub(super) const CODE_ONLY_EVENT_ID: &str = "evt-code";
pub(super) const PAST_EVENT_ID: &str = "evt-past";

pub(super) fn instant(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn now() -> DateTime<Utc> {
    instant(2025, 1, 15)
}

pub(super) fn parameters() -> Vec<Parameter> {
    vec![
        Parameter {
            id: ParameterId("p-innovation".to_string()),
            name: "Innovation".to_string(),
            weight: 60.0,
            description: "Originality of the idea".to_string(),
        },
        Parameter {
            id: ParameterId("p-execution".to_string()),
            name: "Execution".to_string(),
            weight: 40.0,
            description: "Quality of the build".to_string(),
        },
    ]
}

fn event_with(id: &str, code: &str, end: DateTime<Utc>, rules: Vec<EligibilityRule>) -> Event {
    Event {
        id: EventId(id.to_string()),
        title: format!("Event {id}"),
        description: String::new(),
        start_date: instant(2025, 1, 1),
        end_date: end,
        unique_code: code.to_string(),
        parameters: parameters(),
        eligibility_criteria: rules,
    }
}

/// Ongoing event open to grades 9 and 10.
pub(super) fn event() -> Event {
    event_with(
        EVENT_ID,
        "HACK01",
        instant(2099, 12, 31),
        vec![EligibilityRule::Grade {
            values: vec!["9".to_string(), "10".to_string()],
        }],
    )
}

pub(super) fn code_only_event() -> Event {
    event_with(
        CODE_ONLY_EVENT_ID,
        "CODE42",
        instant(2099, 12, 31),
        vec![
            EligibilityRule::CodeOnly,
            EligibilityRule::Grade {
                values: vec!["9".to_string(), "10".to_string()],
            },
        ],
    )
}

pub(super) fn past_event() -> Event {
    let mut event = event_with(PAST_EVENT_ID, "PAST99", instant(2025, 1, 10), Vec::new());
    event.start_date = instant(2024, 12, 1);
    event
}

pub(super) fn profile(
    id: &str,
    name: &str,
    grade: &str,
    school: &str,
    state: &str,
    district: &str,
    gender: &str,
) -> CandidateProfile {
    CandidateProfile {
        id: CandidateId(id.to_string()),
        full_name: Some(name.to_string()),
        role: Some("student".to_string()),
        grade: Some(grade.to_string()),
        school_name: Some(school.to_string()),
        school_college_name: None,
        state: Some(state.to_string()),
        district: Some(district.to_string()),
        gender: Some(gender.to_string()),
        phone_number: Some(format!("+91-900000{}", id.trim_start_matches('c'))),
    }
}

pub(super) fn candidates() -> Vec<CandidateProfile> {
    let mut college = profile("c3", "Chitra", "9", "", "Karnataka", "Mysuru", "female");
    college.school_name = None;
    college.school_college_name = Some("City College".to_string());

    vec![
        profile("c1", "Asha", "9", "Model School", "Kerala", "Kochi", "female"),
        profile("c2", "Ben", "10", "Model School", "Kerala", "Kochi", "male"),
        college,
        profile("c4", "Dev", "11", "Hill School", "Karnataka", "Bengaluru", "male"),
        profile("c5", "Esha", "10", "Model School", "Kerala", "Kochi", "female"),
        profile("c6", "Farid", "9", "Hill School", "Karnataka", "Bengaluru", "male"),
        profile("c7", "Gita", "10", "Hill School", "Kerala", "Kochi", "female"),
        profile("c8", "Hari", "11", "City School", "Tamil Nadu", "Chennai", "male"),
        profile("c9", "Ira", "12", "City School", "Tamil Nadu", "Chennai", "female"),
    ]
}

pub(super) fn evaluation(parameter: &Parameter, score: f64) -> Evaluation {
    Evaluation {
        parameter_id: parameter.id.clone(),
        parameter_name: parameter.name.clone(),
        score,
        feedback: None,
    }
}

pub(super) fn submission(id: &str, candidate: &str, scores: Option<(f64, f64)>) -> Submission {
    let parameters = parameters();
    let evaluation = match scores {
        Some((innovation, execution)) => vec![
            evaluation(&parameters[0], innovation),
            evaluation(&parameters[1], execution),
        ],
        None => Vec::new(),
    };
    let total_score = scoring::total_score(&evaluation, &parameters);

    Submission {
        id: SubmissionId(id.to_string()),
        candidate_id: CandidateId(candidate.to_string()),
        event_id: EventId(EVENT_ID.to_string()),
        submission_text: Some(format!("Entry from {candidate}")),
        attachments: Vec::new(),
        evaluation,
        total_score,
        is_shortlisted: false,
        feedback: None,
        submitted_at: instant(2025, 1, 5),
        evaluated_at: scores.map(|_| instant(2025, 1, 12)),
    }
}

/// Ten submissions with distinct totals (descending: s6, s2, s4, s1, s10, s7,
/// s3, s5, s8, s9). `s9` has no evaluations and `s10` has no candidate profile.
pub(super) fn submissions() -> Vec<Submission> {
    vec![
        submission("s1", "c1", Some((8.0, 5.0))),
        submission("s2", "c2", Some((9.0, 9.0))),
        submission("s3", "c3", Some((4.0, 6.0))),
        submission("s4", "c4", Some((7.0, 7.0))),
        submission("s5", "c5", Some((6.0, 2.0))),
        submission("s6", "c6", Some((10.0, 8.0))),
        submission("s7", "c7", Some((5.0, 5.0))),
        submission("s8", "c8", Some((3.0, 4.0))),
        submission("s9", "c9", None),
        submission("s10", "ghost", Some((6.0, 6.0))),
    ]
}

pub(super) fn dataset() -> Vec<SubmissionWithProfile> {
    let profiles = candidates();
    submissions()
        .into_iter()
        .map(|submission| {
            let candidate = profiles
                .iter()
                .find(|profile| profile.id == submission.candidate_id)
                .cloned();
            SubmissionWithProfile {
                submission,
                candidate,
            }
        })
        .collect()
}

pub(super) fn ids<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a SubmissionId>,
{
    entries.into_iter().map(|id| id.0.clone()).collect()
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) events: Arc<Mutex<HashMap<EventId, Event>>>,
    pub(super) candidates: Arc<Mutex<HashMap<CandidateId, CandidateProfile>>>,
    pub(super) participations: Arc<Mutex<Vec<Participation>>>,
    pub(super) submissions: Arc<Mutex<Vec<Submission>>>,
}

impl MemoryRepository {
    pub(super) fn seeded() -> Self {
        let repository = Self::default();
        {
            let mut events = repository.events.lock().expect("repository mutex poisoned");
            for event in [event(), code_only_event(), past_event()] {
                events.insert(event.id.clone(), event);
            }
        }
        {
            let mut candidates = repository
                .candidates
                .lock()
                .expect("repository mutex poisoned");
            for profile in self::candidates() {
                candidates.insert(profile.id.clone(), profile);
            }
        }
        *repository
            .submissions
            .lock()
            .expect("repository mutex poisoned") = submissions();
        repository
    }

    pub(super) fn participations(&self) -> Vec<Participation> {
        self.participations
            .lock()
            .expect("repository mutex poisoned")
            .clone()
    }
}

impl HackathonRepository for MemoryRepository {
    fn event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        let guard = self.events.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn event_by_code(&self, code: &str) -> Result<Option<Event>, RepositoryError> {
        let guard = self.events.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|event| event.unique_code == code)
            .cloned())
    }

    fn candidate(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError> {
        let guard = self.candidates.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn submissions_for_event(
        &self,
        id: &EventId,
        min_score: Option<f64>,
    ) -> Result<Vec<SubmissionWithProfile>, RepositoryError> {
        let submissions = self.submissions.lock().expect("repository mutex poisoned");
        let candidates = self.candidates.lock().expect("repository mutex poisoned");
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
        let guard = self.submissions.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|submission| &submission.id == id).cloned())
    }

    fn is_participant(
        &self,
        candidate: &CandidateId,
        event: &EventId,
    ) -> Result<bool, RepositoryError> {
        let guard = self
            .participations
            .lock()
            .expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .any(|entry| &entry.candidate_id == candidate && &entry.event_id == event))
    }

    fn insert_participation(&self, participation: Participation) -> Result<(), RepositoryError> {
        let mut guard = self
            .participations
            .lock()
            .expect("repository mutex poisoned");
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
        let mut guard = self.submissions.lock().expect("repository mutex poisoned");
        if ids
            .iter()
            .any(|id| !guard.iter().any(|submission| &submission.id == id))
        {
            return Err(RepositoryError::NotFound);
        }
        for submission in guard.iter_mut().filter(|submission| ids.contains(&submission.id)) {
            submission.is_shortlisted = value;
        }
        Ok(())
    }

    fn store_evaluation(
        &self,
        id: &SubmissionId,
        update: EvaluationUpdate,
    ) -> Result<Submission, RepositoryError> {
        let mut guard = self.submissions.lock().expect("repository mutex poisoned");
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

pub(super) struct UnavailableRepository;

impl HackathonRepository for UnavailableRepository {
    fn event(&self, _id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn event_by_code(&self, _code: &str) -> Result<Option<Event>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn candidate(&self, _id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn submissions_for_event(
        &self,
        _id: &EventId,
        _min_score: Option<f64>,
    ) -> Result<Vec<SubmissionWithProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn submission(&self, _id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn is_participant(
        &self,
        _candidate: &CandidateId,
        _event: &EventId,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_participation(&self, _participation: Participation) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_shortlisted(&self, _ids: &[SubmissionId], _value: bool) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn store_evaluation(
        &self,
        _id: &SubmissionId,
        _update: EvaluationUpdate,
    ) -> Result<Submission, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (HackathonService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::seeded());
    let service = HackathonService::new(repository.clone(), AnalyticsSettings::default());
    (service, repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
