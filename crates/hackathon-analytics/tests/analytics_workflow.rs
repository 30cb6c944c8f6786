//! Integration scenarios for the organizer analytics and enrollment workflow.
//!
//! Scenarios load events, profiles and submissions from JSON documents and drive them through the
//! public service facade so ranking, shortlisting and registration are validated together.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use hackathon_analytics::workflows::hackathon::{
        AnalyticsSettings, CandidateId, CandidateProfile, EvaluationUpdate, Event, EventId,
        HackathonRepository, HackathonService, Participation, RepositoryError, Submission,
        SubmissionId, SubmissionWithProfile,
    };

    pub(super) fn event() -> Event {
        serde_json::from_value(json!({
            "id": "spring-hack",
            "title": "Spring Hack",
            "startDate": "2025-03-01T09:00:00Z",
            "endDate": "2099-03-03T18:00:00Z",
            "uniqueCode": "SPRING",
            "parameters": [
                { "id": "idea", "name": "Idea", "weight": 50 },
                { "id": "impact", "name": "Impact", "weight": 50 }
            ],
            "eligibilityCriteria": [
                { "criteriaType": "state", "values": ["Goa"] },
                { "criteriaType": "phoneNumbers", "phoneNumbers": ["+91-1111"] }
            ]
        }))
        .expect("event document")
    }

    pub(super) fn profiles() -> Vec<CandidateProfile> {
        serde_json::from_value(json!([
            { "id": "u1", "fullName": "Meera", "grade": "11", "state": "Goa", "gender": "female" },
            { "id": "u2", "fullName": "Nikhil", "grade": "12", "state": "Goa", "gender": "male" },
            { "id": "u3", "fullName": "Omar", "grade": "11", "state": "Delhi",
              "phoneNumber": "+91-1111", "gender": "male" },
            { "id": "u4", "fullName": "Priya", "grade": "12", "state": "Delhi", "gender": "female" }
        ]))
        .expect("profile documents")
    }

    pub(super) fn submissions() -> Vec<Submission> {
        serde_json::from_value(json!([
            { "id": "a", "candidateId": "u1", "eventId": "spring-hack",
              "submittedAt": "2025-03-02T10:00:00Z", "totalScore": 9.0,
              "evaluation": [
                  { "parameterId": "idea", "parameterName": "Idea", "score": 10 },
                  { "parameterId": "impact", "parameterName": "Impact", "score": 8 }
              ] },
            { "id": "b", "candidateId": "u2", "eventId": "spring-hack",
              "submittedAt": "2025-03-02T11:00:00Z", "totalScore": 5.0,
              "evaluation": [
                  { "parameterId": "idea", "parameterName": "Idea", "score": 4 },
                  { "parameterId": "impact", "parameterName": "Impact", "score": 6 }
              ] },
            { "id": "c", "candidateId": "u3", "eventId": "spring-hack",
              "submittedAt": "2025-03-02T12:00:00Z", "totalScore": 7.0,
              "evaluation": [
                  { "parameterId": "idea", "parameterName": "Idea", "score": 7 },
                  { "parameterId": "impact", "parameterName": "Impact", "score": 7 }
              ] },
            { "id": "d", "candidateId": "u4", "eventId": "spring-hack",
              "submittedAt": "2025-03-02T13:00:00Z" }
        ]))
        .expect("submission documents")
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryRepository {
        events: Arc<Mutex<HashMap<EventId, Event>>>,
        candidates: Arc<Mutex<HashMap<CandidateId, CandidateProfile>>>,
        participations: Arc<Mutex<Vec<Participation>>>,
        submissions: Arc<Mutex<Vec<Submission>>>,
    }

    impl MemoryRepository {
        pub(super) fn seeded() -> Self {
            let repository = Self::default();
            let event = event();
            repository
                .events
                .lock()
                .expect("lock")
                .insert(event.id.clone(), event);
            repository.candidates.lock().expect("lock").extend(
                profiles()
                    .into_iter()
                    .map(|profile| (profile.id.clone(), profile)),
            );
            *repository.submissions.lock().expect("lock") = submissions();
            repository
        }
    }

    impl HackathonRepository for MemoryRepository {
        fn event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
            Ok(self.events.lock().expect("lock").get(id).cloned())
        }

        fn event_by_code(&self, code: &str) -> Result<Option<Event>, RepositoryError> {
            let guard = self.events.lock().expect("lock");
            Ok(guard
                .values()
                .find(|event| event.unique_code == code)
                .cloned())
        }

        fn candidate(
            &self,
            id: &CandidateId,
        ) -> Result<Option<CandidateProfile>, RepositoryError> {
            Ok(self.candidates.lock().expect("lock").get(id).cloned())
        }

        fn submissions_for_event(
            &self,
            id: &EventId,
            min_score: Option<f64>,
        ) -> Result<Vec<SubmissionWithProfile>, RepositoryError> {
            let submissions = self.submissions.lock().expect("lock");
            let candidates = self.candidates.lock().expect("lock");
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
            let guard = self.submissions.lock().expect("lock");
            Ok(guard.iter().find(|submission| &submission.id == id).cloned())
        }

        fn is_participant(
            &self,
            candidate: &CandidateId,
            event: &EventId,
        ) -> Result<bool, RepositoryError> {
            let guard = self.participations.lock().expect("lock");
            Ok(guard
                .iter()
                .any(|entry| &entry.candidate_id == candidate && &entry.event_id == event))
        }

        fn insert_participation(
            &self,
            participation: Participation,
        ) -> Result<(), RepositoryError> {
            let mut guard = self.participations.lock().expect("lock");
            if guard.contains(&participation) {
                return Err(RepositoryError::Conflict);
            }
            guard.push(participation);
            Ok(())
        }

        fn set_shortlisted(
            &self,
            ids: &[SubmissionId],
            value: bool,
        ) -> Result<(), RepositoryError> {
            let mut guard = self.submissions.lock().expect("lock");
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
            let mut guard = self.submissions.lock().expect("lock");
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

    pub(super) fn build_service() -> HackathonService<MemoryRepository> {
        HackathonService::new(
            Arc::new(MemoryRepository::seeded()),
            AnalyticsSettings::default(),
        )
    }

    pub(super) fn event_id() -> EventId {
        EventId("spring-hack".to_string())
    }
}

mod analytics {
    use super::common::*;
    use serde_json::json;

    use hackathon_analytics::workflows::hackathon::{
        ClusterRequest, InsightsQuery, Leaderboard, LeaderboardQuery, ShortlistRequest,
    };

    #[test]
    fn leaderboard_ranks_public_documents() {
        let service = build_service();

        let leaderboard = service
            .leaderboard(&event_id(), &LeaderboardQuery::default())
            .expect("leaderboard");

        let Leaderboard::Ranked(entries) = leaderboard else {
            panic!("expected ranked rows");
        };
        let order: Vec<&str> = entries
            .iter()
            .map(|entry| entry.submission_id.0.as_str())
            .collect();
        assert_eq!(order, ["a", "c", "b", "d"]);
    }

    #[test]
    fn insights_and_clusters_agree_on_population() {
        let service = build_service();

        let report = service
            .insights(&event_id(), &InsightsQuery::default())
            .expect("insights");
        let request: ClusterRequest =
            serde_json::from_value(json!({ "clusterBy": "demographics", "numClusters": 5 }))
                .expect("cluster request");
        let clusters = service.clusters(&event_id(), &request).expect("clusters");

        let clustered: usize = clusters.iter().map(|cluster| cluster.size).sum();
        assert_eq!(report.total_submissions, 4);
        assert_eq!(clustered, 4);
        let names: Vec<&str> = clusters
            .iter()
            .map(|cluster| cluster.cluster_name.as_str())
            .collect();
        assert_eq!(names, ["Grade 11", "Grade 12"]);
    }

    #[test]
    fn auto_shortlist_then_list_shortlisted() {
        let service = build_service();
        let request: ShortlistRequest = serde_json::from_value(json!({
            "criteria": {
                "parameterScores": [{ "parameterId": "impact", "minScore": 7 }],
                "demographics": { "gender": "male" }
            },
            "autoShortlist": true
        }))
        .expect("shortlist request");

        let passing = service.shortlist(&event_id(), &request).expect("shortlist");
        let listed = service.shortlisted(&event_id()).expect("shortlisted");

        assert_eq!(passing.len(), 1);
        assert_eq!(passing[0].submission_id.0, "c");
        assert_eq!(listed.len(), 1);
    }
}

mod enrollment {
    use super::common::*;
    use chrono::{TimeZone, Utc};

    use hackathon_analytics::workflows::hackathon::{
        CandidateId, EligibilityDecision, EligibleReason, HackathonServiceError,
        IneligibleReason, RuleKind,
    };

    #[test]
    fn rules_are_checked_in_declared_order() {
        let service = build_service();

        let by_state = service
            .check_eligibility(&CandidateId("u1".to_string()), &event_id())
            .expect("check");
        let by_phone = service
            .check_eligibility(&CandidateId("u3".to_string()), &event_id())
            .expect("check");

        assert_eq!(
            by_state,
            EligibilityDecision::Eligible(EligibleReason::RuleMatched(RuleKind::State))
        );
        assert_eq!(
            by_phone,
            EligibilityDecision::Eligible(EligibleReason::RuleMatched(RuleKind::PhoneNumbers))
        );
    }

    #[test]
    fn ineligible_candidates_can_still_join_with_the_code() {
        let service = build_service();
        let now = Utc
            .with_ymd_and_hms(2025, 3, 2, 9, 0, 0)
            .single()
            .expect("valid instant");
        let candidate = CandidateId("u4".to_string());

        let refused = service
            .register_participant(&candidate, &event_id(), now)
            .expect_err("no rule matches");
        assert!(matches!(
            refused,
            HackathonServiceError::NotEligible(IneligibleReason::NoRuleMatched)
        ));

        let joined = service
            .join_by_code(&candidate, "SPRING", now)
            .expect("join by code");
        assert_eq!(joined.event_id, event_id());

        let decision = service
            .check_eligibility(&candidate, &event_id())
            .expect("check");
        assert_eq!(
            decision,
            EligibilityDecision::Eligible(EligibleReason::ExistingParticipant)
        );
    }
}
