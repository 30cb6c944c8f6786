use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::criteria::ScalarValue;

/// Identifier wrapper for hackathon events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Identifier wrapper for candidate (student) accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

/// Identifier wrapper for scoring parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParameterId(pub String);

/// Demographic attributes of a candidate, owned by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub id: CandidateId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub school_college_name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl CandidateProfile {
    /// Raw value of a demographic field, without any fallback.
    pub fn field(&self, field: DemographicField) -> Option<&str> {
        let value = match field {
            DemographicField::FullName => &self.full_name,
            DemographicField::PhoneNumber => &self.phone_number,
            DemographicField::Role => &self.role,
            DemographicField::Grade => &self.grade,
            DemographicField::SchoolName => &self.school_name,
            DemographicField::SchoolCollegeName => &self.school_college_name,
            DemographicField::State => &self.state,
            DemographicField::District => &self.district,
            DemographicField::Gender => &self.gender,
        };
        value.as_deref()
    }

    /// Institution name: `schoolName` when present, else `schoolCollegeName`.
    pub fn institution(&self) -> Option<&str> {
        non_blank(self.school_name.as_deref())
            .or_else(|| non_blank(self.school_college_name.as_deref()))
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

/// Closed set of profile fields that filters and group-by requests may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DemographicField {
    FullName,
    PhoneNumber,
    Role,
    Grade,
    SchoolName,
    SchoolCollegeName,
    State,
    District,
    Gender,
}

impl DemographicField {
    pub const fn label(self) -> &'static str {
        match self {
            DemographicField::FullName => "fullName",
            DemographicField::PhoneNumber => "phoneNumber",
            DemographicField::Role => "role",
            DemographicField::Grade => "grade",
            DemographicField::SchoolName => "schoolName",
            DemographicField::SchoolCollegeName => "schoolCollegeName",
            DemographicField::State => "state",
            DemographicField::District => "district",
            DemographicField::Gender => "gender",
        }
    }
}

/// Weighted scoring dimension authored by the organizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub id: ParameterId,
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

/// Declarative rule constraining who may join an event without a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "criteriaType", rename_all = "camelCase")]
pub enum EligibilityRule {
    Grade {
        #[serde(default, deserialize_with = "scalar_strings")]
        values: Vec<String>,
    },
    School {
        #[serde(default, deserialize_with = "scalar_strings")]
        values: Vec<String>,
    },
    State {
        #[serde(default, deserialize_with = "scalar_strings")]
        values: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    PhoneNumbers {
        #[serde(default)]
        phone_numbers: Vec<String>,
    },
    CodeOnly,
}

// Rule values are matched as text; numeric grades such as `[9, 10]` are accepted.
fn scalar_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<ScalarValue>::deserialize(deserializer)?;
    Ok(values.into_iter().map(|value| value.0).collect())
}

impl EligibilityRule {
    pub const fn kind(&self) -> RuleKind {
        match self {
            EligibilityRule::Grade { .. } => RuleKind::Grade,
            EligibilityRule::School { .. } => RuleKind::School,
            EligibilityRule::State { .. } => RuleKind::State,
            EligibilityRule::PhoneNumbers { .. } => RuleKind::PhoneNumbers,
            EligibilityRule::CodeOnly => RuleKind::CodeOnly,
        }
    }
}

/// Discriminant of an [`EligibilityRule`], used in decision reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Grade,
    School,
    State,
    PhoneNumbers,
    CodeOnly,
}

impl RuleKind {
    pub const fn label(self) -> &'static str {
        match self {
            RuleKind::Grade => "grade",
            RuleKind::School => "school",
            RuleKind::State => "state",
            RuleKind::PhoneNumbers => "phone number",
            RuleKind::CodeOnly => "join code",
        }
    }
}

/// Competition instance with its scoring parameters and eligibility rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub unique_code: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub eligibility_criteria: Vec<EligibilityRule>,
}

impl Event {
    pub fn status(&self, now: DateTime<Utc>) -> EventStatus {
        if now < self.start_date {
            EventStatus::Upcoming
        } else if now > self.end_date {
            EventStatus::Completed
        } else {
            EventStatus::Ongoing
        }
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == EventStatus::Completed
    }

    pub fn parameter(&self, id: &ParameterId) -> Option<&Parameter> {
        self.parameters.iter().find(|parameter| &parameter.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl EventStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
        }
    }
}

/// Record that a candidate joined an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub candidate_id: CandidateId,
    pub event_id: EventId,
    pub registered_at: DateTime<Utc>,
}

/// Score awarded against one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub parameter_id: ParameterId,
    #[serde(default)]
    pub parameter_name: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Opaque reference to an uploaded file held by the object storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    pub filename: String,
    pub storage_key: String,
    #[serde(default)]
    pub mimetype: Option<String>,
}

/// A candidate's entry to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub candidate_id: CandidateId,
    pub event_id: EventId,
    #[serde(default)]
    pub submission_text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default)]
    pub evaluation: Vec<Evaluation>,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub is_shortlisted: bool,
    #[serde(default)]
    pub feedback: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl Submission {
    /// Evaluation matched by parameter id first, then by parameter name.
    pub fn evaluation_for(
        &self,
        parameter_id: Option<&ParameterId>,
        parameter_name: Option<&str>,
    ) -> Option<&Evaluation> {
        parameter_id
            .and_then(|id| self.evaluation.iter().find(|item| &item.parameter_id == id))
            .or_else(|| {
                parameter_name.and_then(|name| {
                    self.evaluation
                        .iter()
                        .find(|item| item.parameter_name == name)
                })
            })
    }
}

/// Submission joined with its candidate profile; the profile is absent for orphaned entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionWithProfile {
    pub submission: Submission,
    pub candidate: Option<CandidateProfile>,
}

impl SubmissionWithProfile {
    pub fn total_score(&self) -> f64 {
        self.submission.total_score
    }
}
