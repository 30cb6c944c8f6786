use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{CandidateProfile, DemographicField};

/// Field constraints keyed by demographic field; every entry must hold.
pub type DemographicFilter = BTreeMap<DemographicField, Constraint>;

/// A single field constraint: exact equality or membership in a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constraint {
    OneOf(Vec<ScalarValue>),
    Equals(ScalarValue),
}

impl Constraint {
    pub fn equals(value: impl Into<String>) -> Self {
        Self::Equals(ScalarValue(value.into()))
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(
            values
                .into_iter()
                .map(|value| ScalarValue(value.into()))
                .collect(),
        )
    }

    fn accepts(&self, value: &str) -> bool {
        match self {
            Constraint::OneOf(values) => values.iter().any(|candidate| candidate.0 == value),
            Constraint::Equals(expected) => expected.0 == value,
        }
    }
}

/// Scalar filter value. JSON numbers and booleans are accepted and compared by
/// their textual form, since profile fields such as grade are stored as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScalarValue(pub String);

impl<'de> Deserialize<'de> for ScalarValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawScalar {
            Text(String),
            Integer(i64),
            Float(f64),
            Flag(bool),
        }

        let value = match RawScalar::deserialize(deserializer)? {
            RawScalar::Text(text) => text,
            RawScalar::Integer(number) => number.to_string(),
            RawScalar::Float(number) => number.to_string(),
            RawScalar::Flag(flag) => flag.to_string(),
        };
        Ok(Self(value))
    }
}

/// Stateless predicate shared by every analytics read path.
pub struct CriteriaMatcher;

impl CriteriaMatcher {
    /// An empty filter accepts everything, including orphaned submissions
    /// without a profile. A non-empty filter rejects a missing profile.
    pub fn matches(profile: Option<&CandidateProfile>, constraints: &DemographicFilter) -> bool {
        if constraints.is_empty() {
            return true;
        }

        let Some(profile) = profile else {
            return false;
        };

        constraints.iter().all(|(field, constraint)| {
            profile
                .field(*field)
                .map(|value| constraint.accepts(value))
                .unwrap_or(false)
        })
    }

    pub fn filter<'a, T, F>(
        items: &'a [T],
        constraints: &DemographicFilter,
        profile: F,
    ) -> Vec<&'a T>
    where
        F: Fn(&T) -> Option<&CandidateProfile>,
    {
        items
            .iter()
            .filter(|item| Self::matches(profile(*item), constraints))
            .collect()
    }
}
