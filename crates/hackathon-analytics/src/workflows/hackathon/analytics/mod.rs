//! Read-side analytics over an event's submissions: insights, rankings,
//! partitions, and shortlisting. Every builder here is a pure function over
//! already-fetched data; the service layer owns storage access.

mod clusters;
mod export;
mod insights;
mod leaderboard;
mod shortlist;
mod sort_key;
pub mod views;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::criteria::DemographicFilter;
use super::domain::{DemographicField, ParameterId};

pub use clusters::{build_clusters, partition, ClusterStrategy};
pub use export::{write_leaderboard_csv, ExportError};
pub use insights::build_insights;
pub use leaderboard::build_leaderboard;
pub use shortlist::{select_shortlist, ParameterScoreRequirement, ShortlistCriteria};
pub use sort_key::{sort_rows, SortDirection, SortKey, SortTarget};
pub use views::{
    CandidateSummary, ClusterMember, ClusterView, DemographicInsights, InsightsReport,
    Leaderboard, LeaderboardEntry, LeaderboardGroup, MemberSummary, OverallScores,
    ParameterInsight, ParameterScore, PerformerSummary, ShortlistEntry, TopPerformer,
};

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 100;
pub const DEFAULT_TOP_PERFORMERS: usize = 5;
pub const DEFAULT_CLUSTER_COUNT: usize = 3;

/// Insights request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct InsightsQuery {
    pub demographic_filters: DemographicFilter,
    /// Minimum score per parameter id; adds `aboveThreshold` to that parameter's insight.
    pub parameter_criteria: BTreeMap<ParameterId, f64>,
    pub score_threshold: f64,
}

/// Leaderboard request body. `limit: None` falls back to the configured default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct LeaderboardQuery {
    pub filters: DemographicFilter,
    pub group_by: Option<DemographicField>,
    pub sort_by: String,
    pub sort_order: SortDirection,
    pub limit: Option<usize>,
    pub min_score: Option<f64>,
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self {
            filters: DemographicFilter::new(),
            group_by: None,
            sort_by: "totalScore".to_string(),
            sort_order: SortDirection::Desc,
            limit: None,
            min_score: None,
        }
    }
}

impl LeaderboardQuery {
    pub fn sort_key(&self) -> SortKey {
        SortKey::parse(&self.sort_by)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ClusterRequest {
    pub cluster_by: ClusterStrategy,
    pub num_clusters: usize,
    /// Parameter ids or names to use as features; empty means all.
    pub parameters: Vec<String>,
    pub filters: DemographicFilter,
}

impl Default for ClusterRequest {
    fn default() -> Self {
        Self {
            cluster_by: ClusterStrategy::default(),
            num_clusters: DEFAULT_CLUSTER_COUNT,
            parameters: Vec::new(),
            filters: DemographicFilter::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ShortlistRequest {
    pub criteria: ShortlistCriteria,
    pub auto_shortlist: bool,
}
