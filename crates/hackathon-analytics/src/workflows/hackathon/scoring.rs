use serde::Serialize;

use super::domain::{Evaluation, Parameter};

/// Percentage of values per fixed bucket. Upper bounds are inclusive, so a
/// value of exactly 20 lands in `0-20`. Buckets assume a 0-100 scale even
/// though parameter scores are authored on 0-10.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreDistribution {
    #[serde(rename = "0-20")]
    pub up_to_20: f64,
    #[serde(rename = "21-40")]
    pub up_to_40: f64,
    #[serde(rename = "41-60")]
    pub up_to_60: f64,
    #[serde(rename = "61-80")]
    pub up_to_80: f64,
    #[serde(rename = "81-100")]
    pub up_to_100: f64,
}

impl ScoreDistribution {
    pub fn buckets(&self) -> [(&'static str, f64); 5] {
        [
            ("0-20", self.up_to_20),
            ("21-40", self.up_to_40),
            ("41-60", self.up_to_60),
            ("61-80", self.up_to_80),
            ("81-100", self.up_to_100),
        ]
    }

    pub fn total(&self) -> f64 {
        self.buckets().iter().map(|(_, pct)| pct).sum()
    }
}

/// Count and share of values at or above a threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ThresholdSummary {
    pub count: usize,
    pub percentage: f64,
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn highest(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

pub fn lowest(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

pub fn distribution(values: &[f64]) -> ScoreDistribution {
    let mut counts = [0usize; 5];
    for &value in values {
        let bucket = if value <= 20.0 {
            0
        } else if value <= 40.0 {
            1
        } else if value <= 60.0 {
            2
        } else if value <= 80.0 {
            3
        } else {
            4
        };
        counts[bucket] += 1;
    }

    if values.is_empty() {
        return ScoreDistribution::default();
    }

    let total = values.len() as f64;
    let pct = |count: usize| count as f64 / total * 100.0;
    ScoreDistribution {
        up_to_20: pct(counts[0]),
        up_to_40: pct(counts[1]),
        up_to_60: pct(counts[2]),
        up_to_80: pct(counts[3]),
        up_to_100: pct(counts[4]),
    }
}

pub fn threshold_count(values: &[f64], threshold: f64) -> ThresholdSummary {
    let count = values.iter().filter(|&&value| value >= threshold).count();
    let percentage = if values.is_empty() {
        0.0
    } else {
        count as f64 / values.len() as f64 * 100.0
    };
    ThresholdSummary { count, percentage }
}

/// Weighted total: `score * weight / 100` for every evaluation whose parameter
/// id exists on the event. Evaluations for unknown parameters are skipped.
pub fn total_score(evaluations: &[Evaluation], parameters: &[Parameter]) -> f64 {
    evaluations
        .iter()
        .filter_map(|evaluation| {
            parameters
                .iter()
                .find(|parameter| parameter.id == evaluation.parameter_id)
                .map(|parameter| evaluation.score * (parameter.weight / 100.0))
        })
        .sum()
}
