use std::io::Write;

use serde::Serialize;

use super::views::LeaderboardEntry;

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "failed to write leaderboard export: {}", err),
            ExportError::Csv(err) => write!(f, "invalid leaderboard CSV row: {}", err),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            ExportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Serialize)]
struct LeaderboardRow<'a> {
    rank: usize,
    submission_id: &'a str,
    candidate_id: &'a str,
    name: &'a str,
    grade: &'a str,
    school: &'a str,
    state: &'a str,
    district: &'a str,
    gender: &'a str,
    total_score: f64,
    shortlisted: bool,
}

impl<'a> LeaderboardRow<'a> {
    fn from_entry(entry: &'a LeaderboardEntry) -> Self {
        let user = entry.user.as_ref();
        let text = |value: Option<&'a Option<String>>| {
            value.and_then(|inner| inner.as_deref()).unwrap_or("")
        };

        Self {
            rank: entry.rank,
            submission_id: &entry.submission_id.0,
            candidate_id: user.map(|summary| summary.id.0.as_str()).unwrap_or(""),
            name: text(user.map(|summary| &summary.name)),
            grade: text(user.map(|summary| &summary.grade)),
            school: text(user.map(|summary| &summary.school)),
            state: text(user.map(|summary| &summary.state)),
            district: text(user.map(|summary| &summary.district)),
            gender: text(user.map(|summary| &summary.gender)),
            total_score: entry.total_score,
            shortlisted: entry.is_shortlisted,
        }
    }
}

/// Writes ranked leaderboard rows as CSV with a header line. Orphaned
/// submissions get empty candidate columns.
pub fn write_leaderboard_csv<W: Write>(
    writer: W,
    entries: &[LeaderboardEntry],
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(LeaderboardRow::from_entry(entry))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::hackathon::analytics::views::CandidateSummary;
    use crate::workflows::hackathon::domain::{CandidateId, SubmissionId};

    fn entry(rank: usize, user: Option<CandidateSummary>) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            submission_id: SubmissionId(format!("sub-{rank}")),
            user,
            total_score: 7.5,
            parameter_scores: Vec::new(),
            is_shortlisted: rank == 1,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let summary = CandidateSummary {
            id: CandidateId("cand-1".to_string()),
            name: Some("Asha Rao".to_string()),
            grade: Some("10".to_string()),
            school: Some("Model School".to_string()),
            state: Some("Kerala".to_string()),
            district: None,
            gender: Some("female".to_string()),
        };

        let mut buffer = Vec::new();
        write_leaderboard_csv(&mut buffer, &[entry(1, Some(summary)), entry(2, None)])
            .expect("csv export");
        let output = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "rank,submission_id,candidate_id,name,grade,school,state,district,gender,total_score,shortlisted"
        );
        assert_eq!(
            lines[1],
            "1,sub-1,cand-1,Asha Rao,10,Model School,Kerala,,female,7.5,true"
        );
        assert_eq!(lines[2], "2,sub-2,,,,,,,,7.5,false");
    }
}
