use crate::infra::{load_snapshot, parse_instant, parse_label, InMemoryHackathonRepository, Snapshot};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use hackathon_analytics::config::AppConfig;
use hackathon_analytics::error::AppError;
use hackathon_analytics::workflows::hackathon::scoring;
use hackathon_analytics::workflows::hackathon::{
    write_leaderboard_csv, AnalyticsSettings, CandidateId, CandidateProfile, ClusterRequest,
    ClusterStrategy, Constraint, DemographicField, DemographicFilter, EligibilityRule, Evaluation,
    Event, EventId, HackathonService, InsightsQuery, InsightsReport, Leaderboard,
    LeaderboardQuery, Parameter, ParameterId, ParameterScoreRequirement, ShortlistCriteria,
    ShortlistRequest, SortDirection, Submission, SubmissionId, DEFAULT_CLUSTER_COUNT,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

type SnapshotService = HackathonService<InMemoryHackathonRepository>;

#[derive(Args, Debug)]
pub(crate) struct SnapshotArgs {
    /// JSON snapshot with events, candidates, participations and submissions
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Event id to report on
    #[arg(long)]
    pub(crate) event: String,
}

#[derive(Args, Debug)]
pub(crate) struct InsightsArgs {
    #[command(flatten)]
    pub(crate) source: SnapshotArgs,
    /// Demographic filter as FIELD=VALUE; repeat a field to accept several values
    #[arg(long, value_parser = parse_filter)]
    pub(crate) filter: Vec<(DemographicField, String)>,
    /// Per-parameter threshold as PARAMETER_ID=SCORE
    #[arg(long = "parameter-min", value_parser = parse_minimum)]
    pub(crate) parameter_min: Vec<(String, f64)>,
    /// Overall score threshold counted in the report
    #[arg(long, default_value_t = 0.0)]
    pub(crate) threshold: f64,
}

#[derive(Args, Debug)]
pub(crate) struct LeaderboardArgs {
    #[command(flatten)]
    pub(crate) source: SnapshotArgs,
    /// Demographic filter as FIELD=VALUE; repeat a field to accept several values
    #[arg(long, value_parser = parse_filter)]
    pub(crate) filter: Vec<(DemographicField, String)>,
    /// Group rows by a demographic field (e.g. state, grade, schoolName)
    #[arg(long, value_parser = parse_label::<DemographicField>)]
    pub(crate) group_by: Option<DemographicField>,
    /// Sort path such as totalScore or parameters.Innovation
    #[arg(long, default_value = "totalScore")]
    pub(crate) sort_by: String,
    /// Sort direction (asc or desc)
    #[arg(long, value_parser = parse_label::<SortDirection>, default_value = "desc")]
    pub(crate) order: SortDirection,
    /// Maximum number of ranked rows
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Only include submissions scoring at least this total
    #[arg(long)]
    pub(crate) min_score: Option<f64>,
    /// Write the ranked rows to a CSV file instead of printing JSON
    #[arg(long, conflicts_with = "group_by")]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ClusterArgs {
    #[command(flatten)]
    pub(crate) source: SnapshotArgs,
    /// Partitioning strategy (parameters, demographics or scores)
    #[arg(long, value_parser = parse_label::<ClusterStrategy>, default_value = "parameters")]
    pub(crate) by: ClusterStrategy,
    /// Number of buckets
    #[arg(long, default_value_t = DEFAULT_CLUSTER_COUNT)]
    pub(crate) clusters: usize,
    /// Restrict centroids to these parameter ids or names
    #[arg(long)]
    pub(crate) parameter: Vec<String>,
    /// Demographic filter as FIELD=VALUE; repeat a field to accept several values
    #[arg(long, value_parser = parse_filter)]
    pub(crate) filter: Vec<(DemographicField, String)>,
}

#[derive(Args, Debug)]
pub(crate) struct ShortlistArgs {
    #[command(flatten)]
    pub(crate) source: SnapshotArgs,
    /// Minimum weighted total score
    #[arg(long)]
    pub(crate) min_total_score: Option<f64>,
    /// Per-parameter minimum as PARAMETER=SCORE, matched by id then by name
    #[arg(long = "parameter-min", value_parser = parse_minimum)]
    pub(crate) parameter_min: Vec<(String, f64)>,
    /// Demographic filter as FIELD=VALUE; repeat a field to accept several values
    #[arg(long, value_parser = parse_filter)]
    pub(crate) filter: Vec<(DemographicField, String)>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Number of synthetic candidates to seed
    #[arg(long, default_value_t = 24)]
    pub(crate) candidates: usize,
    /// Reference instant (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
}

pub(crate) fn run_insights_report(args: InsightsArgs) -> Result<(), AppError> {
    let service = open_snapshot(&args.source)?;
    let query = InsightsQuery {
        demographic_filters: demographic_filter(&args.filter),
        parameter_criteria: args
            .parameter_min
            .into_iter()
            .map(|(id, score)| (ParameterId(id), score))
            .collect(),
        score_threshold: args.threshold,
    };

    let report = service.insights(&EventId(args.source.event), &query)?;
    print_json(&report);
    Ok(())
}

pub(crate) fn run_leaderboard_report(args: LeaderboardArgs) -> Result<(), AppError> {
    let service = open_snapshot(&args.source)?;
    let query = LeaderboardQuery {
        filters: demographic_filter(&args.filter),
        group_by: args.group_by,
        sort_by: args.sort_by,
        sort_order: args.order,
        limit: args.limit,
        min_score: args.min_score,
    };

    let leaderboard = service.leaderboard(&EventId(args.source.event), &query)?;
    match (args.csv, &leaderboard) {
        (Some(path), Leaderboard::Ranked(entries)) => {
            let file = File::create(&path)?;
            write_leaderboard_csv(BufWriter::new(file), entries)?;
            println!("Wrote {} ranked rows to {}", entries.len(), path.display());
        }
        _ => print_json(&leaderboard),
    }
    Ok(())
}

pub(crate) fn run_cluster_report(args: ClusterArgs) -> Result<(), AppError> {
    let service = open_snapshot(&args.source)?;
    let request = ClusterRequest {
        cluster_by: args.by,
        num_clusters: args.clusters,
        parameters: args.parameter,
        filters: demographic_filter(&args.filter),
    };

    let clusters = service.clusters(&EventId(args.source.event), &request)?;
    print_json(&clusters);
    Ok(())
}

pub(crate) fn run_shortlist_report(args: ShortlistArgs) -> Result<(), AppError> {
    let service = open_snapshot(&args.source)?;
    let demographics = if args.filter.is_empty() {
        None
    } else {
        Some(demographic_filter(&args.filter))
    };
    let request = ShortlistRequest {
        criteria: ShortlistCriteria {
            min_total_score: args.min_total_score,
            parameter_scores: args
                .parameter_min
                .into_iter()
                .map(|(key, min_score)| ParameterScoreRequirement {
                    parameter_id: Some(ParameterId(key.clone())),
                    parameter_name: Some(key),
                    min_score,
                })
                .collect(),
            demographics,
        },
        auto_shortlist: false,
    };

    let entries = service.shortlist(&EventId(args.source.event), &request)?;
    print_json(&entries);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = args.now.unwrap_or_else(Utc::now);
    let snapshot = synthetic_snapshot(now, args.candidates.max(1));
    let event = snapshot
        .events
        .first()
        .cloned()
        .ok_or_else(|| AppError::Io(std::io::Error::other("demo snapshot has no event")))?;
    let candidate_ids: Vec<CandidateId> = snapshot
        .candidates
        .iter()
        .map(|profile| profile.id.clone())
        .collect();
    let service = HackathonService::new(
        Arc::new(InMemoryHackathonRepository::from_snapshot(snapshot)),
        AnalyticsSettings::default(),
    );

    println!("Hackathon analytics demo");
    println!(
        "Event: {} ({} -> {}, join code {})",
        event.title,
        event.start_date.date_naive(),
        event.end_date.date_naive(),
        event.unique_code
    );

    let report = service.insights(&event.id, &InsightsQuery::default())?;
    render_insights(&report);

    println!("\nLeaderboard (top 5)");
    let top = LeaderboardQuery {
        limit: Some(5),
        ..LeaderboardQuery::default()
    };
    if let Leaderboard::Ranked(entries) = service.leaderboard(&event.id, &top)? {
        for entry in entries {
            let name = entry
                .user
                .as_ref()
                .and_then(|user| user.name.as_deref())
                .unwrap_or("(no profile)");
            println!(
                "{:>3}. {:<10} {:<16} {:.2}",
                entry.rank, entry.submission_id.0, name, entry.total_score
            );
        }
    }

    println!("\nStates by average score");
    let by_state = LeaderboardQuery {
        group_by: Some(DemographicField::State),
        sort_by: "averageScore".to_string(),
        ..LeaderboardQuery::default()
    };
    if let Leaderboard::Grouped(groups) = service.leaderboard(&event.id, &by_state)? {
        for group in groups {
            println!(
                "- {}: {} submissions | average {:.2}",
                group.group_name, group.submission_count, group.average_score
            );
        }
    }

    for strategy in [
        ClusterStrategy::Parameters,
        ClusterStrategy::Scores,
        ClusterStrategy::Demographics,
    ] {
        let request = ClusterRequest {
            cluster_by: strategy,
            ..ClusterRequest::default()
        };
        println!("\nClusters by {}", strategy.label());
        for cluster in service.clusters(&event.id, &request)? {
            println!(
                "- {}: {} members | average {:.2}",
                cluster.cluster_name, cluster.size, cluster.average_score
            );
        }
    }

    let request = ShortlistRequest {
        criteria: ShortlistCriteria {
            min_total_score: Some(6.0),
            parameter_scores: vec![ParameterScoreRequirement {
                parameter_id: None,
                parameter_name: Some("Innovation".to_string()),
                min_score: 7.0,
            }],
            demographics: None,
        },
        auto_shortlist: true,
    };
    let passing = service.shortlist(&event.id, &request)?;
    let shortlisted = service.shortlisted(&event.id)?;
    println!(
        "\nShortlist: {} submissions passed (total >= 6, Innovation >= 7); {} now flagged",
        passing.len(),
        shortlisted.len()
    );

    println!("\nEnrollment");
    for candidate in candidate_ids.iter().take(3) {
        let decision = service.check_eligibility(candidate, &event.id)?;
        println!("- {}: {}", candidate.0, decision.summary());
    }
    if let Some(candidate) = candidate_ids.first() {
        match service.register_participant(candidate, &event.id, now) {
            Ok(_) => println!("- {} registered through the rules", candidate.0),
            Err(err) => {
                println!("- {} registration refused: {}", candidate.0, err);
                let joined = service.join_by_code(candidate, &event.unique_code, now)?;
                println!(
                    "- {} joined {} with the event code",
                    joined.candidate_id.0, joined.event_id.0
                );
            }
        }
    }

    Ok(())
}

fn render_insights(report: &InsightsReport) {
    println!("\nInsights ({} submissions)", report.total_submissions);
    if let Some(demographics) = &report.demographic_insights {
        println!("By state:");
        for (state, count) in &demographics.by_state {
            println!("  - {}: {}", state, count);
        }
    }
    for (name, insight) in &report.parameter_insights {
        println!(
            "- {}: average {:.2} | high {:.1} | low {:.1}",
            name, insight.average, insight.highest, insight.lowest
        );
    }
    if let Some(overall) = &report.overall_scores {
        println!("Overall average {:.2}", overall.average);
        for (label, pct) in overall.distribution.buckets() {
            println!("  {:>7}: {:.0}%", label, pct);
        }
    }
}

fn open_snapshot(source: &SnapshotArgs) -> Result<SnapshotService, AppError> {
    let settings = AppConfig::load()?.analytics;
    let snapshot = load_snapshot(&source.snapshot)?;
    Ok(HackathonService::new(
        Arc::new(InMemoryHackathonRepository::from_snapshot(snapshot)),
        settings,
    ))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("report unavailable: {}", err),
    }
}

pub(crate) fn parse_filter(raw: &str) -> Result<(DemographicField, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = parse_label::<DemographicField>(field)?;
    Ok((field, value.trim().to_string()))
}

pub(crate) fn parse_minimum(raw: &str) -> Result<(String, f64), String> {
    let (key, score) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PARAMETER=SCORE, got '{raw}'"))?;
    let score = score
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid score in '{raw}' ({err})"))?;
    Ok((key.trim().to_string(), score))
}

/// Repeated fields collapse into a one-of constraint.
pub(crate) fn demographic_filter(pairs: &[(DemographicField, String)]) -> DemographicFilter {
    let mut grouped: Vec<(DemographicField, Vec<String>)> = Vec::new();
    for (field, value) in pairs {
        match grouped.iter_mut().find(|(existing, _)| existing == field) {
            Some((_, values)) => values.push(value.clone()),
            None => grouped.push((*field, vec![value.clone()])),
        }
    }

    grouped
        .into_iter()
        .map(|(field, mut values)| {
            let constraint = if values.len() == 1 {
                Constraint::equals(values.remove(0))
            } else {
                Constraint::one_of(values)
            };
            (field, constraint)
        })
        .collect()
}

const FIRST_NAMES: [&str; 12] = [
    "Aarav", "Bhavna", "Chirag", "Divya", "Eshan", "Fatima", "Gaurav", "Hema", "Ishaan", "Jaya",
    "Kabir", "Lata",
];
const STATES: [&str; 4] = ["Kerala", "Karnataka", "Tamil Nadu", "Goa"];
const SCHOOLS: [&str; 3] = ["Model School", "Hill School", "City School"];
const GRADES: [&str; 5] = ["8", "9", "10", "11", "12"];

/// Deterministic event with candidates and submissions for the demo command.
pub(crate) fn synthetic_snapshot(now: DateTime<Utc>, candidates: usize) -> Snapshot {
    let parameters = vec![
        demo_parameter("innovation", "Innovation", 40.0),
        demo_parameter("execution", "Execution", 35.0),
        demo_parameter("presentation", "Presentation", 25.0),
    ];
    let event = Event {
        id: EventId("demo-hack".to_string()),
        title: "Demo Hackathon".to_string(),
        description: "Synthetic event seeded by the demo command".to_string(),
        start_date: now - Duration::days(7),
        end_date: now + Duration::days(7),
        unique_code: "DEMO24".to_string(),
        parameters: parameters.clone(),
        eligibility_criteria: vec![
            EligibilityRule::Grade {
                values: vec!["9".into(), "10".into(), "11".into(), "12".into()],
            },
            EligibilityRule::State {
                values: vec!["Goa".into()],
            },
        ],
    };

    let profiles: Vec<CandidateProfile> = (0..candidates)
        .map(|index| CandidateProfile {
            id: CandidateId(format!("cand-{:02}", index + 1)),
            full_name: Some(FIRST_NAMES[index % FIRST_NAMES.len()].to_string()),
            role: Some("student".to_string()),
            grade: Some(GRADES[index % GRADES.len()].to_string()),
            school_name: Some(SCHOOLS[index % SCHOOLS.len()].to_string()),
            school_college_name: None,
            state: Some(STATES[index % STATES.len()].to_string()),
            district: None,
            gender: Some(if index % 2 == 0 { "female" } else { "male" }.to_string()),
            phone_number: Some(format!("+91-98{:08}", index + 1)),
        })
        .collect();

    let mut submissions: Vec<Submission> = profiles
        .iter()
        .enumerate()
        .map(|(index, profile)| {
            let evaluation = if index % 6 == 5 {
                Vec::new()
            } else {
                parameters
                    .iter()
                    .enumerate()
                    .map(|(offset, parameter)| Evaluation {
                        parameter_id: parameter.id.clone(),
                        parameter_name: parameter.name.clone(),
                        score: ((index * (7 - 2 * offset) + 3 * (offset + 1)) % 11) as f64,
                        feedback: None,
                    })
                    .collect()
            };
            demo_submission(
                format!("sub-{:02}", index + 1),
                profile.id.clone(),
                &event,
                evaluation,
                now,
            )
        })
        .collect();
    submissions.push(demo_submission(
        "sub-orphan".to_string(),
        CandidateId("cand-removed".to_string()),
        &event,
        parameters
            .iter()
            .map(|parameter| Evaluation {
                parameter_id: parameter.id.clone(),
                parameter_name: parameter.name.clone(),
                score: 5.0,
                feedback: None,
            })
            .collect(),
        now,
    ));

    Snapshot {
        events: vec![event],
        candidates: profiles,
        participations: Vec::new(),
        submissions,
    }
}

fn demo_parameter(id: &str, name: &str, weight: f64) -> Parameter {
    Parameter {
        id: ParameterId(id.to_string()),
        name: name.to_string(),
        weight,
        description: String::new(),
    }
}

fn demo_submission(
    id: String,
    candidate_id: CandidateId,
    event: &Event,
    evaluation: Vec<Evaluation>,
    now: DateTime<Utc>,
) -> Submission {
    let total_score = scoring::total_score(&evaluation, &event.parameters);
    let evaluated_at = (!evaluation.is_empty()).then(|| now - Duration::days(1));
    Submission {
        id: SubmissionId(id),
        candidate_id,
        event_id: event.id.clone(),
        submission_text: Some("Prototype walkthrough".to_string()),
        attachments: Vec::new(),
        evaluation,
        total_score,
        is_shortlisted: false,
        feedback: None,
        submitted_at: now - Duration::days(3),
        evaluated_at,
    }
}
