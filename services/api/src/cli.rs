use crate::demo::{
    run_cluster_report, run_demo, run_insights_report, run_leaderboard_report,
    run_shortlist_report, ClusterArgs, DemoArgs, InsightsArgs, LeaderboardArgs, ShortlistArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hackathon_analytics::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Hackathon Analytics",
    about = "Serve and inspect hackathon eligibility and organizer analytics",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the insights report for an event in a snapshot
    Insights(InsightsArgs),
    /// Print or export the leaderboard for an event in a snapshot
    Leaderboard(LeaderboardArgs),
    /// Partition an event's submissions into named buckets
    Clusters(ClusterArgs),
    /// Evaluate shortlist criteria against an event's submissions
    Shortlist(ShortlistArgs),
    /// Seed a synthetic event and print every report
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON snapshot used to seed the in-memory store
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Insights(args) => run_insights_report(args),
        Command::Leaderboard(args) => run_leaderboard_report(args),
        Command::Clusters(args) => run_cluster_report(args),
        Command::Shortlist(args) => run_shortlist_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
