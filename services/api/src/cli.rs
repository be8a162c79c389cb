use crate::commands::{run_check, run_cull, run_refine, run_review};
use crate::server;
use backlog_ready::error::AppError;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "backlog-ready",
    about = "Score issues against the Definition of Ready and report on backlog hygiene",
    version
)]
struct Cli {
    /// Definition of Ready YAML file (defaults to DOR_CONFIG_PATH or config/dor.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score issues from a JSON file against the Definition of Ready
    Check(CheckArgs),
    /// Print the content an external reviewer should judge for one issue
    Review(ReviewArgs),
    /// Find old, inactive, poorly refined issues worth closing
    Cull(CullArgs),
    /// Prepare the top of the backlog for a refinement session
    Refine(RefineArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Issue, array of issues, or search response
    pub(crate) issues: PathBuf,
    /// Emit results as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReviewArgs {
    /// A single raw issue record
    pub(crate) issue: PathBuf,
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CullArgs {
    pub(crate) issues: PathBuf,
    /// Override the age threshold in days
    #[arg(long)]
    pub(crate) age: Option<u32>,
    /// Override the no-activity threshold in days
    #[arg(long)]
    pub(crate) activity: Option<u32>,
    /// Override the minimum refinement score (DoR percentage)
    #[arg(long)]
    pub(crate) refinement: Option<f64>,
    /// Evaluate staleness as of this instant (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_now)]
    pub(crate) now: Option<DateTime<Utc>>,
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RefineArgs {
    pub(crate) issues: PathBuf,
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config_path = cli.config;
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args, config_path).await,
        Command::Check(args) => run_check(args, config_path),
        Command::Review(args) => run_review(args, config_path),
        Command::Cull(args) => run_cull(args, config_path),
        Command::Refine(args) => run_refine(args, config_path),
    }
}
