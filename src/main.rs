//! Command-line interface for the orgstats binary.
//!
//! `collect` gathers contributor statistics for every repository of an
//! organization and writes a JSON report; `repos` prints the repositories the
//! collector would visit.

use std::{
    io,
    path::{Path, PathBuf},
    process,
    sync::Arc,
};

use clap::{ArgAction, Args, Parser, Subcommand};
use orgstats::{
    CollectorConfig, Error, GitHubSource, OrganizationCollector, Report, load_config,
    validate_organization, write_report,
};
use tracing_subscriber::EnvFilter;

/// Command line interface for collecting organization contributor statistics.
#[derive(Debug, Parser,)]
#[command(name = "orgstats", version, about = "Aggregate contributor statistics for a GitHub organization")]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Collect statistics for every repository and write a report.
    Collect(CollectArgs,),
    /// List the repositories of an organization as JSON.
    Repos(ReposArgs,),
}

/// Connection arguments shared by every subcommand.
#[derive(Debug, Args,)]
struct RemoteArgs
{
    /// Organization whose repositories are analysed.
    #[arg(long = "organization", env = "GITHUB_ORG", value_name = "ORG")]
    organization: String,

    /// GitHub token used to authenticate API requests.
    #[arg(long = "token", env = "GITHUB_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    token: String,

    /// Optional YAML file with collector settings.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,
}

#[derive(Debug, Args,)]
struct CollectArgs
{
    #[command(flatten)]
    remote: RemoteArgs,

    /// Destination of the JSON report.
    #[arg(long = "output", value_name = "PATH", default_value = "stats.json")]
    output: PathBuf,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

#[derive(Debug, Args,)]
struct ReposArgs
{
    #[command(flatten)]
    remote: RemoteArgs,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);
    tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates configuration, collection and report errors.
async fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();

    match cli.command {
        Command::Collect(args,) => run_collect(args,).await,
        Command::Repos(args,) => run_repos(args,).await,
    }
}

async fn run_collect(args: CollectArgs,) -> Result<(), Error,>
{
    let (organization, collector,) = prepare(&args.remote,)?;

    let snapshot = collector.run(&organization,).await?;
    let report = Report::from_snapshot(&organization, &snapshot,);

    write_report(&args.output, &report, args.pretty,)
}

async fn run_repos(args: ReposArgs,) -> Result<(), Error,>
{
    let (organization, collector,) = prepare(&args.remote,)?;

    let repositories = collector.list_repositories(&organization,).await?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer(&mut handle, &repositories,)?;

    Ok((),)
}

/// Validates inputs and builds a collector backed by the GitHub API.
fn prepare(args: &RemoteArgs,) -> Result<(String, OrganizationCollector<GitHubSource,>,), Error,>
{
    let organization = validate_organization(&args.organization,)?;
    let config = resolve_config(args.config.as_deref(),)?;
    let source = GitHubSource::from_token(&args.token,)?;

    Ok((organization, OrganizationCollector::new(Arc::new(source,), config,),),)
}

fn resolve_config(path: Option<&Path,>,) -> Result<CollectorConfig, Error,>
{
    match path {
        Some(path,) => load_config(path,),
        None => Ok(CollectorConfig::default(),),
    }
}
