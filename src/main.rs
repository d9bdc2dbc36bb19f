//! Command-line interface for the issue-fanout binary.
//!
//! Without a mode flag the CLI creates the issue in every listed repository.
//! `--sample-output` writes an organization-balanced sample instead and
//! `--stats` prints read-only statistics; neither mode contacts GitHub.

use std::{
    io,
    path::{Path, PathBuf},
    process,
};

use clap::{ArgAction, Parser, ValueEnum};
use issue_fanout::{
    BatchRunner, DiversitySampler, Error, GithubIssueCreator, IssueContent, NullObserver,
    ProgressDisplay, ProgressStore, RetryPolicy, RetryingAction, RunConfig, RunMode, RunObserver,
    Sample, Statistics, load_target_list, write_target_list,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Command line interface for creating one issue across many repositories.
#[derive(Debug, Parser,)]
#[command(
    name = "issue-fanout",
    version,
    about = "Create the same GitHub issue across many repositories"
)]
struct Cli
{
    /// GitHub token used to create issues.
    #[arg(short = 't', long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// Path to the repositories list (JSON array, or YAML for .yaml/.yml).
    #[arg(short = 'r', long = "repos", value_name = "PATH", default_value = "repositories.json")]
    repos: PathBuf,

    /// Path to the issue content Markdown file.
    #[arg(short = 'i', long = "issue", value_name = "PATH", default_value = "issue_content.md")]
    issue: PathBuf,

    /// Path to the progress JSON file.
    #[arg(short = 'p', long = "progress", value_name = "PATH", default_value = "progress.json")]
    progress: PathBuf,

    /// Limit the number of issues to create, one repository per organization.
    #[arg(short = 'l', long = "limit", value_name = "N")]
    limit: Option<usize,>,

    /// Write an organization-balanced sample of unprocessed repositories to
    /// PATH instead of creating issues.
    #[arg(long = "sample-output", value_name = "PATH", conflicts_with = "stats")]
    sample_output: Option<PathBuf,>,

    /// Print statistics about the repositories list and progress file.
    #[arg(long = "stats", action = ArgAction::SetTrue)]
    stats: bool,

    /// Maximum number of issues created per rolling hour.
    #[arg(long = "per-hour", value_name = "N", default_value_t = 10)]
    per_hour: u32,

    /// Additional attempts after a failed issue creation.
    #[arg(long = "max-retries", value_name = "N", default_value_t = 3)]
    max_retries: u32,

    /// Seconds to wait between attempts.
    #[arg(long = "retry-delay-secs", value_name = "SECONDS", default_value_t = 5)]
    retry_delay_secs: u64,

    /// Seed for reproducible sampling.
    #[arg(long = "seed", value_name = "N")]
    seed: Option<u64,>,

    /// Disable the terminal progress bars.
    #[arg(long = "no-progress", action = ArgAction::SetTrue)]
    no_progress: bool,

    /// Log line format written to stderr.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum,)]
enum LogFormat
{
    Text,
    Json,
}

impl Cli
{
    fn into_config(self,) -> RunConfig
    {
        let mode = match (self.stats, self.sample_output,) {
            (true, _,) => RunMode::Statistics,
            (false, Some(output,),) => RunMode::Sample {
                output,
            },
            (false, None,) => RunMode::Create,
        };

        RunConfig {
            token: self.token,
            repositories_path: self.repos,
            issue_path: self.issue,
            progress_path: self.progress,
            limit: self.limit,
            per_hour: self.per_hour,
            retry: RetryPolicy {
                retry_budget: self.max_retries,
                delay:        std::time::Duration::from_secs(self.retry_delay_secs,),
            },
            seed: self.seed,
            mode,
        }
    }
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    if let Err(error,) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates fatal errors: missing credentials, unreadable or malformed
/// input files and progress that can no longer be persisted.
async fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();
    init_tracing(cli.log_format,);
    let show_progress = !cli.no_progress;

    let config = cli.into_config();
    config.validate()?;

    match &config.mode {
        RunMode::Statistics => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            run_statistics(&config, &mut handle,)
        }
        RunMode::Sample {
            output,
        } => run_sample(&config, output,).map(|_| (),),
        RunMode::Create if show_progress => run_create(&config, ProgressDisplay::new(),).await,
        RunMode::Create => run_create(&config, NullObserver,).await,
    }
}

fn init_tracing(format: LogFormat,)
{
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);
    let registry = tracing_subscriber::registry().with(env_filter,);

    match format {
        LogFormat::Text => {
            registry
                .with(fmt::layer().with_target(false,).with_writer(io::stderr,),)
                .try_init()
                .ok();
        }
        LogFormat::Json => {
            registry
                .with(fmt::layer().with_target(false,).json().with_writer(io::stderr,),)
                .try_init()
                .ok();
        }
    }
}

fn sampler_for(config: &RunConfig,) -> DiversitySampler
{
    match config.seed {
        Some(seed,) => DiversitySampler::seeded(seed,),
        None => DiversitySampler::from_entropy(),
    }
}

/// Prints statistics as pretty JSON.
fn run_statistics<W: io::Write,>(config: &RunConfig, writer: &mut W,) -> Result<(), Error,>
{
    let targets = load_target_list(&config.repositories_path,)?;
    let progress = ProgressStore::load(&config.progress_path,)?;

    let statistics = Statistics::collect(&targets, &progress,);
    serde_json::to_writer_pretty(&mut *writer, &statistics,)?;
    writeln!(writer).map_err(|source| issue_fanout::io_error(Path::new("<stdout>",), source,),)
}

/// Samples unprocessed targets and writes them to `output`.
fn run_sample(config: &RunConfig, output: &Path,) -> Result<Sample, Error,>
{
    let targets = load_target_list(&config.repositories_path,)?;
    let progress = ProgressStore::load(&config.progress_path,)?;

    let sample = sampler_for(config,).sample(&targets, &progress, config.limit,);
    write_target_list(output, &sample.selected,)?;

    info!(
        "Wrote {} repositories from {} unprocessed organizations to {}",
        sample.selected.len(),
        sample.organizations,
        output.display()
    );

    Ok(sample,)
}

/// Creates the issue in every selected repository.
async fn run_create<O: RunObserver,>(config: &RunConfig, observer: O,) -> Result<(), Error,>
{
    let token = config.require_token()?;
    let targets = load_target_list(&config.repositories_path,)?;
    let content = IssueContent::load(&config.issue_path,)?;
    let progress = ProgressStore::load(&config.progress_path,)?;
    let governor = config.rate_governor()?;

    let selected = match config.limit {
        Some(limit,) if limit > 0 => {
            let sample = sampler_for(config,).sample(&targets, &progress, Some(limit,),);
            info!(
                "Processing {} repositories out of {} unprocessed organizations",
                sample.selected.len(),
                sample.organizations
            );
            for target in &sample.selected {
                info!("Selected {}", target);
            }
            sample.selected
        }
        _ => targets.clone(),
    };

    if selected.is_empty() {
        warn!("No repositories left to process");
    }

    let creator = GithubIssueCreator::new(token,)?;
    let action = RetryingAction::new(creator, config.retry,);
    let mut runner = BatchRunner::with_observer(action, governor, progress, content, observer,);
    let summary = runner.run_selected(targets.len(), &selected,).await?;

    println!("Process completed. Check {} for results.", config.progress_path.display());
    println!();
    println!("{summary}");

    Ok((),)
}

#[cfg(test)]
mod tests
{
    use std::{fs, io::Cursor};

    use clap::Parser;
    use issue_fanout::{Outcome, RunMode};
    use tempfile::tempdir;

    use super::{Cli, LogFormat, run_sample, run_statistics};

    #[test]
    fn cli_defaults_match_documented_paths()
    {
        let cli = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "--token", "ghp_token",],)
            .expect("failed to parse CLI",);

        assert_eq!(cli.log_format, LogFormat::Text);
        let config = cli.into_config();
        assert_eq!(config.repositories_path.to_str(), Some("repositories.json"));
        assert_eq!(config.issue_path.to_str(), Some("issue_content.md"));
        assert_eq!(config.progress_path.to_str(), Some("progress.json"));
        assert_eq!(config.per_hour, 10);
        assert_eq!(config.retry.retry_budget, 3);
        assert_eq!(config.mode, RunMode::Create);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn short_flags_are_accepted()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "-t",
            "ghp_token",
            "-r",
            "repos.yaml",
            "-i",
            "issue.md",
            "-p",
            "state.json",
            "-l",
            "5",
        ],)
        .expect("failed to parse CLI",);

        let config = cli.into_config();
        assert_eq!(config.limit, Some(5));
        assert_eq!(config.repositories_path.to_str(), Some("repos.yaml"));
        assert_eq!(config.progress_path.to_str(), Some("state.json"));
    }

    #[test]
    fn stats_and_sample_modes_are_exclusive()
    {
        let result = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "--stats",
            "--sample-output",
            "sample.json",
        ],);
        assert!(result.is_err());
    }

    #[test]
    fn sample_output_selects_sample_mode()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "--sample-output",
            "sample.json",
            "--limit",
            "2",
        ],)
        .expect("failed to parse CLI",);

        let config = cli.into_config();
        assert!(matches!(config.mode, RunMode::Sample { .. }));
        assert!(config.validate().is_ok(), "sample mode must not need a token");
    }

    #[test]
    fn statistics_report_counts_without_writing()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let repos = temp.path().join("repositories.json",);
        let progress = temp.path().join("progress.json",);
        fs::write(&repos, r#"["A/1", "A/2", "B/1"]"#,).expect("failed to write repos",);
        fs::write(&progress, r#"{"A/1": "https://github.com/A/1/issues/1"}"#,)
            .expect("failed to write progress",);
        let before = fs::read_to_string(&progress,).expect("failed to read progress",);

        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "--stats",
            "--repos",
            repos.to_str().expect("utf8",),
            "--progress",
            progress.to_str().expect("utf8",),
        ],)
        .expect("failed to parse CLI",);
        let config = cli.into_config();

        let mut buffer = Cursor::new(Vec::new(),);
        run_statistics(&config, &mut buffer,).expect("statistics failed",);

        let report: serde_json::Value =
            serde_json::from_slice(&buffer.into_inner(),).expect("valid json",);
        assert_eq!(report["processed_repos"], 1);
        assert_eq!(report["unique_repos"], 2);
        assert_eq!(report["unique_orgs"], 1);
        assert_eq!(fs::read_to_string(&progress,).expect("failed to read progress",), before);
    }

    #[test]
    fn sample_mode_writes_one_repository_per_organization()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let repos = temp.path().join("repositories.json",);
        let progress = temp.path().join("progress.json",);
        let output = temp.path().join("sample.json",);
        fs::write(&repos, r#"["A/1", "A/2", "A/3", "B/1", "C/1", "C/2"]"#,)
            .expect("failed to write repos",);
        fs::write(&progress, r#"{"B/1": "https://github.com/B/1/issues/1"}"#,)
            .expect("failed to write progress",);

        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "--repos",
            repos.to_str().expect("utf8",),
            "--progress",
            progress.to_str().expect("utf8",),
            "--sample-output",
            output.to_str().expect("utf8",),
            "--limit",
            "5",
            "--seed",
            "11",
        ],)
        .expect("failed to parse CLI",);
        let config = cli.into_config();

        let sample = run_sample(&config, &output,).expect("sampling failed",);
        assert_eq!(sample.selected.len(), 2);

        let written: Vec<String,> =
            serde_json::from_str(&fs::read_to_string(&output,).expect("sample written",),)
                .expect("valid json",);
        assert_eq!(written, sample.selected);
        assert!(written.iter().all(|target| !target.starts_with("B/")));

        let progress_store =
            issue_fanout::ProgressStore::load(&progress,).expect("failed to load progress",);
        assert_eq!(progress_store.get("B/1"), Some(&Outcome::Success(
            "https://github.com/B/1/issues/1".to_owned()
        )));
    }

    #[test]
    fn malformed_progress_is_fatal()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let repos = temp.path().join("repositories.json",);
        let progress = temp.path().join("progress.json",);
        fs::write(&repos, r#"["A/1"]"#,).expect("failed to write repos",);
        fs::write(&progress, "[1, 2",).expect("failed to write progress",);

        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "--stats",
            "--repos",
            repos.to_str().expect("utf8",),
            "--progress",
            progress.to_str().expect("utf8",),
        ],)
        .expect("failed to parse CLI",);

        let mut buffer = Cursor::new(Vec::new(),);
        let error = run_statistics(&cli.into_config(), &mut buffer,)
            .expect_err("expected persistence error",);
        assert!(matches!(error, issue_fanout::Error::Persistence { .. }));
    }
}
