//! # Roster Sleuth CLI
//!
//! Command-line interface for the Roster Sleuth library (`roster_sleuth_core`).
//! This binary parses arguments, sets up configuration, and runs either one
//! pipeline stage or the whole workflow, reading and writing the stage
//! artifacts in the output directory.

use roster_sleuth_core::{
    artifact_path, artifacts, initialize_sleuth, read_artifact, run_assemble, run_clean,
    run_dedup, run_emails, run_filter, run_osint, run_quality, run_resolve, run_verify, Config,
    ConfigBuilder, ExecutiveRecord, QualityReport, RosterSleuth, ScrapeMode,
};

// Dependencies specific to the CLI binary
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

const DEFAULT_RAW_INPUT: &str = "data/cmo_videos_names.csv";

/// Website scrape depth.
#[derive(Copy, Clone, Debug, ValueEnum)]
enum ScrapeModeArg {
    /// Common leadership pages with a short per-record budget
    Normal,
    /// More pages, more sublinks, longer timeouts
    Accurate,
}

impl From<ScrapeModeArg> for ScrapeMode {
    fn from(value: ScrapeModeArg) -> Self {
        match value {
            ScrapeModeArg::Normal => ScrapeMode::Normal,
            ScrapeModeArg::Accurate => ScrapeMode::Accurate,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Vets senior executives from a speaker roster and guesses their corporate emails.",
    long_about = "Roster Sleuth cleans a roster of conference speakers, keeps senior executives, resolves company websites, verifies employment (manual overrides, website scrape, video-page OSINT) and selects a final list with candidate email addresses."
)]
struct AppArgs {
    #[command(subcommand)]
    command: Command,

    /// Path to a configuration file (TOML format) to load settings from. CLI args override file settings.
    #[arg(long, global = true, env = "ROSTER_SLEUTH_CONFIG")]
    config_file: Option<String>,

    /// Directory where every stage artifact is written.
    #[arg(short, long, global = true, env = "ROSTER_SLEUTH_OUTPUT_DIR")]
    output_dir: Option<String>,

    /// CSV of manual employment overrides (Name, Company, Employment Verified, Verification Source).
    #[arg(long, global = true, env = "ROSTER_SLEUTH_OVERRIDES_FILE")]
    overrides_file: Option<String>,

    /// User agent string for HTTP requests.
    #[arg(long, global = true, env = "ROSTER_SLEUTH_USER_AGENT")]
    user_agent: Option<String>,

    /// HTTP request timeout in seconds for website resolution.
    #[arg(long, global = true, env = "ROSTER_SLEUTH_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Minimum polite delay between records that hit the network, in seconds.
    #[arg(long, global = true, env = "ROSTER_SLEUTH_MIN_SLEEP")]
    min_sleep: Option<f32>,

    /// Maximum polite delay between records that hit the network, in seconds.
    #[arg(long, global = true, env = "ROSTER_SLEUTH_MAX_SLEEP")]
    max_sleep: Option<f32>,

    /// Website scrape depth.
    #[arg(long, global = true, value_enum, env = "ROSTER_SLEUTH_SCRAPE_MODE")]
    scrape_mode: Option<ScrapeModeArg>,

    /// Minimum OSINT confidence for a top pick.
    #[arg(long, global = true, env = "ROSTER_SLEUTH_OSINT_MIN_CONFIDENCE")]
    osint_min_confidence: Option<u8>,

    /// Number of OSINT top picks to keep.
    #[arg(long, global = true, env = "ROSTER_SLEUTH_OSINT_TOP_COUNT")]
    osint_top_count: Option<usize>,

    /// Number of executives in the final list.
    #[arg(long, global = true, env = "ROSTER_SLEUTH_TARGET_COUNT")]
    target_count: Option<usize>,
}

#[derive(Args, Debug)]
struct StageInput {
    /// Input CSV. Defaults to the previous stage's artifact in the output directory.
    #[arg(short, long)]
    input: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and repair the raw roster.
    Clean {
        /// Raw roster CSV.
        #[arg(short, long, default_value = DEFAULT_RAW_INPUT, env = "ROSTER_SLEUTH_INPUT")]
        input: String,
    },
    /// Keep senior executives only.
    Filter(StageInput),
    /// Remove duplicate people.
    Dedup(StageInput),
    /// Resolve company websites.
    Resolve(StageInput),
    /// Manual overrides, then the company website scrape.
    Verify(StageInput),
    /// Generate candidate email addresses.
    Emails(StageInput),
    /// Score video pages and pick the top OSINT records.
    Osint(StageInput),
    /// Select the final list by quality tier and write the report.
    Quality(StageInput),
    /// Combine website-verified records with the OSINT picks.
    Assemble {
        /// Records with emails. Defaults to the emails artifact.
        #[arg(short, long)]
        input: Option<String>,
        /// OSINT top picks. Defaults to the OSINT artifact.
        #[arg(long)]
        osint_top: Option<String>,
    },
    /// Run every stage in order.
    Run {
        /// Raw roster CSV.
        #[arg(short, long, default_value = DEFAULT_RAW_INPUT, env = "ROSTER_SLEUTH_INPUT")]
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_thread_names(true)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Setting up tracing subscriber failed")?;

    tracing::info!(
        "Roster Sleuth CLI v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let args = AppArgs::parse();
    tracing::debug!("Parsed CLI arguments: {:?}", args);

    let config = build_config(&args)?;
    tracing::debug!("Effective configuration loaded: {:?}", config);

    let start_time = Instant::now();
    let execution_result = run_command(&config, &args.command, start_time).await;

    if let Err(e) = execution_result {
        tracing::error!("Execution failed: {:#}", e);
        return Err(e);
    }

    tracing::info!(
        "Processing finished successfully. Total duration: {:.2?}",
        start_time.elapsed()
    );
    Ok(())
}

fn build_config(args: &AppArgs) -> Result<Config> {
    let mut config_builder = ConfigBuilder::new();

    if let Some(ref path) = args.config_file {
        config_builder = config_builder.config_file(path);
    }
    if let Some(ref dir) = args.output_dir {
        config_builder = config_builder.output_dir(dir);
    }
    if let Some(ref path) = args.overrides_file {
        config_builder = config_builder.overrides_file(path);
    }
    if let Some(ref ua) = args.user_agent {
        config_builder = config_builder.user_agent(ua);
    }
    if let Some(t) = args.request_timeout {
        config_builder = config_builder.request_timeout(Duration::from_secs(t));
    }
    if args.min_sleep.is_some() || args.max_sleep.is_some() {
        let defaults = Config::default().sleep_between_requests;
        config_builder = config_builder.sleep_between_requests(
            args.min_sleep.unwrap_or(defaults.0),
            args.max_sleep.unwrap_or(defaults.1),
        );
    }
    if let Some(mode) = args.scrape_mode {
        config_builder = config_builder.scrape_mode(mode.into());
    }
    if let Some(value) = args.osint_min_confidence {
        config_builder = config_builder.osint_min_confidence(value);
    }
    if let Some(value) = args.osint_top_count {
        config_builder = config_builder.osint_top_count(value);
    }
    if let Some(value) = args.target_count {
        config_builder = config_builder.target_count(value);
    }

    config_builder.build().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to build configuration: {}", e)
    })
}

fn init_sleuth(config: &Config) -> Result<RosterSleuth> {
    initialize_sleuth(config).map_err(|e| {
        tracing::error!("Initialization error: {}", e);
        anyhow::anyhow!("Failed to initialize RosterSleuth core: {}", e)
    })
}

fn stage_input(config: &Config, input: &Option<String>, default_artifact: &str) -> PathBuf {
    match input {
        Some(path) => PathBuf::from(path),
        None => artifact_path(config, default_artifact),
    }
}

fn load_stage_input(config: &Config, input: &Option<String>, default_artifact: &str) -> Result<Vec<ExecutiveRecord>> {
    let path = stage_input(config, input, default_artifact);
    tracing::info!("Loading records from '{}'...", path.display());
    read_artifact(&path).with_context(|| format!("Failed to load records from '{}'", path.display()))
}

fn new_progress_bar(len: usize, message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(ProgressStyle::default_bar()
         .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | ETA: {eta} | {msg}")
         .context("Failed to set progress bar template")?
         .progress_chars("=> "));
    pb.set_message(message);
    Ok(pb)
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

async fn run_command(config: &Config, command: &Command, start_time: Instant) -> Result<()> {
    match command {
        Command::Run { input } => run_workflow(config, PathBuf::from(input), start_time).await?,
        Command::Clean { input } => {
            let records = run_clean(config, &PathBuf::from(input))
                .with_context(|| format!("Failed to clean roster '{}'", input))?;
            tracing::info!("Cleaned {} records -> {}", records.len(), artifacts::CLEANED);
        }
        Command::Filter(stage) => {
            let records = load_stage_input(config, &stage.input, artifacts::CLEANED)?;
            let senior = run_filter(config, records).context("Filter stage failed")?;
            tracing::info!("Kept {} senior executives -> {}", senior.len(), artifacts::SENIOR);
        }
        Command::Dedup(stage) => {
            let records = load_stage_input(config, &stage.input, artifacts::SENIOR)?;
            let unique = run_dedup(config, records).context("Dedup stage failed")?;
            tracing::info!("{} unique executives -> {}", unique.len(), artifacts::DEDUPED);
        }
        Command::Resolve(stage) => {
            let records = load_stage_input(config, &stage.input, artifacts::DEDUPED)?;
            let sleuth = init_sleuth(config)?;
            let pb = new_progress_bar(records.len(), "Resolving company websites...")?;
            let resolved = run_resolve(&sleuth, records, &pb).await.context("Resolve stage failed")?;
            pb.finish_with_message(format!("Resolved {} records", resolved.len()));
        }
        Command::Verify(stage) => {
            let records = load_stage_input(config, &stage.input, artifacts::VALIDATED)?;
            let sleuth = init_sleuth(config)?;
            let pb = new_progress_bar(records.len(), "Scanning company websites...")?;
            let verified = run_verify(&sleuth, records, &pb, today())
                .await
                .context("Verify stage failed")?;
            let count = verified.iter().filter(|r| r.employment_verified).count();
            pb.finish_with_message(format!("{} of {} verified", count, verified.len()));
        }
        Command::Emails(stage) => {
            let records = load_stage_input(config, &stage.input, artifacts::WEB_VERIFIED)?;
            let with_emails = run_emails(config, records).context("Emails stage failed")?;
            let generated = with_emails.iter().filter(|r| r.has_email_1()).count();
            tracing::info!("Generated emails for {} of {} records", generated, with_emails.len());
        }
        Command::Osint(stage) => {
            let records = load_stage_input(config, &stage.input, artifacts::WITH_EMAILS)?;
            let sleuth = init_sleuth(config)?;
            let pb = new_progress_bar(records.len(), "Scoring video pages...")?;
            let (scored, top) = run_osint(&sleuth, records, &pb).await.context("OSINT stage failed")?;
            pb.finish_with_message(format!("Scored {} records, {} top picks", scored.len(), top.len()));
        }
        Command::Quality(stage) => {
            let records = load_stage_input(config, &stage.input, artifacts::WITH_EMAILS)?;
            let report = run_quality(config, &records).context("Quality stage failed")?;
            print!("{}", report.render());
        }
        Command::Assemble { input, osint_top } => {
            let records = load_stage_input(config, input, artifacts::WITH_EMAILS)?;
            let top = load_stage_input(config, osint_top, artifacts::OSINT_TOP)?;
            let assembled = run_assemble(config, &records, &top).context("Assemble stage failed")?;
            tracing::info!("Final top list of {} records -> {}", assembled.len(), artifacts::FINAL_TOP);
        }
    }
    Ok(())
}

/// Counts gathered across a full run for the closing summary.
#[derive(Debug, Default)]
struct WorkflowCounts {
    loaded: usize,
    senior: usize,
    unique: usize,
    with_website: usize,
    verified: usize,
    with_emails: usize,
    osint_picks: usize,
    assembled: usize,
}

async fn run_workflow(config: &Config, input: PathBuf, start_time: Instant) -> Result<()> {
    tracing::info!(
        "Running full workflow. Input: '{}', Output directory: '{}' (Scrape mode: {})",
        input.display(),
        config.output_dir.display(),
        config.scrape_mode
    );
    let sleuth = init_sleuth(config)?;
    let mut counts = WorkflowCounts::default();

    let cleaned = run_clean(config, &input)
        .with_context(|| format!("Failed to clean roster '{}'", input.display()))?;
    counts.loaded = cleaned.len();
    if cleaned.is_empty() {
        tracing::warn!("Input file '{}' contains no usable rows. Nothing to do.", input.display());
        return Ok(());
    }

    let senior = run_filter(config, cleaned).context("Filter stage failed")?;
    counts.senior = senior.len();
    let unique = run_dedup(config, senior).context("Dedup stage failed")?;
    counts.unique = unique.len();

    let pb = new_progress_bar(unique.len(), "Resolving company websites...")?;
    let resolved = run_resolve(&sleuth, unique, &pb).await.context("Resolve stage failed")?;
    pb.finish_with_message("Company websites resolved");
    counts.with_website = resolved.iter().filter(|r| r.has_website()).count();

    let pb = new_progress_bar(resolved.len(), "Scanning company websites...")?;
    let verified = run_verify(&sleuth, resolved, &pb, today())
        .await
        .context("Verify stage failed")?;
    pb.finish_with_message("Website scan finished");
    counts.verified = verified.iter().filter(|r| r.employment_verified).count();

    let with_emails = run_emails(config, verified).context("Emails stage failed")?;
    counts.with_emails = with_emails.iter().filter(|r| r.has_email_1()).count();

    let pb = new_progress_bar(with_emails.len(), "Scoring video pages...")?;
    let (_, osint_top) = run_osint(&sleuth, with_emails.clone(), &pb)
        .await
        .context("OSINT stage failed")?;
    pb.finish_with_message("Video pages scored");
    counts.osint_picks = osint_top.len();

    let report = run_quality(config, &with_emails).context("Quality stage failed")?;
    let assembled = run_assemble(config, &with_emails, &osint_top).context("Assemble stage failed")?;
    counts.assembled = assembled.len();

    log_summary(&counts, &report, start_time.elapsed());
    Ok(())
}

/// Logs a summary of the workflow to the console using `tracing::info`.
fn log_summary(counts: &WorkflowCounts, report: &QualityReport, duration: Duration) {
    tracing::info!("-------------------- Workflow Summary --------------------");
    tracing::info!("Rows Loaded From Roster     : {}", counts.loaded);
    tracing::info!("  - Senior Executives       : {}", counts.senior);
    tracing::info!("  - After Deduplication     : {}", counts.unique);
    tracing::info!("  - With Company Website    : {}", counts.with_website);
    tracing::info!("  - Employment Verified     : {}", counts.verified);
    tracing::info!("  - With Candidate Emails   : {}", counts.with_emails);
    tracing::info!("  - OSINT Top Picks         : {}", counts.osint_picks);
    tracing::info!("Final List                  : {} / {}", report.selected.len(), report.target);
    tracing::info!("Final top list (Verified + OSINT): {}", counts.assembled);
    for issue in &report.issues {
        tracing::warn!("Quality issue: {}", issue);
    }
    tracing::info!("Total Time Taken            : {:.2?}", duration);
    tracing::info!("----------------------------------------------------------");
}
