//! # Roster Sleuth Core Library
//!
//! This crate turns a raw roster of conference speakers into a vetted list of
//! senior executives: it repairs and loads the roster, keeps senior titles,
//! removes duplicates, resolves company websites, verifies employment
//! (manual overrides, company-site scrape, video-page OSINT), guesses
//! corporate email addresses and selects the final list by quality tier.
//!
//! It is designed to be used either directly as a library or via the
//! `roster-sleuth` command-line tool (which uses this library). Every stage
//! writes its artifact into the configured output directory so stages can be
//! run one at a time.

mod core;
pub mod pipeline;
pub mod utils;

pub use crate::core::config::{Config, ConfigBuilder, ConfigFile, ScrapeLimits, ScrapeMode};
pub use crate::core::error::{AppError, Result};
pub use crate::core::models::{
    DomainNote, EmailConfidence, ExecutiveRecord, PatternLogEntry, QualityTier, ResolutionConfidence,
    VerificationOverride, VerificationTemplateRow,
};
pub use crate::core::sleuth::{OsintSummary, ResolveSummary, RosterSleuth, ScrapeSummary};
pub use crate::pipeline::quality::QualityReport;
pub use crate::utils::http::{FetchedPage, HttpFetcher, PageFetcher};

use crate::pipeline::emails::PATTERN_LOG_COLUMNS;
use crate::pipeline::{assembly, dedup, emails, employment, io, loader, osint, quality, seniority};
use chrono::NaiveDate;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

/// File names of the artifacts each stage writes into the output directory.
pub mod artifacts {
    pub const CLEANED: &str = "final_cleaned_data.csv";
    pub const SENIOR: &str = "senior_execs_only.csv";
    pub const DEDUPED: &str = "senior_execs_no_duplicates.csv";
    pub const VALIDATED: &str = "senior_execs_validated.csv";
    pub const MANUAL_VERIFIED: &str = "step3b_verified.csv";
    pub const WEB_VERIFIED: &str = "step3c_verified_web.csv";
    pub const WITH_EMAILS: &str = "senior_execs_with_emails.csv";
    pub const PATTERN_LOG: &str = "email_patterns_used.csv";
    pub const OSINT_SCORED: &str = "step6_osint_scored.csv";
    pub const OSINT_TOP: &str = "step6_osint_top15.csv";
    pub const FINAL_LIST: &str = "final_executives_list.csv";
    pub const QUALITY_REPORT: &str = "quality_report.txt";
    pub const ASSEMBLED: &str = "final_50_with_osint.csv";
    pub const FINAL_TOP: &str = "final_top50_execs_with_emails.csv";
}

/// Full path of an artifact inside the configured output directory.
pub fn artifact_path(config: &Config, name: &str) -> PathBuf {
    config.output_dir.join(name)
}

/// Creates a `RosterSleuth` backed by the real HTTP client.
/// Essential for running the network stages.
pub fn initialize_sleuth(config: &Config) -> Result<RosterSleuth> {
    RosterSleuth::new(config)
}

/// Loads and repairs the raw roster, then writes the cleaned copy.
///
/// # Arguments
/// * `config` - The application configuration.
/// * `input` - Path of the raw roster CSV.
///
/// # Returns
/// * The cleaned records, each carrying its original row position.
pub fn run_clean(config: &Config, input: &Path) -> Result<Vec<ExecutiveRecord>> {
    let records = loader::load_raw_records(input)?;
    io::write_records(&artifact_path(config, artifacts::CLEANED), &records)?;
    Ok(records)
}

/// Keeps senior executives and writes them out.
pub fn run_filter(config: &Config, records: Vec<ExecutiveRecord>) -> Result<Vec<ExecutiveRecord>> {
    let senior = seniority::filter_senior_executives(records);
    io::write_records(&artifact_path(config, artifacts::SENIOR), &senior)?;
    Ok(senior)
}

/// Removes duplicate people and writes the survivors.
pub fn run_dedup(config: &Config, records: Vec<ExecutiveRecord>) -> Result<Vec<ExecutiveRecord>> {
    let (unique, _) = dedup::remove_duplicates(records);
    io::write_records(&artifact_path(config, artifacts::DEDUPED), &unique)?;
    Ok(unique)
}

/// Resolves company websites for every record.
pub async fn run_resolve(
    sleuth: &RosterSleuth,
    mut records: Vec<ExecutiveRecord>,
    progress: &ProgressBar,
) -> Result<Vec<ExecutiveRecord>> {
    sleuth.resolve_companies(&mut records, progress).await;
    io::write_records(&artifact_path(sleuth.config(), artifacts::VALIDATED), &records)?;
    Ok(records)
}

/// Employment verification: manual overrides (written as the 3b artifact),
/// then the company-site scrape (written as the 3c artifact).
///
/// # Arguments
/// * `sleuth` - An initialized `RosterSleuth`.
/// * `records` - Records with resolved websites.
/// * `progress` - Progress bar advanced once per record during the scrape.
/// * `today` - Date stamped on newly verified records.
pub async fn run_verify(
    sleuth: &RosterSleuth,
    mut records: Vec<ExecutiveRecord>,
    progress: &ProgressBar,
    today: NaiveDate,
) -> Result<Vec<ExecutiveRecord>> {
    let config = sleuth.config();
    employment::run_manual_verification(&mut records, config, today);
    io::write_records(&artifact_path(config, artifacts::MANUAL_VERIFIED), &records)?;

    sleuth.scrape_websites(&mut records, progress, today).await;
    io::write_records(&artifact_path(config, artifacts::WEB_VERIFIED), &records)?;
    Ok(records)
}

/// Generates candidate emails and writes the records plus the pattern log.
pub fn run_emails(config: &Config, mut records: Vec<ExecutiveRecord>) -> Result<Vec<ExecutiveRecord>> {
    let log = emails::generate_emails(&mut records);
    io::write_records(&artifact_path(config, artifacts::WITH_EMAILS), &records)?;
    io::write_rows(&artifact_path(config, artifacts::PATTERN_LOG), &log, &PATTERN_LOG_COLUMNS)?;
    Ok(records)
}

/// Scores every record from its video page and selects the top picks.
///
/// # Returns
/// * `(scored, top)` where `top` holds at most `osint_top_count` records.
pub async fn run_osint(
    sleuth: &RosterSleuth,
    mut records: Vec<ExecutiveRecord>,
    progress: &ProgressBar,
) -> Result<(Vec<ExecutiveRecord>, Vec<ExecutiveRecord>)> {
    let config = sleuth.config();
    sleuth.score_osint(&mut records, progress).await;
    io::write_records(&artifact_path(config, artifacts::OSINT_SCORED), &records)?;

    let top = osint::select_top_osint(&records, config.osint_min_confidence, config.osint_top_count);
    tracing::info!(target: "osint_task",
        "Selected {} OSINT picks (min confidence {})", top.len(), config.osint_min_confidence);
    io::write_records(&artifact_path(config, artifacts::OSINT_TOP), &top)?;
    Ok((records, top))
}

/// Selects the final list by quality tier and writes it with the text report.
pub fn run_quality(config: &Config, records: &[ExecutiveRecord]) -> Result<QualityReport> {
    let report = quality::run_quality_check(records, config);
    io::write_records(&artifact_path(config, artifacts::FINAL_LIST), &report.selected)?;
    io::write_text(&artifact_path(config, artifacts::QUALITY_REPORT), &report.render())?;
    Ok(report)
}

/// Combines website-verified records with the OSINT picks, then keeps one
/// row per person up to `target_count` with freshly generated emails.
///
/// # Returns
/// * The final top list. The combined rows before de-duplication are written
///   to the `ASSEMBLED` artifact, the returned list to `FINAL_TOP`.
pub fn run_assemble(
    config: &Config,
    records: &[ExecutiveRecord],
    osint_top: &[ExecutiveRecord],
) -> Result<Vec<ExecutiveRecord>> {
    let assembled = assembly::assemble_verified_with_osint(records, osint_top);
    io::write_records(&artifact_path(config, artifacts::ASSEMBLED), &assembled)?;

    let top = assembly::select_final_top(&assembled, config.target_count);
    io::write_records(&artifact_path(config, artifacts::FINAL_TOP), &top)?;
    Ok(top)
}

/// Reads a stage artifact (or any CSV with the standard columns).
pub fn read_artifact(path: &Path) -> Result<Vec<ExecutiveRecord>> {
    if !path.is_file() {
        return Err(AppError::InsufficientInput(format!(
            "'{}' does not exist; run the previous stage first or pass --input",
            path.display()
        )));
    }
    io::read_records(path)
}
