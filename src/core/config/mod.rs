//! Runtime configuration: defaults, the on-disk TOML shape, and the builder.

mod builder;
mod loading;
mod validation;

pub use builder::ConfigBuilder;
pub(crate) use crate::core::error::Result;

use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Depth of the website scrape used for employment verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeMode {
    #[default]
    Normal,
    #[serde(alias = "max", alias = "deep")]
    Accurate,
}

impl ScrapeMode {
    pub fn limits(self) -> ScrapeLimits {
        match self {
            ScrapeMode::Normal => ScrapeLimits {
                request_timeout: Duration::from_secs(5),
                per_record_budget: Duration::from_secs(30),
                max_main_pages: 8,
                max_total_pages: 12,
                sublinks_per_page: 5,
                extract_links_limit: 10,
            },
            ScrapeMode::Accurate => ScrapeLimits {
                request_timeout: Duration::from_secs(10),
                per_record_budget: Duration::from_secs(90),
                max_main_pages: 12,
                max_total_pages: 20,
                sublinks_per_page: 10,
                extract_links_limit: 15,
            },
        }
    }
}

impl FromStr for ScrapeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(ScrapeMode::Normal),
            "accurate" | "max" | "deep" => Ok(ScrapeMode::Accurate),
            other => Err(format!("unknown scrape mode '{}'", other)),
        }
    }
}

impl fmt::Display for ScrapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeMode::Normal => write!(f, "normal"),
            ScrapeMode::Accurate => write!(f, "accurate"),
        }
    }
}

/// Crawl limits for one record in the website scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeLimits {
    pub request_timeout: Duration,
    pub per_record_budget: Duration,
    pub max_main_pages: usize,
    pub max_total_pages: usize,
    pub sublinks_per_page: usize,
    pub extract_links_limit: usize,
}

/// Effective configuration used by every stage.
#[derive(Debug, Clone)]
pub struct Config {
    // Network
    pub request_timeout: Duration,
    pub sleep_between_requests: (f32, f32),
    pub user_agent: String,

    // Scraping
    pub scrape_mode: ScrapeMode,
    pub extra_scrape_pages: Vec<String>,

    // OSINT
    pub osint_request_timeout: Duration,
    pub osint_min_confidence: u8,
    pub osint_top_count: usize,

    // Selection
    pub target_count: usize,
    pub email_regex: Regex,

    // Paths
    pub output_dir: PathBuf,
    pub overrides_file: Option<PathBuf>,

    // Resolver
    pub extra_company_domains: BTreeMap<String, String>,

    pub loaded_config_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            sleep_between_requests: (0.2, 1.0),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            scrape_mode: ScrapeMode::Normal,
            extra_scrape_pages: Vec::new(),
            osint_request_timeout: Duration::from_secs(5),
            osint_min_confidence: 60,
            osint_top_count: 15,
            target_count: 50,
            email_regex: Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
                .expect("static email regex is valid"),
            output_dir: PathBuf::from("outputs"),
            overrides_file: None,
            extra_company_domains: BTreeMap::new(),
            loaded_config_path: None,
        }
    }
}

impl Config {
    /// Directory for the manual verification template and overrides.
    pub fn manual_dir(&self) -> PathBuf {
        self.output_dir.join("manual")
    }

    /// Overrides file in effect: the configured one, or the default location
    /// under the manual directory.
    pub fn overrides_path(&self) -> PathBuf {
        self.overrides_file
            .clone()
            .unwrap_or_else(|| self.manual_dir().join("verification_overrides.csv"))
    }

    pub fn scrape_limits(&self) -> ScrapeLimits {
        self.scrape_mode.limits()
    }
}

/// Picks a random polite delay within the configured sleep range.
pub fn get_random_sleep_duration(config: &Config) -> Duration {
    let (min, max) = config.sleep_between_requests;
    if max <= 0.0 {
        return Duration::ZERO;
    }
    let secs = if max > min {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    };
    Duration::from_secs_f32(secs.max(0.0))
}

/// Shape of the TOML configuration file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub network: NetworkSection,
    pub scraping: ScrapingSection,
    pub osint: OsintSection,
    pub selection: SelectionSection,
    pub paths: PathsSection,
    pub resolver: ResolverSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    pub request_timeout: Option<u64>,
    pub min_sleep: Option<f32>,
    pub max_sleep: Option<f32>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScrapingSection {
    pub mode: Option<ScrapeMode>,
    pub extra_pages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OsintSection {
    pub request_timeout: Option<u64>,
    pub min_confidence: Option<u8>,
    pub top_count: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectionSection {
    pub target_count: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub output_dir: Option<String>,
    pub overrides_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolverSection {
    pub domains: BTreeMap<String, String>,
}
