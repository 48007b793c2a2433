//! Handles loading configuration from files and applying it to the Config struct.

use super::{Config, ConfigFile};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Loads configuration settings from a TOML file.
pub(crate) fn load_config_file(file_path: &str) -> anyhow::Result<ConfigFile> {
    let path = Path::new(file_path);
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!(
            "File not found or is not a file: {}",
            file_path
        ));
    }
    tracing::debug!("Attempting to read config file: {}", file_path);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", file_path))?;

    let config_file_content: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML configuration from {}", file_path))?;

    tracing::debug!("Successfully parsed configuration file: {}", file_path);
    Ok(config_file_content)
}

/// Merges every key present in `file_config` onto `config`.
pub(crate) fn apply_file_config(config: &mut Config, file_config: &ConfigFile) {
    // Network
    if let Some(timeout) = file_config.network.request_timeout {
        config.request_timeout = Duration::from_secs(timeout);
    }
    if let Some(min_sleep) = file_config.network.min_sleep {
        config.sleep_between_requests.0 = min_sleep;
    }
    if let Some(max_sleep) = file_config.network.max_sleep {
        config.sleep_between_requests.1 = max_sleep;
    }
    if let Some(ref user_agent) = file_config.network.user_agent {
        config.user_agent = user_agent.clone();
    }

    // Scraping
    if let Some(mode) = file_config.scraping.mode {
        config.scrape_mode = mode;
    }
    if let Some(ref pages) = file_config.scraping.extra_pages {
        config.extra_scrape_pages = pages
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
    }

    // OSINT
    if let Some(timeout) = file_config.osint.request_timeout {
        config.osint_request_timeout = Duration::from_secs(timeout);
    }
    if let Some(min_conf) = file_config.osint.min_confidence {
        config.osint_min_confidence = min_conf;
    }
    if let Some(top) = file_config.osint.top_count {
        config.osint_top_count = top;
    }

    // Selection
    if let Some(target) = file_config.selection.target_count {
        config.target_count = target;
    }

    // Paths
    if let Some(ref dir) = file_config.paths.output_dir {
        if !dir.trim().is_empty() {
            config.output_dir = PathBuf::from(dir.trim());
        }
    }
    if let Some(ref path) = file_config.paths.overrides_file {
        if !path.trim().is_empty() {
            config.overrides_file = Some(PathBuf::from(path.trim()));
        } else {
            config.overrides_file = None;
        }
    }

    // Resolver
    for (company, domain) in &file_config.resolver.domains {
        config
            .extra_company_domains
            .insert(company.trim().to_lowercase(), domain.trim().to_lowercase());
    }
}
