//! Provides the `ConfigBuilder` for fluent configuration construction.

use super::loading::{apply_file_config, load_config_file};
use super::validation::validate_config;
use super::{Config, ConfigFile, Result, ScrapeMode};
use crate::AppError;
use std::path::Path;
use std::time::Duration;

/// Builder pattern for creating `Config` instances fluently.
///
/// Defaults are applied first, then an optional TOML file, then explicit
/// overrides, then validation.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
    config_file_path: Option<String>,
    overrides: ConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify an optional configuration file path to load.
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file_path = Some(path.into());
        self
    }

    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.overrides.network.request_timeout = Some(duration.as_secs());
        self
    }
    pub fn sleep_between_requests(mut self, min: f32, max: f32) -> Self {
        self.overrides.network.min_sleep = Some(min);
        self.overrides.network.max_sleep = Some(max);
        self
    }
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.overrides.network.user_agent = Some(value.into());
        self
    }
    pub fn scrape_mode(mut self, mode: ScrapeMode) -> Self {
        self.overrides.scraping.mode = Some(mode);
        self
    }
    pub fn extra_scrape_pages(mut self, pages: Vec<String>) -> Self {
        self.overrides.scraping.extra_pages = Some(pages);
        self
    }
    pub fn osint_request_timeout(mut self, duration: Duration) -> Self {
        self.overrides.osint.request_timeout = Some(duration.as_secs());
        self
    }
    pub fn osint_min_confidence(mut self, value: u8) -> Self {
        self.overrides.osint.min_confidence = Some(value);
        self
    }
    pub fn osint_top_count(mut self, value: usize) -> Self {
        self.overrides.osint.top_count = Some(value);
        self
    }
    pub fn target_count(mut self, value: usize) -> Self {
        self.overrides.selection.target_count = Some(value);
        self
    }
    pub fn output_dir(mut self, path: impl Into<String>) -> Self {
        self.overrides.paths.output_dir = Some(path.into());
        self
    }
    pub fn overrides_file(mut self, path: impl Into<String>) -> Self {
        self.overrides.paths.overrides_file = Some(path.into());
        self
    }
    pub fn company_domain(mut self, company: impl Into<String>, domain: impl Into<String>) -> Self {
        self.overrides
            .resolver
            .domains
            .insert(company.into(), domain.into());
        self
    }

    /// Builds the final `Config` object, applying defaults, file settings, overrides, and validation.
    pub fn build(mut self) -> Result<Config> {
        let mut loaded_path: Option<String> = None;

        if let Some(ref path) = self.config_file_path {
            match load_config_file(path) {
                Ok(file_config) => {
                    apply_file_config(&mut self.config, &file_config);
                    loaded_path = Some(path.clone());
                    tracing::info!("Loaded base configuration from specified file: {}", path);
                }
                Err(e) => {
                    tracing::error!("Failed to load specified config file '{}': {}", path, e);
                    return Err(AppError::Config(format!(
                        "Failed to load specified configuration file '{}': {}",
                        path, e
                    )));
                }
            }
        } else {
            tracing::debug!("No config file specified, checking default locations.");
            for path_str in ["./roster-sleuth.toml", "./config.toml"] {
                if Path::new(path_str).exists() {
                    tracing::debug!("Found potential default config file: {}", path_str);
                    match load_config_file(path_str) {
                        Ok(file_config) => {
                            apply_file_config(&mut self.config, &file_config);
                            loaded_path = Some(path_str.to_string());
                            tracing::info!(
                                "Loaded base configuration from default location: {}",
                                path_str
                            );
                            break;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Failed to load or parse default config '{}': {}",
                                path_str,
                                e
                            );
                        }
                    }
                }
            }
            if loaded_path.is_none() {
                tracing::debug!("No configuration file found. Using default values and overrides.");
            }
        }

        apply_file_config(&mut self.config, &self.overrides);
        self.config.loaded_config_path = loaded_path;
        validate_config(&mut self.config)?;

        tracing::debug!("Final configuration built successfully.");
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[network]\nrequest_timeout = 3\nuser_agent = \"file-agent\"\n[selection]\ntarget_count = 20"
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .config_file(file.path().to_string_lossy().to_string())
            .user_agent("cli-agent")
            .build()
            .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "cli-agent");
        assert_eq!(config.target_count, 20);
        assert!(config.loaded_config_path.is_some());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = ConfigBuilder::new()
            .config_file("/definitely/not/here/roster-sleuth.toml")
            .build();
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_company_domain_extends_resolver_table() {
        let config = ConfigBuilder::new()
            .company_domain("Acme Widgets", "acmewidgets.io")
            .build()
            .unwrap();
        assert_eq!(
            config.extra_company_domains.get("acme widgets").map(String::as_str),
            Some("acmewidgets.io")
        );
    }
}
