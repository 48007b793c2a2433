//! Contains validation logic for the final Config struct.

use super::{Config, Result};
use crate::core::error::AppError;

/// Validates the configuration after loading and overrides, clamping values
/// where a sensible fallback exists.
pub(crate) fn validate_config(config: &mut Config) -> Result<()> {
    if config.sleep_between_requests.0 < 0.0 || config.sleep_between_requests.1 < 0.0 {
        return Err(AppError::Config(
            "Sleep durations cannot be negative.".to_string(),
        ));
    }
    if config.sleep_between_requests.0 > config.sleep_between_requests.1 {
        tracing::warn!(
            "Min sleep ({:.2}s) > Max sleep ({:.2}s). Setting max sleep = min sleep.",
            config.sleep_between_requests.0,
            config.sleep_between_requests.1
        );
        config.sleep_between_requests.1 = config.sleep_between_requests.0;
    }
    if config.user_agent.trim().is_empty() {
        return Err(AppError::Config("User agent cannot be empty.".to_string()));
    }
    if config.request_timeout.is_zero() {
        return Err(AppError::Config(
            "Request timeout must be at least one second.".to_string(),
        ));
    }
    if config.osint_request_timeout.is_zero() {
        return Err(AppError::Config(
            "OSINT request timeout must be at least one second.".to_string(),
        ));
    }
    if config.osint_min_confidence > 100 {
        tracing::warn!(
            "OSINT minimum confidence ({}) > 100. Clamping to 100.",
            config.osint_min_confidence
        );
        config.osint_min_confidence = 100;
    }
    if config.osint_top_count == 0 {
        tracing::warn!("OSINT top count was set to 0. Setting to 1.");
        config.osint_top_count = 1;
    }
    if config.target_count == 0 {
        tracing::warn!("Target count was set to 0. Setting to 1.");
        config.target_count = 1;
    }
    for page in &mut config.extra_scrape_pages {
        if !page.starts_with('/') {
            *page = format!("/{}", page);
        }
    }
    if config.output_dir.as_os_str().is_empty() {
        return Err(AppError::Config(
            "Output directory cannot be empty.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_negative_sleep_rejected() {
        let mut config = Config {
            sleep_between_requests: (-1.0, 1.0),
            ..Config::default()
        };
        assert!(validate_config(&mut config).is_err());
    }

    #[test]
    fn test_clamps_and_normalizes() {
        let mut config = Config {
            sleep_between_requests: (2.0, 1.0),
            osint_min_confidence: 150,
            osint_top_count: 0,
            target_count: 0,
            extra_scrape_pages: vec!["careers".to_string(), "/press".to_string()],
            ..Config::default()
        };
        validate_config(&mut config).unwrap();
        assert_eq!(config.sleep_between_requests, (2.0, 2.0));
        assert_eq!(config.osint_min_confidence, 100);
        assert_eq!(config.osint_top_count, 1);
        assert_eq!(config.target_count, 1);
        assert_eq!(config.extra_scrape_pages, vec!["/careers", "/press"]);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config {
            request_timeout: Duration::ZERO,
            ..Config::default()
        };
        assert!(validate_config(&mut config).is_err());
    }
}
