//! Utility functions for handling domain names and URLs.

use crate::core::error::{AppError, Result};
use url::Url;

/// Second-level labels that together with the TLD form a public suffix
/// (`example.co.uk`, `example.com.au`).
const TWO_PART_SUFFIX_LABELS: &[&str] = &["co", "com", "net", "org", "gov", "ac", "edu", "ne", "or"];

/// Prefixes `https://` when the input carries no scheme.
fn with_scheme(input: &str) -> String {
    if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    }
}

fn has_inner_dot(host: &str) -> bool {
    host.contains('.') && !host.starts_with('.') && !host.ends_with('.')
}

/// Extracts the host name (e.g., "sub.example.com") from a URL or bare domain,
/// with any `www.` prefix removed and lowercased.
///
/// Returns `Err(AppError::DomainExtraction)` if the input is empty or a host
/// cannot be parsed.
pub(crate) fn get_domain_from_url(website_url_or_domain: &str) -> Result<String> {
    let input = website_url_or_domain.trim();
    if input.is_empty() {
        return Err(AppError::DomainExtraction(
            "Input string is empty".to_string(),
        ));
    }

    let host = match Url::parse(&with_scheme(input)) {
        Ok(url) => url
            .host_str()
            .map(str::to_lowercase)
            .ok_or_else(|| AppError::DomainExtraction(format!("No host in URL: {}", url)))?,
        Err(e) if !input.contains('/') && has_inner_dot(input) => {
            tracing::debug!("'{}' is not a URL ({}); using it as a bare domain", input, e);
            input.to_lowercase()
        }
        Err(e) => return Err(AppError::UrlParse(e)),
    };

    let domain = host.strip_prefix("www.").unwrap_or(&host);
    if !has_inner_dot(domain) {
        return Err(AppError::DomainExtraction(format!(
            "Extracted domain appears invalid: {}",
            domain
        )));
    }
    Ok(domain.to_string())
}

/// Reduces a website to its registrable domain: `cloud.google.com` becomes
/// `google.com`, `shop.example.co.uk` becomes `example.co.uk`.
pub(crate) fn registrable_domain(website_url_or_domain: &str) -> Result<String> {
    let host = get_domain_from_url(website_url_or_domain)?;
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return Err(AppError::DomainExtraction(format!(
            "Host has no registrable part: {}",
            host
        )));
    }
    if labels.iter().all(|l| l.chars().all(|c| c.is_ascii_digit())) {
        return Err(AppError::DomainExtraction(format!(
            "IP addresses have no registrable domain: {}",
            host
        )));
    }

    let tld = labels[labels.len() - 1];
    let second = labels[labels.len() - 2];
    let keep = if labels.len() >= 3 && tld.len() == 2 && TWO_PART_SUFFIX_LABELS.contains(&second) {
        3
    } else {
        2
    };
    Ok(labels[labels.len() - keep..].join("."))
}

/// Parses a website into a `Url`, adding `https://` when the scheme is
/// missing. The result always has a non-empty host.
pub(crate) fn normalize_url(website_url_str: &str) -> Result<Url> {
    let input = website_url_str.trim();
    if input.is_empty() {
        return Err(AppError::InsufficientInput(
            "Website URL input is empty".to_string(),
        ));
    }

    let url = Url::parse(&with_scheme(input))?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(AppError::UrlParse(url::ParseError::EmptyHost)),
    }
}

/// Company name collapsed to `[a-z0-9]` for slug-based domain guesses.
pub(crate) fn company_slug(company: &str) -> String {
    company
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Website host with scheme, `www.` and path stripped, as used when comparing
/// email domains against the company site.
pub(crate) fn bare_site_host(website: &str) -> String {
    let without_scheme = website
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    without_www
        .split('/')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_domain_from_url_valid() {
        assert_eq!(
            get_domain_from_url("https://www.example.com").unwrap(),
            "example.com"
        );
        assert_eq!(get_domain_from_url("example.com").unwrap(), "example.com");
        assert_eq!(
            get_domain_from_url("https://EXAMPLE.com/path?query=1").unwrap(),
            "example.com"
        );
        assert_eq!(
            get_domain_from_url("http://www.sub.example.org/").unwrap(),
            "sub.example.org"
        );
    }

    #[test]
    fn test_get_domain_from_url_invalid() {
        assert!(get_domain_from_url("").is_err());
        assert!(get_domain_from_url("   ").is_err());
        assert!(get_domain_from_url("https://").is_err());
        assert!(get_domain_from_url("example").is_err());
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(
            registrable_domain("https://cloud.google.com/").unwrap(),
            "google.com"
        );
        assert_eq!(
            registrable_domain("https://aws.amazon.com").unwrap(),
            "amazon.com"
        );
        assert_eq!(
            registrable_domain("https://www.salt.security/").unwrap(),
            "salt.security"
        );
        assert_eq!(
            registrable_domain("https://shop.example.co.uk/a").unwrap(),
            "example.co.uk"
        );
        assert_eq!(registrable_domain("example.co").unwrap(), "example.co");
        assert!(registrable_domain("").is_err());
        assert!(registrable_domain("https://10.0.0.1/").is_err());
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("example.com").unwrap().as_str(),
            "https://example.com/"
        );
        assert_eq!(
            normalize_url(" http://example.com ").unwrap().as_str(),
            "http://example.com/"
        );
        assert!(normalize_url("").is_err());
        assert!(normalize_url("https://").is_err());
    }

    #[test]
    fn test_company_slug() {
        assert_eq!(company_slug("Cockroach Labs, Inc."), "cockroachlabsinc");
        assert_eq!(company_slug("AT&T"), "att");
        assert_eq!(company_slug("  "), "");
    }

    #[test]
    fn test_bare_site_host() {
        assert_eq!(bare_site_host("https://www.ibm.com/us-en"), "ibm.com");
        assert_eq!(bare_site_host("http://Example.org"), "example.org");
        assert_eq!(bare_site_host(""), "");
    }
}
