//! Candidate email generation for every record with a usable domain.

use crate::core::models::{EmailConfidence, ExecutiveRecord, PatternLogEntry};
use crate::utils::domain::{company_slug, registrable_domain};
use crate::utils::names::split_name;
use crate::utils::patterns::{generate_email_candidates, pick_top_two, EmailPattern};

const SLUG_DOMAIN_LEN: std::ops::RangeInclusive<usize> = 3..=15;

pub const PATTERN_LOG_COLUMNS: [&str; 5] = ["Name", "Domain", "Email 1", "Email 2", "Patterns Tried"];

/// Mail domain for a record: the registrable domain of its website, or a
/// `{slug}.com` guess for short company names.
pub fn email_domain_for(record: &ExecutiveRecord) -> Option<String> {
    if record.has_website() {
        match registrable_domain(&record.company_website) {
            Ok(domain) => return Some(domain),
            Err(e) => tracing::debug!(target: "emails_task",
                "[{}] Website '{}' has no usable domain: {}", record.label(), record.company_website, e),
        }
    }
    let slug = company_slug(&record.company);
    SLUG_DOMAIN_LEN
        .contains(&slug.len())
        .then(|| format!("{}.com", slug))
}

/// Fills the candidate email columns. Returns a pattern log row when at
/// least one address was produced.
pub fn generate_for_record(record: &mut ExecutiveRecord) -> Option<PatternLogEntry> {
    record.candidate_email_1.clear();
    record.candidate_email_2.clear();

    let parts = split_name(&record.name);
    let domain = email_domain_for(record).unwrap_or_default();
    let candidates = generate_email_candidates(&parts.first, &parts.last, &domain);
    let picks = pick_top_two(&candidates, &domain);

    record.email_confidence = Some(match picks.first() {
        Some(first) if first.pattern == EmailPattern::FirstDotLast => EmailConfidence::High,
        Some(_) => EmailConfidence::Medium,
        None => EmailConfidence::Low,
    });
    if let Some(first) = picks.first() {
        record.candidate_email_1 = first.email.clone();
    }
    if let Some(second) = picks.get(1) {
        record.candidate_email_2 = second.email.clone();
    }

    if !record.has_email_1() {
        return None;
    }
    Some(PatternLogEntry {
        name: record.name.clone(),
        domain,
        email_1: record.candidate_email_1.clone(),
        email_2: record.candidate_email_2.clone(),
        patterns_tried: candidates
            .iter()
            .map(|c| c.pattern.label())
            .collect::<Vec<_>>()
            .join(" | "),
    })
}

/// Runs generation over all records and returns the pattern log.
pub fn generate_emails(records: &mut [ExecutiveRecord]) -> Vec<PatternLogEntry> {
    let log: Vec<PatternLogEntry> = records.iter_mut().filter_map(generate_for_record).collect();
    let high = records
        .iter()
        .filter(|r| r.email_confidence == Some(EmailConfidence::High))
        .count();
    tracing::info!(target: "emails_task",
        "Generated emails for {} of {} records ({} high confidence)", log.len(), records.len(), high);
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_site(name: &str, company: &str, site: &str) -> ExecutiveRecord {
        let mut r = ExecutiveRecord::new(name, "CMO", company);
        r.company_website = site.to_string();
        r
    }

    #[test]
    fn test_domain_from_website_and_slug() {
        assert_eq!(
            email_domain_for(&with_site("A", "Google Cloud", "https://cloud.google.com/")).as_deref(),
            Some("google.com")
        );
        assert_eq!(
            email_domain_for(&with_site("A", "Acme", "")).as_deref(),
            Some("acme.com")
        );
        assert_eq!(email_domain_for(&with_site("A", "GE", "")), None);
        assert_eq!(
            email_domain_for(&with_site("A", "International Widgets Corporation", "")),
            None
        );
    }

    #[test]
    fn test_generate_full_name() {
        let mut rec = with_site("Jane Doe", "Acme", "https://www.acme.io/about");
        let log = generate_for_record(&mut rec).unwrap();
        assert_eq!(rec.candidate_email_1, "jane.doe@acme.io");
        assert_eq!(rec.candidate_email_2, "jdoe@acme.io");
        assert_eq!(rec.email_confidence, Some(EmailConfidence::High));
        assert_eq!(log.domain, "acme.io");
        assert_eq!(
            log.patterns_tried,
            "first.last@domain | flast@domain | firstlast@domain | f.last@domain | first_last@domain"
        );
    }

    #[test]
    fn test_single_name_is_medium() {
        let mut rec = with_site("Cher", "Acme", "https://acme.com");
        generate_for_record(&mut rec).unwrap();
        assert_eq!(rec.candidate_email_1, "cher@acme.com");
        assert!(rec.candidate_email_2.is_empty());
        assert_eq!(rec.email_confidence, Some(EmailConfidence::Medium));
    }

    #[test]
    fn test_no_domain_is_low() {
        let mut rec = with_site("Jane Doe", "", "");
        assert!(generate_for_record(&mut rec).is_none());
        assert!(!rec.has_any_email());
        assert_eq!(rec.email_confidence, Some(EmailConfidence::Low));
    }

    #[test]
    fn test_generate_emails_log_rows() {
        let mut records = vec![
            with_site("Jane Doe", "Acme", "https://acme.com"),
            with_site("", "Nope", ""),
            with_site("John Roe", "IBM", "https://www.ibm.com/us-en"),
        ];
        let log = generate_emails(&mut records);
        assert_eq!(log.len(), 2);
        assert_eq!(records[2].candidate_email_1, "john.roe@ibm.com");
        assert_eq!(records[2].candidate_email_2, "jroe@ibm.com");
    }
}
