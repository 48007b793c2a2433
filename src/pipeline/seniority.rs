//! Job-title seniority classification.

use crate::core::models::ExecutiveRecord;
use once_cell::sync::Lazy;
use regex::Regex;

static SENIOR_ALLOW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:CEO|CMO|CFO|CTO|COO|Chief|C-?Suite|VP|Vice President|SVP|EVP|President|Director|Managing Director|Global Head|Head of|Head|GM|Founder)\b",
    )
    .expect("valid seniority allow regex")
});

static SENIOR_DENY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:Assistant|Associate|Junior|Intern|Analyst|Consultant|Advisor|Lecturer|Professor|Former|Retired)\b|\bEx-",
    )
    .expect("valid seniority deny regex")
});

/// Placeholders the scraper emits when no real title was available.
const EXCLUDED_PHRASES: &[&str] = &["(Title not stated)", "(Title not specified)", "—"];

pub fn is_senior_executive(title: &str) -> bool {
    let title = title.trim();
    if title.is_empty() {
        return false;
    }
    if EXCLUDED_PHRASES.iter().any(|p| title.contains(p)) {
        return false;
    }
    if SENIOR_DENY.is_match(title) {
        return false;
    }
    SENIOR_ALLOW.is_match(title)
}

/// Keeps senior titles, preserving input order.
pub fn filter_senior_executives(records: Vec<ExecutiveRecord>) -> Vec<ExecutiveRecord> {
    let before = records.len();
    let kept: Vec<ExecutiveRecord> = records
        .into_iter()
        .filter(|r| is_senior_executive(&r.title))
        .collect();
    tracing::info!(target: "filter_task", "Senior executives kept: {} of {}", kept.len(), before);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_senior_titles() {
        for title in [
            "CEO",
            "Chief Marketing Officer",
            "SVP, Global Sales",
            "vice president of engineering",
            "Managing Director",
            "Head of Growth",
            "Co-Founder & CTO",
            "GM, EMEA",
            "C-Suite Advisor Network Lead",
        ] {
            let expected = !title.contains("Advisor");
            assert_eq!(is_senior_executive(title), expected, "title: {}", title);
        }
    }

    #[test]
    fn test_rejected_titles() {
        for title in [
            "",
            "   ",
            "Marketing Manager",
            "Assistant to the CEO",
            "Senior Analyst",
            "Former CMO",
            "Ex-CEO of Acme",
            "Associate Director",
            "(Title not stated)",
            "VP — Sales",
            "Retired President",
        ] {
            assert!(!is_senior_executive(title), "title: {}", title);
        }
    }

    #[test]
    fn test_word_boundaries() {
        assert!(!is_senior_executive("Headhunter"));
        assert!(!is_senior_executive("Chiefly Engineer"));
        assert!(is_senior_executive("Director"));
    }

    #[test]
    fn test_filter_keeps_order() {
        let records = vec![
            ExecutiveRecord::new("A", "CEO", "X"),
            ExecutiveRecord::new("B", "Intern", "X"),
            ExecutiveRecord::new("C", "CFO", "Y"),
        ];
        let kept = filter_senior_executives(records);
        let names: Vec<&str> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
