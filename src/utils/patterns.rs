//! Generates ranked email address candidates from name parts and a domain.

use std::collections::HashSet;

/// Local-part layouts, in default ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailPattern {
    FirstDotLast,
    FirstInitialLast,
    FirstLast,
    FirstInitialDotLast,
    FirstUnderscoreLast,
    LastOnly,
    FirstOnly,
}

impl EmailPattern {
    pub fn label(self) -> &'static str {
        match self {
            EmailPattern::FirstDotLast => "first.last@domain",
            EmailPattern::FirstInitialLast => "flast@domain",
            EmailPattern::FirstLast => "firstlast@domain",
            EmailPattern::FirstInitialDotLast => "f.last@domain",
            EmailPattern::FirstUnderscoreLast => "first_last@domain",
            EmailPattern::LastOnly => "last@domain",
            EmailPattern::FirstOnly => "first@domain",
        }
    }
}

/// A generated address together with the pattern that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCandidate {
    pub email: String,
    pub pattern: EmailPattern,
}

/// Domains whose mail layout is known; their preferred patterns are picked
/// before the default order.
const DOMAIN_PREFERRED: &[(&str, &[EmailPattern])] = &[
    ("salesforce.com", &[EmailPattern::FirstDotLast, EmailPattern::FirstInitialLast]),
    ("microsoft.com", &[EmailPattern::FirstDotLast, EmailPattern::FirstInitialLast]),
    ("oracle.com", &[EmailPattern::FirstDotLast, EmailPattern::FirstInitialLast]),
    ("ibm.com", &[EmailPattern::FirstDotLast, EmailPattern::FirstInitialLast]),
    ("adobe.com", &[EmailPattern::FirstDotLast, EmailPattern::FirstInitialLast]),
];

fn sanitize_name_part(part: &str) -> String {
    part.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Builds ordered, de-duplicated candidates.
///
/// With both names the two most common corporate layouts come first. With a
/// single name part only the bare `first@` or `last@` form is produced. An
/// empty domain yields nothing.
pub fn generate_email_candidates(first_name: &str, last_name: &str, domain: &str) -> Vec<EmailCandidate> {
    let domain = domain.trim().to_lowercase();
    if domain.is_empty() {
        return Vec::new();
    }
    let first = sanitize_name_part(first_name);
    let last = sanitize_name_part(last_name);

    let mut raw: Vec<(String, EmailPattern)> = Vec::new();
    match (first.chars().next(), last.is_empty()) {
        (Some(initial), false) => {
            raw.push((format!("{}.{}", first, last), EmailPattern::FirstDotLast));
            raw.push((format!("{}{}", initial, last), EmailPattern::FirstInitialLast));
            raw.push((format!("{}{}", first, last), EmailPattern::FirstLast));
            raw.push((format!("{}.{}", initial, last), EmailPattern::FirstInitialDotLast));
            raw.push((format!("{}_{}", first, last), EmailPattern::FirstUnderscoreLast));
        }
        (None, false) => raw.push((last.clone(), EmailPattern::LastOnly)),
        (Some(_), true) => raw.push((first.clone(), EmailPattern::FirstOnly)),
        (None, true) => {}
    }

    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|(local, pattern)| EmailCandidate {
            email: format!("{}@{}", local, domain),
            pattern,
        })
        .filter(|c| seen.insert(c.email.clone()))
        .collect()
}

/// Chooses up to two candidates: the domain's preferred patterns first, then
/// the remaining candidates in generation order.
pub fn pick_top_two<'a>(candidates: &'a [EmailCandidate], domain: &str) -> Vec<&'a EmailCandidate> {
    let domain = domain.trim().to_lowercase();
    let preferred: &[EmailPattern] = DOMAIN_PREFERRED
        .iter()
        .find(|(d, _)| *d == domain)
        .map(|(_, p)| *p)
        .unwrap_or(&[]);

    let mut chosen: Vec<&EmailCandidate> = preferred
        .iter()
        .filter_map(|p| candidates.iter().find(|c| c.pattern == *p))
        .collect();
    chosen.truncate(2);

    for candidate in candidates {
        if chosen.len() >= 2 {
            break;
        }
        if !chosen.iter().any(|c| c.email == candidate.email) {
            chosen.push(candidate);
        }
    }
    chosen
}
