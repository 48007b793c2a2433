//! Near-duplicate removal keyed on normalized (name, company).

use crate::core::models::ExecutiveRecord;
use std::collections::HashSet;

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_person_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let unquoted: String = lowered
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}'))
        .collect();
    let without_tag = unquoted.replace(" (jj)", "").replace("(jj)", "");
    collapse_whitespace(&without_tag)
}

/// Company text before any `—` or `-` qualifier, so "Acme — EMEA" and
/// "Acme" collide.
pub fn normalize_company_key(company: &str) -> String {
    let lowered = company.trim().to_lowercase();
    let head = lowered
        .split('—')
        .next()
        .unwrap_or("")
        .split('-')
        .next()
        .unwrap_or("");
    collapse_whitespace(head)
}

fn completeness(record: &ExecutiveRecord) -> usize {
    [
        &record.name,
        &record.title,
        &record.company,
        &record.youtube_url,
    ]
    .iter()
    .filter(|v| !v.trim().is_empty())
    .count()
}

/// Keeps the most complete record per (name, company) key and returns the
/// survivors in their input order, plus the number removed.
pub fn remove_duplicates(records: Vec<ExecutiveRecord>) -> (Vec<ExecutiveRecord>, usize) {
    let total = records.len();
    let mut ranked: Vec<(usize, usize, String, String)> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            (
                i,
                completeness(r),
                normalize_person_name(&r.name),
                normalize_company_key(&r.company),
            )
        })
        .collect();
    // Stable: equal keys keep input order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));

    let mut seen = HashSet::new();
    let mut keep = vec![false; total];
    for (i, _, name, company) in ranked {
        if seen.insert((name, company)) {
            keep[i] = true;
        }
    }

    let survivors: Vec<ExecutiveRecord> = records
        .into_iter()
        .zip(keep)
        .filter_map(|(r, k)| k.then_some(r))
        .collect();
    let removed = total - survivors.len();
    tracing::info!(target: "dedup_task", "Removed {} duplicates; {} records remain", removed, survivors.len());
    (survivors, removed)
}
