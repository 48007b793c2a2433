//! Quality scoring, tiered selection of the final list, and the text report.

use crate::core::config::Config;
use crate::core::models::{ExecutiveRecord, QualityTier};
use crate::utils::domain::bare_site_host;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

static SENIOR_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Chief|CEO|COO|CMO|CFO|CTO|CRO|CPO|President|SVP|EVP|Managing Director|Founder")
        .expect("valid senior title regex")
});

/// Ranking score: https evidence, https website, senior title, verified
/// employment and two candidate emails.
pub fn quality_score(record: &ExecutiveRecord) -> u32 {
    let mut score = 0;
    if record.source.contains("https") {
        score += 2;
    }
    if record.company_website.contains("https") {
        score += 2;
    }
    if SENIOR_TITLE.is_match(&record.title) {
        score += 1;
    }
    if record.employment_verified {
        score += 3;
    }
    if record.has_both_emails() {
        score += 2;
    }
    score
}

/// Whether a record qualifies for a tier.
pub fn qualifies_for(tier: QualityTier, record: &ExecutiveRecord) -> bool {
    let verified = record.employment_verified;
    match tier {
        QualityTier::Strict => verified && record.has_both_emails() && record.has_website(),
        QualityTier::A => verified && record.has_any_email() && record.has_website(),
        QualityTier::B => verified && record.has_any_email(),
        QualityTier::C => !verified && record.has_both_emails() && record.has_website(),
        QualityTier::Fallback => record.has_any_email(),
    }
}

/// Selected records plus everything the text report needs.
#[derive(Debug, Clone)]
pub struct QualityReport {
    pub selected: Vec<ExecutiveRecord>,
    pub target: usize,
    pub issues: Vec<String>,
}

impl QualityReport {
    pub fn tier_count(&self, tier: QualityTier) -> usize {
        self.selected
            .iter()
            .filter(|r| r.quality_tier == Some(tier))
            .count()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QUALITY CHECK REPORT")?;
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f)?;
        writeln!(f, "Final executives: {} / {}", self.selected.len(), self.target)?;
        writeln!(f)?;
        writeln!(f, "Tier breakdown:")?;
        for tier in QualityTier::ALL {
            writeln!(f, "  • {}: {}", tier, self.tier_count(tier))?;
        }
        writeln!(f)?;
        writeln!(f, "Issues:")?;
        if self.issues.is_empty() {
            writeln!(f, "  • None")?;
        }
        for issue in &self.issues {
            writeln!(f, "  • {}", issue)?;
        }
        Ok(())
    }
}

fn collect_issues(records: &[ExecutiveRecord], selected: usize, config: &Config) -> Vec<String> {
    let mut issues = Vec::new();
    let target = config.target_count;
    if selected < target {
        issues.push(format!(
            "Only {} executives available (target {})",
            selected, target
        ));
    }

    let missing_fields = records
        .iter()
        .filter(|r| {
            r.name.trim().is_empty() || r.title.trim().is_empty() || r.company.trim().is_empty()
        })
        .count();
    if missing_fields > 0 {
        issues.push(format!(
            "{} records missing name, title or company",
            missing_fields
        ));
    }

    let invalid_emails = records
        .iter()
        .flat_map(|r| [r.candidate_email_1.trim(), r.candidate_email_2.trim()])
        .filter(|e| !e.is_empty() && !config.email_regex.is_match(e))
        .count();
    if invalid_emails > 0 {
        issues.push(format!("{} invalid email formats detected", invalid_emails));
    }

    let domain_mismatches = records
        .iter()
        .filter(|r| {
            let site = bare_site_host(&r.company_website);
            match r.candidate_email_1.split_once('@') {
                Some((_, email_domain)) => !site.is_empty() && !email_domain.ends_with(&site),
                None => false,
            }
        })
        .count();
    if domain_mismatches > 0 {
        issues.push(format!("{} potential domain mismatches", domain_mismatches));
    }
    issues
}

/// Scores every record, fills the target greedily tier by tier, and checks
/// the input for data problems.
pub fn run_quality_check(records: &[ExecutiveRecord], config: &Config) -> QualityReport {
    let target = config.target_count;
    let mut ranked: Vec<(usize, u32)> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (i, quality_score(r)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut taken = HashSet::new();
    let mut selected: Vec<ExecutiveRecord> = Vec::new();
    for tier in QualityTier::ALL {
        for &(i, _) in &ranked {
            if selected.len() >= target {
                break;
            }
            if taken.contains(&i) || !qualifies_for(tier, &records[i]) {
                continue;
            }
            taken.insert(i);
            let mut record = records[i].clone();
            record.quality_tier = Some(tier);
            selected.push(record);
        }
    }

    let issues = collect_issues(records, selected.len(), config);

    if selected.iter().all(|r| r.original_order.is_some()) {
        selected.sort_by_key(|r| r.original_order);
    }

    tracing::info!(target: "quality_task",
        "Selected {} of {} records (target {}), {} issues", selected.len(), records.len(), target, issues.len());
    QualityReport {
        selected,
        target,
        issues,
    }
}
