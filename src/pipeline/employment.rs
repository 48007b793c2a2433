//! Current-employment checks: manual overrides and company website scraping.

use crate::core::config::{Config, ScrapeLimits, ScrapeMode};
use crate::core::error::Result;
use crate::core::models::{yes_no, ExecutiveRecord, VerificationOverride, VerificationTemplateRow};
use crate::pipeline::io;
use crate::utils::domain::normalize_url;
use crate::utils::html::{extract_leadership_links, visible_text};
use crate::utils::http::PageFetcher;
use crate::utils::names::{split_name, to_ascii};
use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

const LINKEDIN_SEARCH_BASE: &str = "https://www.linkedin.com/search/results/all/?keywords=";

/// Characters left as-is in the search keywords: unreserved plus `/`.
const KEYWORD_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

const TEMPLATE_COLUMNS: [&str; 6] = [
    "Name",
    "Company",
    "LinkedIn Search URL",
    "Verification Source",
    "Employment Verified",
    "Verified At",
];

const BASE_PAGES: &[&str] = &[
    "/about",
    "/about-us",
    "/company",
    "/team",
    "/our-team",
    "/leadership",
    "/leadership-team",
    "/executives",
    "/management",
    "/people",
];

const ACCURATE_PAGES: &[&str] = &[
    "/who-we-are",
    "/about/company",
    "/about/leadership",
    "/company/leadership",
    "/executive-team",
    "/management-team",
];

pub fn linkedin_search_url(name: &str, company: &str) -> String {
    let keywords = format!("{} {}", name, company);
    format!(
        "{}{}",
        LINKEDIN_SEARCH_BASE,
        utf8_percent_encode(&keywords, KEYWORD_SAFE)
    )
}

fn override_key(name: &str, company: &str) -> String {
    format!(
        "{}|{}",
        name.trim().to_lowercase(),
        company.trim().to_lowercase()
    )
}

/// Resets verification columns, fills the LinkedIn search link and returns
/// the rows of the manual verification template.
pub fn prepare_manual_verification(records: &mut [ExecutiveRecord]) -> Vec<VerificationTemplateRow> {
    records
        .iter_mut()
        .map(|record| {
            record.linkedin_search_url = linkedin_search_url(&record.name, &record.company);
            record.employment_verified = false;
            record.verification_source.clear();
            record.verified_at = None;
            VerificationTemplateRow {
                name: record.name.clone(),
                company: record.company.clone(),
                linkedin_search_url: record.linkedin_search_url.clone(),
                verification_source: String::new(),
                employment_verified: false,
                verified_at: None,
            }
        })
        .collect()
}

pub fn write_verification_template(path: &Path, rows: &[VerificationTemplateRow]) -> Result<()> {
    io::write_rows(path, rows, &TEMPLATE_COLUMNS)
}

/// Reads the overrides file keyed by `name|company` (trimmed, lowercased).
/// The first row for a key wins.
pub fn load_overrides(path: &Path) -> Result<HashMap<String, VerificationOverride>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut overrides = HashMap::new();
    for row in reader.deserialize::<VerificationOverride>() {
        let row = row?;
        overrides
            .entry(override_key(&row.name, &row.company))
            .or_insert(row);
    }
    Ok(overrides)
}

/// Marks records verified where a truthy override exists. Returns how many
/// records were changed.
pub fn apply_manual_overrides(
    records: &mut [ExecutiveRecord],
    overrides: &HashMap<String, VerificationOverride>,
    today: NaiveDate,
) -> usize {
    let mut applied = 0;
    for record in records.iter_mut() {
        let Some(ov) = overrides.get(&override_key(&record.name, &record.company)) else {
            continue;
        };
        if !yes_no::is_truthy(&ov.employment_verified) {
            continue;
        }
        record.employment_verified = true;
        let source = ov.verification_source.trim();
        if !source.is_empty() {
            record.verification_source = source.to_string();
        }
        if record.verified_at.is_none() {
            record.verified_at = Some(today);
        }
        applied += 1;
    }
    applied
}

/// Manual verification step: search links, template file, then overrides if
/// the overrides file exists. File problems are logged, never fatal.
pub fn run_manual_verification(records: &mut [ExecutiveRecord], config: &Config, today: NaiveDate) -> usize {
    let template = prepare_manual_verification(records);
    let template_path = config.manual_dir().join("verification_template.csv");
    match write_verification_template(&template_path, &template) {
        Ok(()) => tracing::info!(target: "verify_task",
            "Wrote verification template to {}", template_path.display()),
        Err(e) => tracing::warn!(target: "verify_task",
            "Failed writing verification template {}: {}", template_path.display(), e),
    }

    let overrides_path = config.overrides_path();
    if !overrides_path.is_file() {
        tracing::info!(target: "verify_task", "No overrides file at {}", overrides_path.display());
        return 0;
    }
    match load_overrides(&overrides_path) {
        Ok(overrides) => {
            let applied = apply_manual_overrides(records, &overrides, today);
            tracing::info!(target: "verify_task",
                "Applied {} manual overrides from {}", applied, overrides_path.display());
            applied
        }
        Err(e) => {
            tracing::warn!(target: "verify_task",
                "Failed reading overrides {}: {}", overrides_path.display(), e);
            0
        }
    }
}

/// Pages to scan for a site, in order and without duplicates. A website
/// without a scheme is treated as `https://`.
pub fn candidate_urls(base: &str, mode: ScrapeMode, extra_pages: &[String]) -> Vec<String> {
    let Ok(base_url) = normalize_url(base) else {
        return Vec::new();
    };
    let mut paths: Vec<&str> = BASE_PAGES.to_vec();
    if mode == ScrapeMode::Accurate {
        paths.extend_from_slice(ACCURATE_PAGES);
    }
    paths.extend(extra_pages.iter().map(String::as_str));

    let mut seen = HashSet::new();
    std::iter::once(base_url.to_string())
        .chain(
            paths
                .into_iter()
                .filter_map(|p| base_url.join(p).ok())
                .map(|u| u.to_string()),
        )
        .filter(|u| seen.insert(u.clone()))
        .collect()
}

/// Whether the page text mentions the person.
///
/// Matches `first last` or `last, first`. A last name longer than four
/// characters that appears between one and five times also counts.
pub fn page_contains_name(html: &str, first: &str, last: &str) -> bool {
    if html.is_empty() {
        return false;
    }
    let first = first.to_lowercase();
    let last = last.to_lowercase();
    if first.is_empty() && last.is_empty() {
        return false;
    }
    let text = to_ascii(&visible_text(html))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if !first.is_empty() && !last.is_empty() {
        if text.contains(&format!("{} {}", first, last)) || text.contains(&format!("{}, {}", last, first)) {
            return true;
        }
    }
    if last.chars().count() > 4 {
        let occurrences = text.matches(last.as_str()).count();
        return (1..=5).contains(&occurrences);
    }
    false
}

/// Result of scraping one record's company site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Skipped(&'static str),
    Verified { url: String, scanned: usize },
    NotFound { scanned: usize },
}

/// Scans the company site of one record for the person's name. On success
/// the record is marked verified with the matching page as source.
pub async fn scrape_verify_record(
    fetcher: &dyn PageFetcher,
    record: &mut ExecutiveRecord,
    limits: &ScrapeLimits,
    mode: ScrapeMode,
    extra_pages: &[String],
    today: NaiveDate,
) -> ScrapeOutcome {
    let name = split_name(&record.name);
    if name.is_empty() {
        return ScrapeOutcome::Skipped("empty name");
    }
    if record.employment_verified {
        return ScrapeOutcome::Skipped("already verified");
    }
    if !record.has_website() {
        return ScrapeOutcome::Skipped("no company website");
    }

    let started = Instant::now();
    let within_budget = || started.elapsed() < limits.per_record_budget;
    let mut scanned = 0usize;

    for url in candidate_urls(&record.company_website, mode, extra_pages) {
        if !within_budget() {
            tracing::debug!(target: "scrape_task", "[{}] Time budget reached", record.label());
            break;
        }
        if scanned >= limits.max_main_pages {
            break;
        }
        scanned += 1;
        tracing::debug!(target: "scrape_task", "[{}] scan {}: {}", record.label(), scanned, url);
        let Some(page) = fetcher.get(&url, limits.request_timeout).await else {
            continue;
        };
        if page.body.is_empty() {
            continue;
        }
        if page_contains_name(&page.body, &name.first, &name.last) {
            mark_verified(record, &url, today);
            return ScrapeOutcome::Verified { url, scanned };
        }

        let sublinks = extract_leadership_links(&page.final_url, &page.body, limits.extract_links_limit);
        for sub_url in sublinks.into_iter().take(limits.sublinks_per_page) {
            if !within_budget() || scanned >= limits.max_total_pages {
                break;
            }
            scanned += 1;
            tracing::debug!(target: "scrape_task", "[{}] sub-scan {}: {}", record.label(), scanned, sub_url);
            let Some(sub_page) = fetcher.get(&sub_url, limits.request_timeout).await else {
                continue;
            };
            if page_contains_name(&sub_page.body, &name.first, &name.last) {
                mark_verified(record, &sub_url, today);
                return ScrapeOutcome::Verified { url: sub_url, scanned };
            }
        }
    }
    ScrapeOutcome::NotFound { scanned }
}

fn mark_verified(record: &mut ExecutiveRecord, url: &str, today: NaiveDate) {
    record.employment_verified = true;
    record.verification_source = url.to_string();
    record.verified_at = Some(today);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::fake::FakeFetcher;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_linkedin_search_url() {
        assert_eq!(
            linkedin_search_url("Jane Doe", "Acme/Widgets & Co"),
            "https://www.linkedin.com/search/results/all/?keywords=Jane%20Doe%20Acme/Widgets%20%26%20Co"
        );
        assert_eq!(
            linkedin_search_url("José", ""),
            "https://www.linkedin.com/search/results/all/?keywords=Jos%C3%A9%20"
        );
    }

    #[test]
    fn test_overrides_applied_on_normalized_key() {
        let mut records = vec![
            ExecutiveRecord::new("Jane Doe", "CMO", "Acme"),
            ExecutiveRecord::new("John Roe", "CEO", "Globex"),
        ];
        prepare_manual_verification(&mut records);

        let dir = tempdir().unwrap();
        let path = dir.path().join("overrides.csv");
        fs::write(
            &path,
            "Name,Company,Employment Verified,Verification Source\n\
             \x20jane doe ,ACME,Yes,https://acme.com/team\n\
             John Roe,Globex,no,https://globex.com\n",
        )
        .unwrap();
        let overrides = load_overrides(&path).unwrap();
        let applied = apply_manual_overrides(&mut records, &overrides, today());

        assert_eq!(applied, 1);
        assert!(records[0].employment_verified);
        assert_eq!(records[0].verification_source, "https://acme.com/team");
        assert_eq!(records[0].verified_at, Some(today()));
        assert!(!records[1].employment_verified);
        assert!(records[1].verification_source.is_empty());
    }

    #[test]
    fn test_manual_step_writes_template_and_survives_bad_overrides() {
        let dir = tempdir().unwrap();
        let config = Config {
            output_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        fs::create_dir_all(config.manual_dir()).unwrap();
        fs::write(
            config.overrides_path(),
            b"Name,Company,Employment Verified\n\xff\xfe,Acme,yes\n",
        )
        .unwrap();

        let mut records = vec![ExecutiveRecord::new("Jane Doe", "CMO", "Acme")];
        records[0].employment_verified = true;
        let applied = run_manual_verification(&mut records, &config, today());

        assert_eq!(applied, 0);
        assert!(!records[0].employment_verified);
        let template = fs::read_to_string(config.manual_dir().join("verification_template.csv")).unwrap();
        assert!(template.starts_with("Name,Company,LinkedIn Search URL"));
        assert!(template.contains("Jane%20Doe%20Acme"));
    }

    #[test]
    fn test_candidate_urls() {
        let normal = candidate_urls("https://acme.com", ScrapeMode::Normal, &[]);
        assert_eq!(normal.len(), 11);
        assert_eq!(normal[0], "https://acme.com/");
        assert_eq!(normal[1], "https://acme.com/about");
        let accurate = candidate_urls(
            "https://acme.com/about",
            ScrapeMode::Accurate,
            &["/press".to_string()],
        );
        // base already is /about, so the joined /about is dropped
        assert_eq!(accurate.len(), 17);
        assert_eq!(accurate.last().map(String::as_str), Some("https://acme.com/press"));
        assert!(candidate_urls("", ScrapeMode::Normal, &[]).is_empty());
    }

    #[test]
    fn test_page_contains_name() {
        let page = "<p>Meet our team: Jane   Doe, Chief Marketing Officer</p>";
        assert!(page_contains_name(page, "jane", "doe"));
        assert!(page_contains_name("<td>Doe, Jane</td>", "jane", "doe"));
        assert!(page_contains_name("<p>José Müller leads sales</p>", "jose", "muller"));
        // loose surname match needs more than four letters
        assert!(page_contains_name("<p>Dr. Whitfield spoke</p>", "anne", "whitfield"));
        assert!(!page_contains_name("<p>Mr. Doe spoke</p>", "jane", "doe"));
        assert!(!page_contains_name("", "jane", "doe"));
        assert!(!page_contains_name("<p>anything</p>", "", ""));
    }

    #[test]
    fn test_loose_match_rejects_common_surname() {
        let page = "<p>".to_string() + &"Smith family Smiths ".repeat(3) + "</p>";
        assert!(!page_contains_name(&page, "anne", "smith"));
    }

    #[tokio::test]
    async fn test_scrape_verifies_on_candidate_page() {
        let fetcher = FakeFetcher::new()
            .page("https://acme.com/", "<p>Welcome</p>")
            .page("https://acme.com/team", "<h2>Jane Doe</h2><p>CMO</p>");
        let mut rec = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        rec.company_website = "acme.com".to_string();
        let outcome = scrape_verify_record(
            &fetcher,
            &mut rec,
            &ScrapeMode::Normal.limits(),
            ScrapeMode::Normal,
            &[],
            today(),
        )
        .await;
        assert_eq!(
            outcome,
            ScrapeOutcome::Verified {
                url: "https://acme.com/team".to_string(),
                scanned: 5
            }
        );
        assert!(rec.employment_verified);
        assert_eq!(rec.verification_source, "https://acme.com/team");
        assert_eq!(rec.verified_at, Some(today()));
    }

    #[tokio::test]
    async fn test_scrape_follows_mined_links() {
        let fetcher = FakeFetcher::new()
            .page(
                "https://acme.com/",
                r#"<a href="/our-story/leaders">Leadership</a>"#,
            )
            .page("https://acme.com/our-story/leaders", "<li>Doe, Jane</li>");
        let mut rec = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        rec.company_website = "https://acme.com".to_string();
        let outcome = scrape_verify_record(
            &fetcher,
            &mut rec,
            &ScrapeMode::Normal.limits(),
            ScrapeMode::Normal,
            &[],
            today(),
        )
        .await;
        assert_eq!(
            outcome,
            ScrapeOutcome::Verified {
                url: "https://acme.com/our-story/leaders".to_string(),
                scanned: 2
            }
        );
    }

    /// Page whose anchors all look like leadership links under `prefix`.
    fn link_page(prefix: &str, count: usize) -> String {
        (0..count)
            .map(|i| format!(r#"<a href="/{}/{}">Leadership {}</a>"#, prefix, i, i))
            .collect()
    }

    #[tokio::test]
    async fn test_mined_links_stop_at_total_page_limit() {
        let fetcher = FakeFetcher::new()
            .page("https://acme.com/", &link_page("people", 10))
            .page("https://acme.com/about", &link_page("board", 10));
        let limits = ScrapeLimits {
            max_total_pages: 9,
            ..ScrapeMode::Normal.limits()
        };
        let mut rec = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        rec.company_website = "https://acme.com".to_string();

        let outcome =
            scrape_verify_record(&fetcher, &mut rec, &limits, ScrapeMode::Normal, &[], today()).await;
        assert_eq!(outcome, ScrapeOutcome::NotFound { scanned: 9 });

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 9);
        assert_eq!(requests[1], "https://acme.com/people/0");
        assert_eq!(requests[5], "https://acme.com/people/4");
        assert_eq!(requests[6], "https://acme.com/about");
        assert_eq!(requests[8], "https://acme.com/board/1");
        assert!(!rec.employment_verified);
    }

    #[tokio::test]
    async fn test_accurate_mode_counters() {
        let fetcher = FakeFetcher::new()
            .page("https://acme.com/", &link_page("people", 15))
            .page("https://acme.com/about", &link_page("board", 15));
        let limits = ScrapeMode::Accurate.limits();
        let mut rec = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        rec.company_website = "https://acme.com".to_string();

        let outcome =
            scrape_verify_record(&fetcher, &mut rec, &limits, ScrapeMode::Accurate, &[], today()).await;
        assert_eq!(outcome, ScrapeOutcome::NotFound { scanned: 20 });

        let requests = fetcher.requests();
        assert_eq!(requests.len(), limits.max_total_pages);
        // ten sub-links from the base page, eight more once /about pushes the count to 12
        assert_eq!(requests[10], "https://acme.com/people/9");
        assert_eq!(requests[11], "https://acme.com/about");
        assert_eq!(requests[19], "https://acme.com/board/7");
    }

    #[tokio::test]
    async fn test_exhausted_budget_fetches_nothing() {
        let fetcher = FakeFetcher::new().page("https://acme.com/", "<p>Jane Doe</p>");
        let limits = ScrapeLimits {
            per_record_budget: Duration::ZERO,
            ..ScrapeMode::Normal.limits()
        };
        let mut rec = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        rec.company_website = "https://acme.com".to_string();

        let outcome =
            scrape_verify_record(&fetcher, &mut rec, &limits, ScrapeMode::Normal, &[], today()).await;
        assert_eq!(outcome, ScrapeOutcome::NotFound { scanned: 0 });
        assert!(fetcher.requests().is_empty());
        assert!(!rec.employment_verified);
        assert!(rec.verified_at.is_none());
    }

    #[tokio::test]
    async fn test_scrape_respects_main_page_limit_and_skips() {
        let fetcher = FakeFetcher::new();
        let limits = ScrapeMode::Normal.limits();
        let mut rec = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        rec.company_website = "https://acme.com".to_string();
        let outcome =
            scrape_verify_record(&fetcher, &mut rec, &limits, ScrapeMode::Normal, &[], today()).await;
        assert_eq!(outcome, ScrapeOutcome::NotFound { scanned: limits.max_main_pages });
        assert_eq!(fetcher.requests().len(), limits.max_main_pages);

        let mut no_site = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        let outcome =
            scrape_verify_record(&fetcher, &mut no_site, &limits, ScrapeMode::Normal, &[], today()).await;
        assert_eq!(outcome, ScrapeOutcome::Skipped("no company website"));

        let mut verified = rec.clone();
        verified.employment_verified = true;
        let outcome =
            scrape_verify_record(&fetcher, &mut verified, &limits, ScrapeMode::Normal, &[], today()).await;
        assert_eq!(outcome, ScrapeOutcome::Skipped("already verified"));
    }
}
