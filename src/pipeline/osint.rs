//! Video-page OSINT: scores how strongly a linked video ties the person to
//! the company.

use crate::core::error::Result;
use crate::core::models::ExecutiveRecord;
use crate::utils::http::PageFetcher;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

pub const SOURCE_WEBSITE: &str = "Website";
pub const SOURCE_YOUTUBE: &str = "YouTube";

const SENIOR_ALLOW: &[&str] = &[
    "chief", "cmo", "cto", "cfo", "ceo", "vp", "svp", "evp", "founder", "co-founder", "cofounder",
];
const SENIOR_DROP: &[&str] = &["manager", "director", "analyst", "consultant"];

const SENIOR_KEYWORDS: &[&str] = &["chief", "cmo", "cto", "cfo", "ceo", "vp", "svp", "evp", "founder"];
const DESCRIPTION_EVENT_WORDS: &[&str] = &["webinar", "event", "summit", "conference", "keynote"];
const TITLE_EVENT_WORDS: &[&str] = &["webinar", "event", "summit", "conference"];
const PANEL_WORDS: &[&str] = &["panel", "discussion"];

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("valid token regex"));
static AT_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bat\b").expect("valid at regex"));

static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("valid og:title selector"));
static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).expect("valid description selector"));
static DATE_PUBLISHED: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[itemprop="datePublished"]"#).expect("valid datePublished selector")
});
static JSON_LD: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid ld+json selector")
});

/// Title/description/publish date pulled from a video page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published: Option<String>,
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
}

fn json_str(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Reads the meta tags first, then lets JSON-LD `VideoObject` entries fill
/// whatever is still missing.
/// Top-level objects of one JSON-LD block; a bare object counts as one item.
fn json_ld_items(raw: &str) -> Result<Vec<Value>> {
    let items = match serde_json::from_str::<Value>(raw.trim())? {
        Value::Array(items) => items,
        other => vec![other],
    };
    Ok(items)
}

pub fn parse_video_metadata(html: &str) -> VideoMetadata {
    let document = Html::parse_document(html);
    let mut meta = VideoMetadata {
        title: meta_content(&document, &OG_TITLE),
        description: meta_content(&document, &META_DESCRIPTION),
        published: meta_content(&document, &DATE_PUBLISHED),
    };

    for script in document.select(&JSON_LD) {
        let raw = script.text().collect::<String>();
        let items = match json_ld_items(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::debug!(target: "osint_task", "Skipping unparsable JSON-LD block: {}", e);
                continue;
            }
        };
        for item in items
            .iter()
            .filter(|i| i.get("@type").and_then(Value::as_str) == Some("VideoObject"))
        {
            if meta.description.is_none() {
                meta.description = json_str(item, "description");
            }
            if meta.title.is_none() {
                meta.title = json_str(item, "name");
            }
            if meta.published.is_none() {
                meta.published = json_str(item, "uploadDate");
            }
        }
    }
    meta
}

/// Seniority check used to decide whether a record is worth an OSINT lookup.
/// Substring based, stricter than the filter stage: directors are excluded.
pub fn is_osint_senior_title(title: &str) -> bool {
    let t = title.to_lowercase();
    if SENIOR_DROP.iter().any(|k| t.contains(k)) {
        return false;
    }
    SENIOR_ALLOW.iter().any(|k| t.contains(k))
}

fn tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

struct TokenSet(HashSet<String>);

impl TokenSet {
    fn of(text: &str) -> Self {
        Self(tokens(text).into_iter().collect())
    }

    /// Every token of a non-empty group occurs.
    fn has_all(&self, group: &[String]) -> bool {
        !group.is_empty() && group.iter().all(|t| self.0.contains(t))
    }

    fn has_any<S: AsRef<str>>(&self, words: &[S]) -> bool {
        words.iter().any(|w| self.0.contains(w.as_ref()))
    }
}

/// Confidence (30–90) and a short evidence note.
pub fn score_osint(
    name: &str,
    title: &str,
    company: &str,
    page_title: &str,
    description: &str,
) -> (u8, &'static str) {
    let name_tokens = tokens(name);
    let company_tokens = tokens(company);
    let title_tokens = tokens(title);

    let mut score = 0u8;
    let mut evidence = "";

    if !description.is_empty() {
        let desc = TokenSet::of(description);
        let has_name = desc.has_all(&name_tokens);
        let has_company = desc.has_all(&company_tokens);
        let has_title = desc.has_any(title_tokens.as_slice());

        if has_name
            && has_company
            && (desc.has_any(SENIOR_KEYWORDS) || has_title)
            && AT_WORD.is_match(&description.to_lowercase())
        {
            return (90, "Description explicit: name + title + at + company");
        }
        if has_name && (has_company || has_title) {
            score = 80;
            evidence = "Description: name + (company/title)";
        } else if has_company && desc.has_any(DESCRIPTION_EVENT_WORDS) {
            score = 70;
            evidence = "Branded event: company mentioned";
        } else if desc.has_any(PANEL_WORDS) && has_company {
            score = 60;
            evidence = "Panel mention with company";
        }
    }

    if !page_title.is_empty() && score < 80 {
        let heading = TokenSet::of(page_title);
        if heading.has_all(&name_tokens) && heading.has_all(&company_tokens) {
            score = 80;
            if evidence.is_empty() {
                evidence = "Title: name + company";
            }
        } else if heading.has_all(&company_tokens)
            && heading.has_any(TITLE_EVENT_WORDS)
            && is_osint_senior_title(title)
        {
            score = score.max(70);
            if evidence.is_empty() {
                evidence = "Title: company-branded event";
            }
        }
    }

    if score == 0 {
        return (30, "Insufficient evidence");
    }
    (score, evidence)
}

/// ISO-8601 date or datetime (with or without offset) as `YYYY-MM-DD`;
/// anything else is kept verbatim.
pub fn normalize_published(raw: &str) -> String {
    let value = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.date_naive().to_string();
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return dt.date_naive().to_string();
    }
    let without_z = value.trim_end_matches('Z');
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(without_z, fmt) {
            return dt.date().to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(without_z, "%Y-%m-%d") {
        return date.to_string();
    }
    value.to_string()
}

/// What happened to one record in the OSINT pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsintOutcome {
    AlreadyVerified,
    NotSenior,
    NoVideoUrl,
    FetchFailed,
    Scored(u8),
}

impl OsintOutcome {
    pub fn made_request(self) -> bool {
        matches!(self, OsintOutcome::FetchFailed | OsintOutcome::Scored(_))
    }
}

/// Scores one record, writing the OSINT columns.
pub async fn score_record(
    fetcher: &dyn PageFetcher,
    record: &mut ExecutiveRecord,
    timeout: Duration,
) -> OsintOutcome {
    record.osint_verification_source.clear();
    record.osint_evidence.clear();
    record.osint_confidence = Some(0);
    record.osint_video_published.clear();

    if record.employment_verified {
        record.osint_confidence = Some(100);
        record.osint_verification_source = SOURCE_WEBSITE.to_string();
        record.osint_evidence = "Already website-verified".to_string();
        return OsintOutcome::AlreadyVerified;
    }
    if !is_osint_senior_title(&record.title) {
        return OsintOutcome::NotSenior;
    }
    let url = record.youtube_url.trim().to_string();
    if !url.starts_with("http") {
        return OsintOutcome::NoVideoUrl;
    }

    let Some(page) = fetcher.get(&url, timeout).await else {
        tracing::debug!(target: "osint_task", "[{}] Video page unavailable: {}", record.label(), url);
        return OsintOutcome::FetchFailed;
    };
    if page.body.is_empty() {
        return OsintOutcome::FetchFailed;
    }

    let meta = parse_video_metadata(&page.body);
    let (confidence, evidence) = score_osint(
        &record.name,
        &record.title,
        &record.company,
        meta.title.as_deref().unwrap_or(""),
        meta.description.as_deref().unwrap_or(""),
    );
    record.osint_verification_source = SOURCE_YOUTUBE.to_string();
    record.osint_evidence = evidence.to_string();
    record.osint_confidence = Some(confidence);
    if let Some(published) = meta.published.as_deref() {
        record.osint_video_published = normalize_published(published);
    }
    tracing::debug!(target: "osint_task", "[{}] OSINT confidence {} ({})", record.label(), confidence, evidence);
    OsintOutcome::Scored(confidence)
}

/// Best unverified YouTube-backed records: confidence at least
/// `min_confidence`, highest confidence then newest video first, one per
/// company, at most `limit`.
pub fn select_top_osint(records: &[ExecutiveRecord], min_confidence: u8, limit: usize) -> Vec<ExecutiveRecord> {
    let mut eligible: Vec<&ExecutiveRecord> = records
        .iter()
        .filter(|r| {
            !r.employment_verified
                && r.osint_confidence.unwrap_or(0) >= min_confidence
                && r.osint_verification_source == SOURCE_YOUTUBE
        })
        .collect();
    eligible.sort_by(|a, b| {
        b.osint_confidence
            .cmp(&a.osint_confidence)
            .then_with(|| b.osint_video_published.cmp(&a.osint_video_published))
    });

    let mut seen_companies = HashSet::new();
    eligible
        .into_iter()
        .filter(|r| seen_companies.insert(r.company.trim().to_lowercase()))
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::fake::FakeFetcher;

    const VIDEO_PAGE: &str = r#"<html><head>
        <meta property="og:title" content="Acme Summit 2024 Keynote">
        <meta name="description" content="Jane Doe, CMO at Acme, talks growth &amp; brand.">
        <meta itemprop="datePublished" content="2024-03-05T09:00:00-08:00">
        </head><body></body></html>"#;

    #[test]
    fn test_parse_meta_tags() {
        let meta = parse_video_metadata(VIDEO_PAGE);
        assert_eq!(meta.title.as_deref(), Some("Acme Summit 2024 Keynote"));
        assert_eq!(
            meta.description.as_deref(),
            Some("Jane Doe, CMO at Acme, talks growth & brand.")
        );
        assert_eq!(meta.published.as_deref(), Some("2024-03-05T09:00:00-08:00"));
    }

    #[test]
    fn test_json_ld_fills_missing_fields() {
        let html = r#"<html><head>
            <meta property="og:title" content="From meta">
            <script type="application/ld+json">{ not json }</script>
            <script type="application/ld+json">
              [{"@type": "BreadcrumbList"},
               {"@type": "VideoObject", "name": "From ld", "description": "LD description",
                "uploadDate": "2023-11-20"}]
            </script></head></html>"#;
        let meta = parse_video_metadata(html);
        assert_eq!(meta.title.as_deref(), Some("From meta"));
        assert_eq!(meta.description.as_deref(), Some("LD description"));
        assert_eq!(meta.published.as_deref(), Some("2023-11-20"));
    }

    #[test]
    fn test_osint_senior_title() {
        assert!(is_osint_senior_title("Chief Marketing Officer"));
        assert!(is_osint_senior_title("Co-Founder"));
        assert!(!is_osint_senior_title("Director of Marketing"));
        assert!(!is_osint_senior_title("Head of Sales"));
        assert!(!is_osint_senior_title(""));
    }

    #[test]
    fn test_score_levels() {
        assert_eq!(
            score_osint("Jane Doe", "CMO", "Acme", "", "Jane Doe, CMO at Acme"),
            (90, "Description explicit: name + title + at + company")
        );
        assert_eq!(
            score_osint("Jane Doe", "CMO", "Acme", "", "Jane Doe from Acme"),
            (80, "Description: name + (company/title)")
        );
        assert_eq!(
            score_osint("Jane Doe", "CMO", "Acme", "", "Acme summit recap"),
            (70, "Branded event: company mentioned")
        );
        assert_eq!(
            score_osint("Jane Doe", "CMO", "Acme", "", "A panel with Acme"),
            (60, "Panel mention with company")
        );
        assert_eq!(
            score_osint("Jane Doe", "CMO", "Acme", "Jane Doe | Acme", ""),
            (80, "Title: name + company")
        );
        assert_eq!(
            score_osint("Jane Doe", "CMO", "Acme", "Acme Webinar", ""),
            (70, "Title: company-branded event")
        );
        assert_eq!(
            score_osint("Jane Doe", "CMO", "Acme", "Something else", "Unrelated"),
            (30, "Insufficient evidence")
        );
    }

    #[test]
    fn test_panel_score_keeps_its_evidence_when_title_upgrades() {
        assert_eq!(
            score_osint("Jane Doe", "CMO", "Acme", "Jane Doe at Acme", "Panel discussion, Acme"),
            (80, "Panel mention with company")
        );
    }

    #[test]
    fn test_empty_company_never_matches() {
        // An empty token group is not evidence.
        assert_eq!(
            score_osint("Jane Doe", "CMO", "", "", "Webinar about cloud"),
            (30, "Insufficient evidence")
        );
    }

    #[test]
    fn test_normalize_published() {
        assert_eq!(normalize_published("2024-03-05T09:00:00-08:00"), "2024-03-05");
        assert_eq!(normalize_published("2024-03-05T23:30:00Z"), "2024-03-05");
        assert_eq!(normalize_published("2024-03-05T09:00:00"), "2024-03-05");
        assert_eq!(normalize_published("2024-03-05"), "2024-03-05");
        assert_eq!(normalize_published("2024-03-05T09:00:00+0000"), "2024-03-05");
        assert_eq!(normalize_published("2024-03-05T22:15:00.500-0700"), "2024-03-05");
        assert_eq!(normalize_published("March 5, 2024"), "March 5, 2024");
    }

    #[test]
    fn test_json_ld_items() {
        assert_eq!(json_ld_items(r#"{"@type":"VideoObject"}"#).unwrap().len(), 1);
        assert_eq!(json_ld_items("[{}, {}]").unwrap().len(), 2);
        assert!(matches!(
            json_ld_items("{not json"),
            Err(crate::core::error::AppError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_score_record_paths() {
        let fetcher = FakeFetcher::new().page("https://youtu.be/v1", VIDEO_PAGE);
        let timeout = Duration::from_secs(5);

        let mut rec = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        rec.youtube_url = "https://youtu.be/v1".to_string();
        assert_eq!(score_record(&fetcher, &mut rec, timeout).await, OsintOutcome::Scored(90));
        assert_eq!(rec.osint_verification_source, SOURCE_YOUTUBE);
        assert_eq!(rec.osint_video_published, "2024-03-05");

        let mut verified = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        verified.employment_verified = true;
        assert_eq!(
            score_record(&fetcher, &mut verified, timeout).await,
            OsintOutcome::AlreadyVerified
        );
        assert_eq!(verified.osint_confidence, Some(100));
        assert_eq!(verified.osint_verification_source, SOURCE_WEBSITE);

        let mut director = ExecutiveRecord::new("Jane Doe", "Director", "Acme");
        director.youtube_url = "https://youtu.be/v1".to_string();
        assert_eq!(score_record(&fetcher, &mut director, timeout).await, OsintOutcome::NotSenior);
        assert_eq!(director.osint_confidence, Some(0));

        let mut missing = ExecutiveRecord::new("Jane Doe", "CEO", "Acme");
        missing.youtube_url = "youtu.be/v1".to_string();
        assert_eq!(score_record(&fetcher, &mut missing, timeout).await, OsintOutcome::NoVideoUrl);

        assert_eq!(fetcher.requests().len(), 1);
    }

    fn scored(name: &str, company: &str, confidence: u8, published: &str) -> ExecutiveRecord {
        let mut r = ExecutiveRecord::new(name, "CEO", company);
        r.osint_verification_source = SOURCE_YOUTUBE.to_string();
        r.osint_confidence = Some(confidence);
        r.osint_video_published = published.to_string();
        r
    }

    #[test]
    fn test_select_top_osint() {
        let mut verified = scored("V", "Zeta", 100, "");
        verified.employment_verified = true;
        let records = vec![
            scored("A", "Acme", 80, "2023-01-01"),
            scored("B", "acme ", 90, "2022-01-01"),
            scored("C", "Globex", 80, "2024-01-01"),
            scored("D", "Initech", 50, "2024-06-01"),
            verified,
        ];
        let top = select_top_osint(&records, 60, 15);
        let names: Vec<&str> = top.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);

        let top_one = select_top_osint(&records, 60, 1);
        assert_eq!(top_one.len(), 1);
    }
}
