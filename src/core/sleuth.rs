//! Network-bound stage driver: company resolution, website scrape and video
//! OSINT, one record at a time with progress reporting and polite pauses.

use crate::core::config::{get_random_sleep_duration, Config};
use crate::core::error::Result;
use crate::core::models::{DomainNote, ExecutiveRecord};
use crate::pipeline::employment::{scrape_verify_record, ScrapeOutcome};
use crate::pipeline::osint::{score_record, OsintOutcome};
use crate::pipeline::resolver::CompanyResolver;
use crate::utils::http::{HttpFetcher, PageFetcher};

use chrono::NaiveDate;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;

/// Counts from the company resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub resolved: usize,
    pub not_found: usize,
    pub no_company: usize,
}

/// Counts from the website scrape pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub verified: usize,
    pub not_found: usize,
    pub skipped: usize,
}

/// Counts from the OSINT pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OsintSummary {
    pub scored: usize,
    pub already_verified: usize,
    pub fetch_failed: usize,
    pub not_eligible: usize,
}

/// Drives the network-bound stages record by record with a polite pause
/// between records that hit the network.
#[derive(Clone)]
pub struct RosterSleuth {
    config: Arc<Config>,
    fetcher: Arc<dyn PageFetcher>,
}

impl RosterSleuth {
    /// Creates a sleuth backed by a real HTTP client.
    pub fn new(config: &Config) -> Result<Self> {
        tracing::debug!("Initializing RosterSleuth components...");
        let fetcher = HttpFetcher::new(config)?;
        tracing::debug!("HTTP client initialized.");
        Ok(Self::with_fetcher(config.clone(), Arc::new(fetcher)))
    }

    /// Creates a sleuth over any page fetcher.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn pause(&self, label: &str) {
        let delay = get_random_sleep_duration(&self.config);
        if !delay.is_zero() {
            tracing::trace!("[{}] Sleeping {:?}", label, delay);
            sleep(delay).await;
        }
    }

    /// Resolves every record's company website. Companies seen earlier in
    /// the run are answered from cache without a pause.
    pub async fn resolve_companies(&self, records: &mut [ExecutiveRecord], progress: &ProgressBar) -> ResolveSummary {
        let mut resolver = CompanyResolver::new(&self.config);
        let mut summary = ResolveSummary::default();
        let total = records.len();
        let started = Instant::now();

        for (index, record) in records.iter_mut().enumerate() {
            let label = format!("{}/{} {}", index + 1, total, record.label());
            progress.set_message(record.label());
            let fetched = resolver.resolve_record(self.fetcher.as_ref(), record).await;

            match record.domain_notes {
                Some(DomainNote::NoCompanyInfo) => summary.no_company += 1,
                Some(DomainNote::NotFound) => summary.not_found += 1,
                _ => summary.resolved += 1,
            }
            tracing::info!(target: "resolver_task", "[{}] {} ({:?})",
                label,
                if record.has_website() { record.company_website.as_str() } else { record.source.as_str() },
                record.domain_notes
            );

            progress.inc(1);
            if fetched {
                self.pause(&label).await;
            }
        }

        tracing::info!(target: "resolver_task",
            "Resolution finished in {:.2?}: {} resolved, {} not found, {} without company",
            started.elapsed(), summary.resolved, summary.not_found, summary.no_company
        );
        summary
    }

    /// Scans company websites for records not yet verified.
    pub async fn scrape_websites(
        &self,
        records: &mut [ExecutiveRecord],
        progress: &ProgressBar,
        today: NaiveDate,
    ) -> ScrapeSummary {
        let limits = self.config.scrape_limits();
        let mode = self.config.scrape_mode;
        let mut summary = ScrapeSummary::default();
        let total = records.len();
        tracing::info!(target: "scrape_task",
            "Website scrape over {} records (mode: {}, {} main / {} total pages per record)",
            total, mode, limits.max_main_pages, limits.max_total_pages
        );

        for (index, record) in records.iter_mut().enumerate() {
            let label = format!("{}/{} {}", index + 1, total, record.label());
            progress.set_message(record.label());
            let started = Instant::now();
            let outcome = scrape_verify_record(
                self.fetcher.as_ref(),
                record,
                &limits,
                mode,
                &self.config.extra_scrape_pages,
                today,
            )
            .await;
            progress.inc(1);

            match outcome {
                ScrapeOutcome::Skipped(reason) => {
                    tracing::debug!(target: "scrape_task", "[{}] skip: {}", label, reason);
                    summary.skipped += 1;
                    continue;
                }
                ScrapeOutcome::Verified { ref url, scanned } => {
                    tracing::info!(target: "scrape_task",
                        "[{}] verified at {} (scanned {}, {:.1?})", label, url, scanned, started.elapsed());
                    summary.verified += 1;
                }
                ScrapeOutcome::NotFound { scanned } => {
                    tracing::info!(target: "scrape_task",
                        "[{}] not found (scanned {}, {:.1?})", label, scanned, started.elapsed());
                    summary.not_found += 1;
                }
            }
            self.pause(&label).await;
        }

        tracing::info!(target: "scrape_task", "Web verification newly verified: {}", summary.verified);
        summary
    }

    /// Scores every record from its linked video page.
    pub async fn score_osint(&self, records: &mut [ExecutiveRecord], progress: &ProgressBar) -> OsintSummary {
        let timeout = self.config.osint_request_timeout;
        let mut summary = OsintSummary::default();
        let total = records.len();

        for (index, record) in records.iter_mut().enumerate() {
            let label = format!("{}/{} {}", index + 1, total, record.label());
            progress.set_message(record.label());
            let outcome = score_record(self.fetcher.as_ref(), record, timeout).await;
            progress.inc(1);

            match outcome {
                OsintOutcome::Scored(confidence) => {
                    tracing::info!(target: "osint_task", "[{}] confidence {} ({})", label, confidence, record.osint_evidence);
                    summary.scored += 1;
                }
                OsintOutcome::AlreadyVerified => summary.already_verified += 1,
                OsintOutcome::FetchFailed => {
                    tracing::debug!(target: "osint_task", "[{}] video page unavailable", label);
                    summary.fetch_failed += 1;
                }
                OsintOutcome::NotSenior | OsintOutcome::NoVideoUrl => summary.not_eligible += 1,
            }
            if outcome.made_request() {
                self.pause(&label).await;
            }
        }

        tracing::info!(target: "osint_task",
            "OSINT finished: {} scored, {} already verified, {} fetch failures, {} not eligible",
            summary.scored, summary.already_verified, summary.fetch_failed, summary.not_eligible
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::fake::FakeFetcher;

    fn quiet_config() -> Config {
        Config {
            sleep_between_requests: (0.0, 0.0),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_resolve_companies_uses_cache_across_records() {
        let fetcher = Arc::new(FakeFetcher::new().page("https://nutanix.com", "ok"));
        let sleuth = RosterSleuth::with_fetcher(quiet_config(), fetcher.clone());
        let mut records = vec![
            ExecutiveRecord::new("Jane Doe", "CMO", "Nutanix"),
            ExecutiveRecord::new("John Roe", "CEO", "Keynote - Nutanix"),
            ExecutiveRecord::new("Ann Lee", "CFO", ""),
        ];
        let progress = ProgressBar::hidden();
        let summary = sleuth.resolve_companies(&mut records, &progress).await;

        assert_eq!(
            summary,
            ResolveSummary {
                resolved: 2,
                not_found: 0,
                no_company: 1
            }
        );
        assert_eq!(records[1].company, "Nutanix");
        assert_eq!(records[1].company_website, "https://nutanix.com");
        assert_eq!(fetcher.requests().len(), 1);
        assert_eq!(progress.position(), 3);
    }

    #[tokio::test]
    async fn test_scrape_websites_counts() {
        let fetcher = Arc::new(FakeFetcher::new().page("https://acme.com/", "<p>Jane Doe, CMO</p>"));
        let sleuth = RosterSleuth::with_fetcher(quiet_config(), fetcher);
        let mut found = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        found.company_website = "https://acme.com".to_string();
        let no_site = ExecutiveRecord::new("John Roe", "CEO", "Globex");
        let mut records = vec![found, no_site];

        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let summary = sleuth
            .scrape_websites(&mut records, &ProgressBar::hidden(), today)
            .await;
        assert_eq!(summary.verified, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(records[0].verified_at, Some(today));
    }

    #[tokio::test]
    async fn test_scrape_pauses_only_after_network_records() {
        let config = Config {
            sleep_between_requests: (0.2, 0.2),
            ..Config::default()
        };
        let fetcher = Arc::new(FakeFetcher::new());
        let sleuth = RosterSleuth::with_fetcher(config, fetcher.clone());
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let mut skipped = vec![
            ExecutiveRecord::new("John Roe", "CEO", "Globex"),
            ExecutiveRecord::new("Ann Lee", "CFO", "Initech"),
        ];
        let started = Instant::now();
        let summary = sleuth
            .scrape_websites(&mut skipped, &ProgressBar::hidden(), today)
            .await;
        assert_eq!(summary.skipped, 2);
        assert!(started.elapsed() < std::time::Duration::from_millis(200));
        assert!(fetcher.requests().is_empty());

        let mut searched = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        searched.company_website = "https://acme.com".to_string();
        let started = Instant::now();
        let summary = sleuth
            .scrape_websites(&mut [searched], &ProgressBar::hidden(), today)
            .await;
        assert_eq!(summary.not_found, 1);
        assert!(started.elapsed() >= std::time::Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_score_osint_counts() {
        let page = r#"<meta name="description" content="Jane Doe, CMO at Acme">"#;
        let fetcher = Arc::new(FakeFetcher::new().page("https://youtu.be/a", page));
        let sleuth = RosterSleuth::with_fetcher(quiet_config(), fetcher);

        let mut scored = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        scored.youtube_url = "https://youtu.be/a".to_string();
        let mut failed = ExecutiveRecord::new("John Roe", "CEO", "Globex");
        failed.youtube_url = "https://youtu.be/missing".to_string();
        let mut verified = ExecutiveRecord::new("Ann Lee", "CFO", "Initech");
        verified.employment_verified = true;
        let analyst = ExecutiveRecord::new("Bob Ray", "Analyst", "Hooli");
        let mut records = vec![scored, failed, verified, analyst];

        let summary = sleuth.score_osint(&mut records, &ProgressBar::hidden()).await;
        assert_eq!(
            summary,
            OsintSummary {
                scored: 1,
                already_verified: 1,
                fetch_failed: 1,
                not_eligible: 1
            }
        );
        assert_eq!(records[0].osint_confidence, Some(90));
    }
}
