//! HTTP page fetching behind a trait so stages can be driven by a fake in tests.

use crate::core::config::Config;
use crate::core::error::Result;
use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};
use std::time::{Duration, Instant};

/// A page that answered with status 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL after following redirects.
    pub final_url: String,
    pub body: String,
}

/// Minimal GET abstraction used by the resolver, scrape verifier and OSINT scorer.
///
/// Implementations return `None` for anything other than a successful page:
/// non-200 status, transport errors, timeouts.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Option<FetchedPage>;
}

/// `reqwest`-backed fetcher that follows redirects and sends the configured
/// user agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .redirect(redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Option<FetchedPage> {
        let started = Instant::now();
        let response = match self.client.get(url).timeout(timeout).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!(target: "http_fetch", "GET {} failed after {:.1?}: {}", url, started.elapsed(), e);
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(target: "http_fetch", "GET {} -> {} in {:.1?}", url, status, started.elapsed());
            return None;
        }

        let final_url = response.url().to_string();
        match response.text().await {
            Ok(body) => {
                tracing::debug!(target: "http_fetch", "GET {} -> 200 in {:.1?}", url, started.elapsed());
                Some(FetchedPage { final_url, body })
            }
            Err(e) => {
                tracing::debug!(target: "http_fetch", "Reading body of {} failed: {}", url, e);
                None
            }
        }
    }
}
